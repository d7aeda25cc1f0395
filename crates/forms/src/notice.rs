//! Transient notices (toasts) emitted by the controllers.

use std::sync::Mutex;

use crossbeam_channel::{Sender, TrySendError};

use crate::i18n::{keys, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: Message,
}

impl Notice {
    pub fn success(key: &'static str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: Message::Key(key),
        }
    }

    pub fn error(message: Message) -> Self {
        Self {
            level: NoticeLevel::Error,
            message,
        }
    }

    pub fn error_text(detail: impl Into<String>) -> Self {
        Self::error(Message::Text(detail.into()))
    }

    pub fn choose_birth_date() -> Self {
        Self::error(Message::Key(keys::CHOOSE_BIRTH_DATE))
    }
}

pub trait NoticeSink: Send + Sync {
    fn push(&self, notice: Notice);
}

/// Keeps every notice in memory; the CLI drains it after each step.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NoticeSink for NoticeLog {
    fn push(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

impl NoticeSink for Sender<Notice> {
    fn push(&self, notice: Notice) {
        match self.try_send(notice) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(message = %dropped.message, "notice queue is full; dropping notice");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("notice receiver is gone; dropping notice");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_drains_in_emission_order() {
        let log = NoticeLog::new();
        log.push(Notice::choose_birth_date());
        log.push(Notice::success(keys::CHILDREN_SAVED));

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, NoticeLevel::Error);
        assert_eq!(drained[1].message, Message::Key(keys::CHILDREN_SAVED));
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn channel_sink_drops_when_full() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.push(Notice::error_text("first"));
        tx.push(Notice::error_text("second"));

        assert_eq!(rx.try_recv().expect("first"), Notice::error_text("first"));
        assert!(rx.try_recv().is_err());
    }
}
