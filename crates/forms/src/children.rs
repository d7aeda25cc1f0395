//! The profile's children editor: a bounded, ordered list of child rows
//! derived from the stored profile and saved as a whole.

use chrono::NaiveDate;
use client_core::{ClientError, MarketplaceApi};
use shared::domain::{Child, ChildRecord, Sex};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    i18n::{keys, Message},
    notice::{Notice, NoticeSink},
    store::{AppAction, AppSnapshot, Dispatch},
    submission::{SubmissionGate, SubmitOutcome, SubmitPhase, SubmitTicket},
    validation::FieldErrors,
};

pub const MAX_CHILDREN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("the last child needs a birth date before another can be added")]
    MissingBirthDate,
    #[error("at most {MAX_CHILDREN} children can be listed")]
    LimitReached,
    #[error("the only remaining child row cannot be removed")]
    LastRecord,
    #[error("child row {index} does not exist (rows: {len})")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildrenFormState {
    children: Vec<ChildRecord>,
}

impl ChildrenFormState {
    /// Builds the form rows from the stored children. No stored children
    /// yields a single empty row.
    pub fn initialize(profile_children: Option<&[Child]>) -> Self {
        let stored = profile_children.unwrap_or_default();
        if stored.len() > MAX_CHILDREN {
            warn!(
                stored = stored.len(),
                "profile lists more children than the form can edit; truncating"
            );
        }
        let mut children: Vec<ChildRecord> = stored
            .iter()
            .take(MAX_CHILDREN)
            .copied()
            .map(ChildRecord::from)
            .collect();
        if children.is_empty() {
            children.push(ChildRecord::placeholder());
        }
        Self { children }
    }

    pub fn records(&self) -> &[ChildRecord] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the "add" control is shown.
    pub fn can_append(&self) -> bool {
        self.children.len() < MAX_CHILDREN
    }

    /// Whether per-row "remove" controls are shown.
    pub fn can_remove(&self) -> bool {
        self.children.len() > 1
    }

    pub fn append_record(&mut self) -> Result<(), RecordError> {
        if !self.can_append() {
            return Err(RecordError::LimitReached);
        }
        let last_has_date = self
            .children
            .last()
            .is_some_and(|record| record.birth_date.is_some());
        if !last_has_date {
            return Err(RecordError::MissingBirthDate);
        }
        self.children.push(ChildRecord::placeholder());
        Ok(())
    }

    pub fn remove_record(&mut self, index: usize) -> Result<ChildRecord, RecordError> {
        self.check_index(index)?;
        if !self.can_remove() {
            return Err(RecordError::LastRecord);
        }
        Ok(self.children.remove(index))
    }

    pub fn set_birth_date(
        &mut self,
        index: usize,
        birth_date: Option<NaiveDate>,
    ) -> Result<(), RecordError> {
        self.check_index(index)?;
        self.children[index].birth_date = birth_date;
        Ok(())
    }

    pub fn set_sex(&mut self, index: usize, sex: Sex) -> Result<(), RecordError> {
        self.check_index(index)?;
        self.children[index].sex = sex;
        Ok(())
    }

    /// Every row needs a birth date that is not after `today` and a chosen
    /// sex.
    pub fn validate(&self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (idx, record) in self.children.iter().enumerate() {
            match record.birth_date {
                None => errors.insert(
                    format!("children.{idx}.birthDate"),
                    Message::Key(keys::REQUIRE_FIELD),
                ),
                Some(date) if date > today => errors.insert(
                    format!("children.{idx}.birthDate"),
                    Message::Key(keys::DATE_IN_FUTURE),
                ),
                Some(_) => {}
            }
            if record.sex == Sex::Unselected {
                errors.insert(
                    format!("children.{idx}.sex"),
                    Message::Key(keys::REQUIRE_FIELD),
                );
            }
        }
        errors
    }

    /// The rows in persisted shape, or `None` if any row lacks a birth date.
    pub fn to_children(&self) -> Option<Vec<Child>> {
        self.children.iter().map(ChildRecord::to_child).collect()
    }

    fn check_index(&self, index: usize) -> Result<(), RecordError> {
        if index < self.children.len() {
            Ok(())
        } else {
            Err(RecordError::OutOfRange {
                index,
                len: self.children.len(),
            })
        }
    }
}

/// Form session bound to the store's children. Rebuilt from the snapshot
/// whenever `children_revision` moves.
#[derive(Debug)]
pub struct ChildrenForm {
    state: ChildrenFormState,
    source_revision: u64,
    errors: FieldErrors,
    dirty: bool,
    gate: SubmissionGate,
    pending: Option<Vec<Child>>,
}

impl ChildrenForm {
    pub fn new(snapshot: &AppSnapshot) -> Self {
        Self {
            state: ChildrenFormState::initialize(snapshot.children()),
            source_revision: snapshot.children_revision,
            errors: FieldErrors::new(),
            dirty: false,
            gate: SubmissionGate::default(),
            pending: None,
        }
    }

    /// Re-derives the rows if the stored children changed since the form
    /// was built. Returns whether it did.
    pub fn sync(&mut self, snapshot: &AppSnapshot) -> bool {
        if snapshot.children_revision == self.source_revision {
            return false;
        }
        debug!(
            from = self.source_revision,
            to = snapshot.children_revision,
            "children changed in store; reinitializing form"
        );
        self.state = ChildrenFormState::initialize(snapshot.children());
        self.source_revision = snapshot.children_revision;
        self.errors = FieldErrors::new();
        self.dirty = false;
        self.gate.reset();
        self.pending = None;
        true
    }

    pub fn state(&self) -> &ChildrenFormState {
        &self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn phase(&self) -> SubmitPhase {
        self.gate.phase()
    }

    pub fn can_submit(&self) -> bool {
        !self.gate.is_submitting()
    }

    /// Appends an empty row. A missing birth date on the last row is
    /// reported as a notice; at the row limit nothing happens.
    pub fn append_record(&mut self, notices: &dyn NoticeSink) -> bool {
        match self.state.append_record() {
            Ok(()) => {
                self.dirty = true;
                true
            }
            Err(RecordError::MissingBirthDate) => {
                notices.push(Notice::choose_birth_date());
                false
            }
            Err(err) => {
                debug!("append ignored: {err}");
                false
            }
        }
    }

    pub fn remove_record(&mut self, index: usize) -> Result<ChildRecord, RecordError> {
        let removed = self.state.remove_record(index)?;
        self.dirty = true;
        Ok(removed)
    }

    pub fn set_birth_date(
        &mut self,
        index: usize,
        birth_date: Option<NaiveDate>,
    ) -> Result<(), RecordError> {
        self.state.set_birth_date(index, birth_date)?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_sex(&mut self, index: usize, sex: Sex) -> Result<(), RecordError> {
        self.state.set_sex(index, sex)?;
        self.dirty = true;
        Ok(())
    }

    /// Validates and, if the form is valid and idle, moves it to
    /// `Submitting`. The caller sends the returned children and reports back
    /// through [`ChildrenForm::finish_submit`].
    pub fn begin_submit(&mut self, today: NaiveDate) -> Option<(SubmitTicket, Vec<Child>)> {
        if self.gate.is_submitting() {
            return None;
        }
        self.errors = self.state.validate(today);
        if !self.errors.is_empty() {
            debug!(errors = self.errors.len(), "children form is invalid");
            return None;
        }
        let children = self.state.to_children()?;
        let ticket = self.gate.begin()?;
        self.pending = Some(children.clone());
        Some((ticket, children))
    }

    /// Applies the outcome of a request started by `begin_submit`. Results
    /// for a stale ticket are discarded and `false` is returned.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<(), ClientError>,
        store: &dyn Dispatch,
        notices: &dyn NoticeSink,
    ) -> bool {
        if !self.gate.finish(ticket) {
            debug!("discarding result of a stale children submission");
            return false;
        }
        let pending = self.pending.take();
        match result {
            Ok(()) => {
                notices.push(Notice::success(keys::CHILDREN_SAVED));
                self.dirty = false;
                if let Some(children) = pending {
                    store.dispatch(AppAction::ChildrenSaved(children));
                }
            }
            Err(err) => {
                warn!("saving children failed: {err}");
                notices.push(Notice::error_text(err.detail()));
            }
        }
        true
    }

    pub async fn submit(
        &mut self,
        api: &dyn MarketplaceApi,
        today: NaiveDate,
        store: &dyn Dispatch,
        notices: &dyn NoticeSink,
    ) -> SubmitOutcome {
        if self.gate.is_submitting() {
            return SubmitOutcome::Ignored;
        }
        let Some((ticket, children)) = self.begin_submit(today) else {
            return SubmitOutcome::Invalid;
        };
        let result = api.put_children(&children).await;
        let outcome = match &result {
            Ok(()) => SubmitOutcome::Saved,
            Err(err) => SubmitOutcome::Failed(err.clone()),
        };
        self.finish_submit(ticket, result, store, notices);
        outcome
    }
}

#[cfg(test)]
#[path = "tests/children_tests.rs"]
mod tests;
