//! UI-side owner of every form. Requests go out through the command queue;
//! backend events come back through [`FormSession::handle_event`].

use std::sync::Arc;

use chrono::NaiveDate;
use client_core::ClientError;
use crossbeam_channel::Sender;
use shared::domain::Locale;
use tracing::{debug, warn};

use crate::{
    backend_bridge::{
        commands::{BackendCommand, BackendEvent},
        orchestration::dispatch_backend_command,
    },
    category::CategorySelector,
    children::ChildrenForm,
    login::{LoginForm, LoginOutcome},
    notice::{Notice, NoticeSink},
    profile::ProfileInfoForm,
    store::{AppAction, AppStore, Dispatch},
};

pub struct FormSession {
    store: Arc<AppStore>,
    notices: Arc<dyn NoticeSink>,
    cmd_tx: Sender<BackendCommand>,
    status: String,
    pub login: LoginForm,
    pub children: ChildrenForm,
    pub profile: ProfileInfoForm,
    pub categories: CategorySelector,
}

impl FormSession {
    pub fn new(
        store: Arc<AppStore>,
        notices: Arc<dyn NoticeSink>,
        cmd_tx: Sender<BackendCommand>,
    ) -> Self {
        let snapshot = store.snapshot();
        Self {
            login: LoginForm::new(),
            children: ChildrenForm::new(&snapshot),
            profile: ProfileInfoForm::new(&snapshot),
            categories: CategorySelector::new(snapshot.locale),
            store,
            notices,
            cmd_tx,
            status: String::new(),
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// Last queueing problem, empty when the queue has been healthy.
    pub fn status(&self) -> &str {
        &self.status
    }

    fn queue(&mut self, cmd: BackendCommand) -> Result<(), ClientError> {
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            Ok(())
        } else {
            Err(ClientError::Transport(self.status.clone()))
        }
    }

    pub fn request_login(&mut self) -> bool {
        let Some((ticket, credentials, remember)) = self.login.begin_submit() else {
            return false;
        };
        let cmd = BackendCommand::Login {
            ticket,
            credentials,
            remember,
        };
        match self.queue(cmd) {
            Ok(()) => true,
            Err(err) => {
                if let Err(err) = self.login.finish_submit(ticket, Err(err), self.store.as_ref()) {
                    warn!("login could not be queued: {err}");
                }
                false
            }
        }
    }

    pub fn request_categories(&mut self) -> bool {
        if !self.categories.begin_load() {
            return false;
        }
        match self.queue(BackendCommand::LoadCategories) {
            Ok(()) => true,
            Err(err) => {
                self.categories.finish_load(Err(err), self.notices.as_ref());
                false
            }
        }
    }

    pub fn request_profile(&mut self) -> bool {
        match self.queue(BackendCommand::LoadProfile) {
            Ok(()) => true,
            Err(err) => {
                self.notices.push(Notice::error_text(err.detail()));
                false
            }
        }
    }

    pub fn request_children_submit(&mut self, today: NaiveDate) -> bool {
        let Some((ticket, children)) = self.children.begin_submit(today) else {
            return false;
        };
        match self.queue(BackendCommand::SubmitChildren { ticket, children }) {
            Ok(()) => true,
            Err(err) => {
                self.children.finish_submit(
                    ticket,
                    Err(err),
                    self.store.as_ref(),
                    self.notices.as_ref(),
                );
                false
            }
        }
    }

    pub fn request_profile_submit(&mut self) -> bool {
        let Some((ticket, info)) = self.profile.begin_submit() else {
            return false;
        };
        match self.queue(BackendCommand::UpdateProfile { ticket, info }) {
            Ok(()) => true,
            Err(err) => {
                self.profile.finish_submit(
                    ticket,
                    Err(err),
                    self.store.as_ref(),
                    self.notices.as_ref(),
                );
                false
            }
        }
    }

    pub fn change_locale(&mut self, locale: Locale) {
        self.store.dispatch(AppAction::LocaleChanged(locale));
        self.sync();
    }

    /// Applies one backend result. Login failures other than a rejected
    /// credential pair are returned for the caller's global error handling.
    pub fn handle_event(&mut self, event: BackendEvent) -> Result<(), ClientError> {
        let outcome = match event {
            BackendEvent::WorkerFailed(message) => {
                self.notices.push(Notice::error_text(message.clone()));
                self.status = message;
                Ok(())
            }
            BackendEvent::LoginFinished { ticket, result } => {
                match self.login.finish_submit(ticket, result, self.store.as_ref()) {
                    Ok(LoginOutcome::LoggedIn(_)) => {
                        self.request_profile();
                        Ok(())
                    }
                    Ok(other) => {
                        debug!(?other, "login finished without a session");
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            BackendEvent::CategoriesLoaded(result) => {
                self.categories.finish_load(result, self.notices.as_ref());
                Ok(())
            }
            BackendEvent::ProfileLoaded(Ok(profile)) => {
                self.store.dispatch(AppAction::ProfileLoaded(profile));
                Ok(())
            }
            BackendEvent::ProfileLoaded(Err(err)) => {
                warn!("loading profile failed: {err}");
                self.notices.push(Notice::error_text(err.detail()));
                Ok(())
            }
            BackendEvent::ChildrenSubmitted { ticket, result } => {
                self.children.finish_submit(
                    ticket,
                    result,
                    self.store.as_ref(),
                    self.notices.as_ref(),
                );
                Ok(())
            }
            BackendEvent::ProfileUpdated { ticket, result } => {
                self.profile.finish_submit(
                    ticket,
                    result,
                    self.store.as_ref(),
                    self.notices.as_ref(),
                );
                Ok(())
            }
        };
        self.sync();
        outcome
    }

    /// Pulls every form up to date with the store.
    pub fn sync(&mut self) {
        let snapshot = self.store.snapshot();
        self.children.sync(&snapshot);
        self.profile.sync(&snapshot);
        self.categories.sync(&snapshot);
    }
}
