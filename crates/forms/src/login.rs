//! Sign-in form: two whitespace-free required fields and a "remember me"
//! flag.

use client_core::{ClientError, MarketplaceApi};
use shared::protocol::{Credentials, Session};
use tracing::{debug, info};

use crate::{
    i18n::Message,
    store::{AppAction, Dispatch},
    submission::{SubmissionGate, SubmitPhase, SubmitTicket},
    validation::{first_failure, no_space, required, FieldErrors, Rule},
};

pub const USERNAME_OR_EMAIL: &str = "usernameOrEmail";
pub const PASSWORD: &str = "password";

const CREDENTIAL_RULES: &[Rule] = &[required, no_space];

pub fn validate_credentials(credentials: &Credentials) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.set(
        USERNAME_OR_EMAIL,
        first_failure(&credentials.username_or_email, CREDENTIAL_RULES),
    );
    errors.set(
        PASSWORD,
        first_failure(&credentials.password, CREDENTIAL_RULES),
    );
    errors
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(Session),
    /// Client-side validation failed.
    Invalid,
    /// The server answered 400; its message is on `usernameOrEmail`.
    Rejected,
    /// A login was already in flight, or the result arrived too late.
    Ignored,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    values: Credentials,
    remember: bool,
    errors: FieldErrors,
    gate: SubmissionGate,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &Credentials {
        &self.values
    }

    pub fn remember(&self) -> bool {
        self.remember
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn phase(&self) -> SubmitPhase {
        self.gate.phase()
    }

    /// The submit button stays inert while a login is in flight or the
    /// username field shows an error.
    pub fn can_submit(&self) -> bool {
        !self.gate.is_submitting() && !self.errors.contains(USERNAME_OR_EMAIL)
    }

    pub fn set_username_or_email(&mut self, value: impl Into<String>) {
        self.values.username_or_email = value.into();
        self.errors.set(
            USERNAME_OR_EMAIL,
            first_failure(&self.values.username_or_email, CREDENTIAL_RULES),
        );
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.values.password = value.into();
        self.errors.set(
            PASSWORD,
            first_failure(&self.values.password, CREDENTIAL_RULES),
        );
    }

    pub fn toggle_remember(&mut self) {
        self.remember = !self.remember;
    }

    /// Refused while [`LoginForm::can_submit`] is false, so a server
    /// rejection stays on screen until the username is edited.
    pub fn begin_submit(&mut self) -> Option<(SubmitTicket, Credentials, bool)> {
        if !self.can_submit() {
            return None;
        }
        self.errors = validate_credentials(&self.values);
        if !self.errors.is_empty() {
            debug!(errors = self.errors.len(), "login form is invalid");
            return None;
        }
        let ticket = self.gate.begin()?;
        Some((ticket, self.values.clone(), self.remember))
    }

    /// A 400 answer becomes a field error on `usernameOrEmail`; every other
    /// failure is handed back to the caller.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<Session, ClientError>,
        store: &dyn Dispatch,
    ) -> Result<LoginOutcome, ClientError> {
        if !self.gate.finish(ticket) {
            return Ok(LoginOutcome::Ignored);
        }
        match result {
            Ok(session) => {
                info!(username = %session.username, "login accepted");
                store.dispatch(AppAction::LoggedIn(session.clone()));
                Ok(LoginOutcome::LoggedIn(session))
            }
            Err(err) if err.is_bad_request() => {
                self.errors
                    .insert(USERNAME_OR_EMAIL, Message::Text(err.detail()));
                Ok(LoginOutcome::Rejected)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn submit(
        &mut self,
        api: &dyn MarketplaceApi,
        store: &dyn Dispatch,
    ) -> Result<LoginOutcome, ClientError> {
        if self.gate.is_submitting() {
            return Ok(LoginOutcome::Ignored);
        }
        let Some((ticket, credentials, remember)) = self.begin_submit() else {
            return Ok(LoginOutcome::Invalid);
        };
        let result = api.login(&credentials, remember).await;
        self.finish_submit(ticket, result, store)
    }
}

#[cfg(test)]
#[path = "tests/login_tests.rs"]
mod tests;
