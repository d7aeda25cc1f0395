//! "About myself" form: first name, last name and phone numbers.

use client_core::{ClientError, MarketplaceApi};
use shared::{domain::UserProfile, protocol::ProfileInfoUpdate};
use tracing::{debug, warn};

use crate::{
    i18n::keys,
    notice::{Notice, NoticeSink},
    store::{AppAction, AppSnapshot, Dispatch},
    submission::{SubmissionGate, SubmitOutcome, SubmitPhase, SubmitTicket},
    validation::{
        first_failure, first_failure_if_present, max_len_50, min_len_2, name_pattern, no_space,
        phone_pattern, FieldErrors, Rule,
    },
};

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";

const NAME_RULES: &[Rule] = &[min_len_2, max_len_50, no_space, name_pattern];
const PHONE_RULES: &[Rule] = &[phone_pattern];

/// Names may be left empty; phones that are present must be well formed.
pub fn validate_profile_info(info: &ProfileInfoUpdate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.set(
        FIRST_NAME,
        first_failure_if_present(&info.first_name, NAME_RULES),
    );
    errors.set(
        LAST_NAME,
        first_failure_if_present(&info.last_name, NAME_RULES),
    );
    for (idx, phone) in info.phones.iter().enumerate() {
        if let Some(message) = first_failure(phone, PHONE_RULES) {
            errors.insert(format!("phones.{idx}"), message);
        }
    }
    errors
}

#[derive(Debug)]
pub struct ProfileInfoForm {
    values: ProfileInfoUpdate,
    source_revision: u64,
    errors: FieldErrors,
    gate: SubmissionGate,
}

impl ProfileInfoForm {
    pub fn new(snapshot: &AppSnapshot) -> Self {
        Self {
            values: initial_values(snapshot.profile.as_ref()),
            source_revision: snapshot.profile_revision,
            errors: FieldErrors::new(),
            gate: SubmissionGate::default(),
        }
    }

    pub fn sync(&mut self, snapshot: &AppSnapshot) -> bool {
        if snapshot.profile_revision == self.source_revision {
            return false;
        }
        self.values = initial_values(snapshot.profile.as_ref());
        self.source_revision = snapshot.profile_revision;
        self.errors = FieldErrors::new();
        self.gate.reset();
        true
    }

    pub fn values(&self) -> &ProfileInfoUpdate {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn phase(&self) -> SubmitPhase {
        self.gate.phase()
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.values.first_name = value.into();
        self.errors.set(
            FIRST_NAME,
            first_failure_if_present(&self.values.first_name, NAME_RULES),
        );
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.values.last_name = value.into();
        self.errors.set(
            LAST_NAME,
            first_failure_if_present(&self.values.last_name, NAME_RULES),
        );
    }

    pub fn set_phones(&mut self, phones: Vec<String>) {
        self.values.phones = phones;
    }

    pub fn begin_submit(&mut self) -> Option<(SubmitTicket, ProfileInfoUpdate)> {
        if self.gate.is_submitting() {
            return None;
        }
        self.errors = validate_profile_info(&self.values);
        if !self.errors.is_empty() {
            debug!(errors = self.errors.len(), "profile form is invalid");
            return None;
        }
        let ticket = self.gate.begin()?;
        Some((ticket, self.values.clone()))
    }

    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<UserProfile, ClientError>,
        store: &dyn Dispatch,
        notices: &dyn NoticeSink,
    ) -> bool {
        if !self.gate.finish(ticket) {
            return false;
        }
        match result {
            Ok(profile) => {
                notices.push(Notice::success(keys::PROFILE_SAVED));
                store.dispatch(AppAction::ProfileLoaded(profile));
            }
            Err(err) => {
                warn!("saving profile info failed: {err}");
                notices.push(Notice::error_text(err.detail()));
            }
        }
        true
    }

    pub async fn submit(
        &mut self,
        api: &dyn MarketplaceApi,
        store: &dyn Dispatch,
        notices: &dyn NoticeSink,
    ) -> SubmitOutcome {
        if self.gate.is_submitting() {
            return SubmitOutcome::Ignored;
        }
        let Some((ticket, info)) = self.begin_submit() else {
            return SubmitOutcome::Invalid;
        };
        let result = api.update_profile(&info).await;
        let outcome = match &result {
            Ok(_) => SubmitOutcome::Saved,
            Err(err) => SubmitOutcome::Failed(err.clone()),
        };
        self.finish_submit(ticket, result, store, notices);
        outcome
    }
}

fn initial_values(profile: Option<&UserProfile>) -> ProfileInfoUpdate {
    profile.map(ProfileInfoUpdate::from).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        i18n::Message,
        notice::NoticeLog,
        store::AppStore,
        test_support::{bad_request, FakeApi},
    };
    use shared::domain::Locale;

    fn loaded_store() -> AppStore {
        let store = AppStore::new(Locale::En);
        store.dispatch(AppAction::ProfileLoaded(UserProfile {
            username: "olena".into(),
            first_name: "Olena".into(),
            last_name: "Kovalenko".into(),
            phones: vec!["+380501234567".into()],
            ..UserProfile::default()
        }));
        store
    }

    #[test]
    fn empty_names_are_accepted() {
        let errors = validate_profile_info(&ProfileInfoUpdate::default());
        assert!(errors.is_empty());
    }

    #[test]
    fn names_and_phones_are_checked() {
        let errors = validate_profile_info(&ProfileInfoUpdate {
            first_name: "O".into(),
            last_name: "Ko valenko".into(),
            phones: vec!["+380501234567".into(), "call me".into()],
        });
        assert_eq!(errors.get(FIRST_NAME), Some(&Message::Key(keys::MIN_2)));
        assert_eq!(errors.get(LAST_NAME), Some(&Message::Key(keys::NO_SPACE)));
        assert!(!errors.contains("phones.0"));
        assert_eq!(
            errors.get("phones.1"),
            Some(&Message::Key(keys::PHONE_MATCH))
        );
    }

    #[test]
    fn initial_values_follow_profile() {
        let store = loaded_store();
        let mut form = ProfileInfoForm::new(&store.snapshot());
        assert_eq!(form.values().first_name, "Olena");

        form.set_first_name("Olha");
        assert!(!form.sync(&store.snapshot()));
        assert_eq!(form.values().first_name, "Olha");

        store.dispatch(AppAction::ProfileLoaded(UserProfile::default()));
        assert!(form.sync(&store.snapshot()));
        assert_eq!(form.values(), &ProfileInfoUpdate::default());
    }

    #[tokio::test]
    async fn saved_profile_replaces_store_record() {
        let store = loaded_store();
        let notices = NoticeLog::new();
        let api = FakeApi::default();
        let mut form = ProfileInfoForm::new(&store.snapshot());
        form.set_last_name("Shevchenko");

        let outcome = form.submit(&api, &store, &notices).await;

        assert_eq!(outcome, SubmitOutcome::Saved);
        assert_eq!(
            store.snapshot().profile.as_ref().map(|p| p.last_name.as_str()),
            Some("Shevchenko")
        );
        assert_eq!(notices.drain(), vec![Notice::success(keys::PROFILE_SAVED)]);
    }

    #[tokio::test]
    async fn failure_keeps_values_and_reports() {
        let store = loaded_store();
        let notices = NoticeLog::new();
        let api = FakeApi::default().failing_profile(bad_request("Validation error(s): phone"));
        let mut form = ProfileInfoForm::new(&store.snapshot());
        form.set_first_name("Olha");

        let outcome = form.submit(&api, &store, &notices).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(form.values().first_name, "Olha");
        assert_eq!(
            notices.drain(),
            vec![Notice::error_text("Validation error(s): phone")]
        );
    }
}
