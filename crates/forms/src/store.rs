//! Process-wide application state: an immutable snapshot replaced on every
//! dispatched action.

use std::sync::{Arc, RwLock};

use shared::{
    domain::{Child, Locale, UserProfile},
    protocol::Session,
};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSnapshot {
    pub locale: Locale,
    pub session: Option<Session>,
    pub profile: Option<UserProfile>,
    /// Bumped whenever the profile's children are replaced.
    pub children_revision: u64,
    /// Bumped whenever the profile record is replaced.
    pub profile_revision: u64,
}

impl AppSnapshot {
    pub fn children(&self) -> Option<&[Child]> {
        self.profile.as_ref().map(|profile| profile.children.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    LoggedIn(Session),
    LoggedOut,
    ProfileLoaded(UserProfile),
    ChildrenSaved(Vec<Child>),
    LocaleChanged(Locale),
}

impl AppAction {
    fn name(&self) -> &'static str {
        match self {
            Self::LoggedIn(_) => "logged_in",
            Self::LoggedOut => "logged_out",
            Self::ProfileLoaded(_) => "profile_loaded",
            Self::ChildrenSaved(_) => "children_saved",
            Self::LocaleChanged(_) => "locale_changed",
        }
    }
}

pub trait Dispatch: Send + Sync {
    fn dispatch(&self, action: AppAction);
}

pub fn reduce(current: &AppSnapshot, action: AppAction) -> AppSnapshot {
    let mut next = current.clone();
    match action {
        AppAction::LoggedIn(session) => {
            next.session = Some(session);
        }
        AppAction::LoggedOut => {
            next.session = None;
            next.profile = None;
            next.profile_revision += 1;
            next.children_revision += 1;
        }
        AppAction::ProfileLoaded(profile) => {
            // children forms only rebuild when the children themselves changed
            if current.children().unwrap_or_default() != profile.children.as_slice() {
                next.children_revision += 1;
            }
            next.profile = Some(profile);
            next.profile_revision += 1;
        }
        AppAction::ChildrenSaved(children) => {
            next.profile.get_or_insert_with(UserProfile::default).children = children;
            next.children_revision += 1;
        }
        AppAction::LocaleChanged(locale) => {
            next.locale = locale;
        }
    }
    next
}

#[derive(Debug, Default)]
pub struct AppStore {
    current: RwLock<Arc<AppSnapshot>>,
}

impl AppStore {
    pub fn new(locale: Locale) -> Self {
        Self {
            current: RwLock::new(Arc::new(AppSnapshot {
                locale,
                ..AppSnapshot::default()
            })),
        }
    }

    pub fn snapshot(&self) -> Arc<AppSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }
}

impl Dispatch for AppStore {
    fn dispatch(&self, action: AppAction) {
        let name = action.name();
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = reduce(&guard, action);
        debug!(
            action = name,
            children_revision = next.children_revision,
            "store updated"
        );
        *guard = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use shared::domain::Sex;

    use super::*;

    fn child(year: i32) -> Child {
        Child {
            birth_date: NaiveDate::from_ymd_opt(year, 1, 1).expect("date"),
            sex: Sex::Female,
        }
    }

    #[test]
    fn saving_children_bumps_only_children_revision() {
        let store = AppStore::new(Locale::En);
        store.dispatch(AppAction::ProfileLoaded(UserProfile {
            username: "olena".into(),
            ..UserProfile::default()
        }));
        let before = store.snapshot();

        store.dispatch(AppAction::ChildrenSaved(vec![child(2016)]));
        let after = store.snapshot();

        assert_eq!(after.children_revision, before.children_revision + 1);
        assert_eq!(after.profile_revision, before.profile_revision);
        assert_eq!(after.children(), Some(&[child(2016)][..]));
        assert_eq!(before.children(), Some(&[][..]));
    }

    #[test]
    fn reloading_profile_keeps_children_revision_when_children_match() {
        let store = AppStore::new(Locale::En);
        let profile = UserProfile {
            username: "olena".into(),
            children: vec![child(2016)],
            ..UserProfile::default()
        };
        store.dispatch(AppAction::ProfileLoaded(profile.clone()));
        let before = store.snapshot();

        store.dispatch(AppAction::ProfileLoaded(UserProfile {
            first_name: "Olha".into(),
            ..profile.clone()
        }));
        let renamed = store.snapshot();
        assert_eq!(renamed.children_revision, before.children_revision);
        assert_eq!(renamed.profile_revision, before.profile_revision + 1);

        store.dispatch(AppAction::ProfileLoaded(UserProfile {
            children: vec![child(2016), child(2020)],
            ..profile
        }));
        assert_eq!(
            store.snapshot().children_revision,
            before.children_revision + 1
        );
    }

    #[test]
    fn first_profile_without_children_keeps_children_revision() {
        let store = AppStore::new(Locale::En);
        store.dispatch(AppAction::ProfileLoaded(UserProfile::default()));
        assert_eq!(store.snapshot().children_revision, 0);
    }

    #[test]
    fn snapshots_are_not_mutated_by_later_dispatches() {
        let store = AppStore::new(Locale::Uk);
        let first = store.snapshot();
        store.dispatch(AppAction::LocaleChanged(Locale::En));

        assert_eq!(first.locale, Locale::Uk);
        assert_eq!(store.snapshot().locale, Locale::En);
    }

    #[test]
    fn logout_clears_profile() {
        let store = AppStore::new(Locale::Uk);
        store.dispatch(AppAction::ChildrenSaved(vec![child(2014)]));
        store.dispatch(AppAction::LoggedOut);

        let snapshot = store.snapshot();
        assert!(snapshot.profile.is_none());
        assert!(snapshot.children().is_none());
    }
}
