//! Headless form controllers for the marketplace client: the profile's
//! children editor, the login form, the "about myself" form and the
//! add-goods category selector, plus the store, notices and backend bridge
//! they are wired through.

pub mod backend_bridge;
pub mod category;
pub mod children;
pub mod i18n;
pub mod login;
pub mod notice;
pub mod profile;
pub mod store;
pub mod submission;
pub mod validation;

pub use i18n::{BuiltinCatalog, Message, Translator};
pub use notice::{Notice, NoticeLevel, NoticeLog, NoticeSink};
pub use store::{AppAction, AppSnapshot, AppStore, Dispatch};
pub use validation::FieldErrors;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
