//! Translation keys emitted by the controllers and a small built-in catalog
//! to render them.

use std::fmt;

use shared::domain::Locale;

pub mod keys {
    pub const REQUIRE_FIELD: &str = "errors.requireField";
    pub const NO_SPACE: &str = "errors.noSpace";
    pub const MIN_2: &str = "errors.min2";
    pub const MAX_50: &str = "errors.max50";
    pub const NAME_MATCH: &str = "errors.nameMatch";
    pub const PHONE_MATCH: &str = "errors.phoneMatch";
    pub const DATE_IN_FUTURE: &str = "errors.dateInFuture";
    pub const CHOOSE_BIRTH_DATE: &str = "ownInfo.chooseData";
    pub const CHILDREN_SAVED: &str = "popup.addChildren";
    pub const PROFILE_SAVED: &str = "popup.saveChanges";
}

/// Either a translation key or text received verbatim from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Key(&'static str),
    Text(String),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Text(text) => f.write_str(text),
        }
    }
}

pub trait Translator: Send + Sync {
    fn translate(&self, locale: Locale, key: &str) -> Option<String>;

    fn render(&self, locale: Locale, message: &Message) -> String {
        match message {
            Message::Key(key) => self
                .translate(locale, key)
                .unwrap_or_else(|| (*key).to_string()),
            Message::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl Translator for BuiltinCatalog {
    fn translate(&self, locale: Locale, key: &str) -> Option<String> {
        let text = match (locale, key) {
            (Locale::En, keys::REQUIRE_FIELD) => "This field is required",
            (Locale::En, keys::NO_SPACE) => "Spaces are not allowed",
            (Locale::En, keys::MIN_2) => "At least 2 characters",
            (Locale::En, keys::MAX_50) => "No more than 50 characters",
            (Locale::En, keys::NAME_MATCH) => "Only letters, apostrophe and hyphen",
            (Locale::En, keys::PHONE_MATCH) => "Phone number format: +380XXXXXXXXX",
            (Locale::En, keys::DATE_IN_FUTURE) => "Date cannot be in the future",
            (Locale::En, keys::CHOOSE_BIRTH_DATE) => "Choose a birth date first",
            (Locale::En, keys::CHILDREN_SAVED) => "Children saved",
            (Locale::En, keys::PROFILE_SAVED) => "Changes saved",

            (Locale::Uk, keys::REQUIRE_FIELD) => "Обов'язкове поле",
            (Locale::Uk, keys::NO_SPACE) => "Пробіли не допускаються",
            (Locale::Uk, keys::MIN_2) => "Щонайменше 2 символи",
            (Locale::Uk, keys::MAX_50) => "Не більше 50 символів",
            (Locale::Uk, keys::NAME_MATCH) => "Лише літери, апостроф і дефіс",
            (Locale::Uk, keys::PHONE_MATCH) => "Формат номера: +380XXXXXXXXX",
            (Locale::Uk, keys::DATE_IN_FUTURE) => "Дата не може бути в майбутньому",
            (Locale::Uk, keys::CHOOSE_BIRTH_DATE) => "Спочатку оберіть дату народження",
            (Locale::Uk, keys::CHILDREN_SAVED) => "Дітей збережено",
            (Locale::Uk, keys::PROFILE_SAVED) => "Зміни збережено",

            (Locale::Ru, keys::REQUIRE_FIELD) => "Обязательное поле",
            (Locale::Ru, keys::NO_SPACE) => "Пробелы не допускаются",
            (Locale::Ru, keys::MIN_2) => "Минимум 2 символа",
            (Locale::Ru, keys::MAX_50) => "Не более 50 символов",
            (Locale::Ru, keys::NAME_MATCH) => "Только буквы, апостроф и дефис",
            (Locale::Ru, keys::PHONE_MATCH) => "Формат номера: +380XXXXXXXXX",
            (Locale::Ru, keys::DATE_IN_FUTURE) => "Дата не может быть в будущем",
            (Locale::Ru, keys::CHOOSE_BIRTH_DATE) => "Сначала выберите дату рождения",
            (Locale::Ru, keys::CHILDREN_SAVED) => "Дети сохранены",
            (Locale::Ru, keys::PROFILE_SAVED) => "Изменения сохранены",

            _ => return None,
        };
        Some(text.to_string())
    }
}
