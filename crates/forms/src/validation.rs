//! Field rules and the error map they fill. Each rule is a pure function of
//! one field value; a field's rules run in order and the first failure wins.

use std::sync::OnceLock;

use regex::Regex;

use crate::i18n::{keys, Message};

pub type Rule = fn(&str) -> Option<Message>;

const NAME_PATTERN: &str = r"^[\p{L}'’-]+$";
const PHONE_PATTERN: &str = r"^\+?3?8?0\d{9}$";

pub fn required(value: &str) -> Option<Message> {
    value.is_empty().then_some(Message::Key(keys::REQUIRE_FIELD))
}

pub fn no_space(value: &str) -> Option<Message> {
    value
        .chars()
        .any(char::is_whitespace)
        .then_some(Message::Key(keys::NO_SPACE))
}

pub fn min_len_2(value: &str) -> Option<Message> {
    (value.chars().count() < 2).then_some(Message::Key(keys::MIN_2))
}

pub fn max_len_50(value: &str) -> Option<Message> {
    (value.chars().count() > 50).then_some(Message::Key(keys::MAX_50))
}

pub fn name_pattern(value: &str) -> Option<Message> {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let re = NAME.get_or_init(|| Regex::new(NAME_PATTERN).expect("name pattern compiles"));
    (!re.is_match(value)).then_some(Message::Key(keys::NAME_MATCH))
}

pub fn phone_pattern(value: &str) -> Option<Message> {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    let re = PHONE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"));
    (!re.is_match(value)).then_some(Message::Key(keys::PHONE_MATCH))
}

pub fn first_failure(value: &str, rules: &[Rule]) -> Option<Message> {
    rules.iter().find_map(|rule| rule(value))
}

/// Like [`first_failure`], but an empty value is always accepted.
pub fn first_failure_if_present(value: &str, rules: &[Rule]) -> Option<Message> {
    if value.is_empty() {
        None
    } else {
        first_failure(value, rules)
    }
}

/// Field path to message, in the order the errors were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Message)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error for `field`, replacing any earlier one.
    pub fn insert(&mut self, field: impl Into<String>, message: Message) {
        let field = field.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = message,
            None => self.entries.push((field, message)),
        }
    }

    pub fn set(&mut self, field: &str, message: Option<Message>) {
        match message {
            Some(message) => self.insert(field, message),
            None => self.remove(field),
        }
    }

    pub fn remove(&mut self, field: &str) {
        self.entries.retain(|(name, _)| name != field);
    }

    pub fn get(&self, field: &str) -> Option<&Message> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.entries
            .iter()
            .map(|(name, message)| (name.as_str(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_then_no_space_reports_first_failure() {
        let rules: &[Rule] = &[required, no_space];
        assert_eq!(
            first_failure("", rules),
            Some(Message::Key(keys::REQUIRE_FIELD))
        );
        assert_eq!(first_failure("a b", rules), Some(Message::Key(keys::NO_SPACE)));
        assert_eq!(first_failure("ab", rules), None);
    }

    #[test]
    fn optional_rules_skip_empty_values() {
        let rules: &[Rule] = &[min_len_2, max_len_50, no_space, name_pattern];
        assert_eq!(first_failure_if_present("", rules), None);
        assert_eq!(
            first_failure_if_present("A", rules),
            Some(Message::Key(keys::MIN_2))
        );
        assert_eq!(first_failure_if_present("Олена", rules), None);
        assert_eq!(first_failure_if_present("O'Neil-Smith", rules), None);
        assert_eq!(
            first_failure_if_present("R2D2", rules),
            Some(Message::Key(keys::NAME_MATCH))
        );
        assert_eq!(
            first_failure_if_present(&"a".repeat(51), rules),
            Some(Message::Key(keys::MAX_50))
        );
    }

    #[test]
    fn phone_pattern_accepts_ukrainian_numbers() {
        assert_eq!(phone_pattern("+380501234567"), None);
        assert_eq!(phone_pattern("0501234567"), None);
        assert_eq!(
            phone_pattern("12345"),
            Some(Message::Key(keys::PHONE_MATCH))
        );
    }

    #[test]
    fn field_errors_replace_and_keep_order() {
        let mut errors = FieldErrors::new();
        errors.insert("usernameOrEmail", Message::Key(keys::REQUIRE_FIELD));
        errors.insert("password", Message::Key(keys::NO_SPACE));
        errors.insert("usernameOrEmail", Message::Text("Unknown user".into()));

        let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["usernameOrEmail", "password"]);
        assert_eq!(
            errors.get("usernameOrEmail"),
            Some(&Message::Text("Unknown user".into()))
        );

        errors.set("password", None);
        assert_eq!(errors.len(), 1);
    }
}
