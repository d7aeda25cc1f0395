use super::{load_settings_with, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use shared::domain::Locale;

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("marketplace_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("marketplace.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn cleanup(path: PathBuf) {
    if let Some(dir) = path.parent() {
        fs::remove_dir_all(dir).expect("cleanup");
    }
}

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn missing_file_keeps_defaults() {
    let settings = load_settings_with(
        &env::temp_dir().join("marketplace_does_not_exist.toml"),
        env_of(&[]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config(
        r#"
api_base_url = "https://market.example/api/v1"
locale = "en"
request_timeout_secs = 5
"#,
    );

    let settings = load_settings_with(&path, env_of(&[]));

    assert_eq!(settings.api_base_url, "https://market.example/api/v1");
    assert_eq!(settings.locale, Locale::En);
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(settings.log_filter, "info");
    cleanup(path);
}

#[test]
fn environment_wins_over_file() {
    let path = temp_config("locale = \"en\"\nlog_filter = \"warn\"\n");

    let settings = load_settings_with(
        &path,
        env_of(&[
            ("MARKETPLACE_API_URL", "https://legacy.example/"),
            ("APP__API_BASE_URL", "https://primary.example/api/"),
            ("APP__LOCALE", "ru"),
            ("RUST_LOG", "debug"),
            ("APP__REQUEST_TIMEOUT_SECS", "12"),
        ]),
    );

    assert_eq!(settings.api_base_url, "https://primary.example/api/");
    assert_eq!(settings.locale, Locale::Ru);
    assert_eq!(settings.log_filter, "debug");
    assert_eq!(settings.request_timeout_secs, 12);
    cleanup(path);
}

#[test]
fn invalid_values_fall_back_to_previous_layer() {
    let path = temp_config("api_base_url = \"https://market.example/\"\nlocale = \"en\"\n");

    let settings = load_settings_with(
        &path,
        env_of(&[
            ("APP__API_BASE_URL", "not a url"),
            ("APP__LOCALE", "de"),
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
        ]),
    );

    assert_eq!(settings.api_base_url, "https://market.example/");
    assert_eq!(settings.locale, Locale::En);
    assert_eq!(settings.request_timeout_secs, 30);
    cleanup(path);
}

#[test]
fn unparsable_file_is_ignored() {
    let path = temp_config("request_timeout_secs = \"ten\"\n");
    let settings = load_settings_with(&path, env_of(&[]));
    assert_eq!(settings, Settings::default());
    cleanup(path);
}
