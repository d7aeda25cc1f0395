use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::Locale;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "marketplace.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub locale: Locale,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080/api/v1/".into(),
            locale: Locale::Uk,
            request_timeout_secs: 30,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    locale: Option<String>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

pub fn load_settings(path: &Path) -> Settings {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file at `path` if it parses, then environment
/// variables read through `env`. Values that do not parse are skipped.
pub fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            if let Some(v) = file_cfg.api_base_url {
                set_base_url(&mut settings, v);
            }
            if let Some(v) = file_cfg.locale {
                set_locale(&mut settings, &v);
            }
            if let Some(v) = file_cfg.request_timeout_secs.filter(|secs| *secs > 0) {
                settings.request_timeout_secs = v;
            }
            if let Some(v) = file_cfg.log_filter {
                settings.log_filter = v;
            }
        }
    }

    if let Some(v) = env("MARKETPLACE_API_URL") {
        set_base_url(&mut settings, v);
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        set_base_url(&mut settings, v);
    }

    if let Some(v) = env("APP__LOCALE") {
        set_locale(&mut settings, &v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            if parsed > 0 {
                settings.request_timeout_secs = parsed;
            }
        }
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings
}

fn set_base_url(settings: &mut Settings, raw: String) {
    if Url::parse(raw.trim()).is_ok() {
        settings.api_base_url = raw.trim().to_string();
    }
}

fn set_locale(settings: &mut Settings, raw: &str) {
    if let Ok(locale) = raw.parse::<Locale>() {
        settings.locale = locale;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
