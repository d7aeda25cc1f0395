use serde::{Deserialize, Serialize};

use crate::domain::UserProfile;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username_or_email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Authenticated session as held by the client. `remember` mirrors the
/// "remember me" choice made on the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub remember: bool,
}

impl Session {
    pub fn from_login(response: LoginResponse, remember: bool) -> Self {
        Self {
            username: response.username,
            email: response.email,
            first_name: response.first_name,
            last_name: response.last_name,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            remember,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfoUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phones: Vec<String>,
}

impl From<&UserProfile> for ProfileInfoUpdate {
    fn from(value: &UserProfile) -> Self {
        Self {
            first_name: value.first_name.clone(),
            last_name: value.last_name.clone(),
            phones: value.phones.clone(),
        }
    }
}
