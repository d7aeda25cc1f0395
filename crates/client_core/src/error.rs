use shared::error::{ErrorCode, ErrorMessage};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("not signed in")]
    Unauthenticated,
    #[error("invalid server url '{0}'")]
    InvalidUrl(String),
}

impl ClientError {
    /// Builds a status error from a failed response body. Prefers the
    /// backend's `{"error": ...}` message and falls back to the raw text.
    pub fn from_status_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorMessage>(body) {
            Ok(parsed) => parsed.error,
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => format!("HTTP {status}"),
        };
        Self::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.status().map(ErrorCode::from_status)
    }

    pub fn is_bad_request(&self) -> bool {
        self.code() == Some(ErrorCode::BadRequest)
    }

    /// Text to show the user: the server message for status errors, the
    /// full description otherwise.
    pub fn detail(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::MalformedResponse(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::MalformedResponse(value.to_string())
        } else if let Some(status) = value.status() {
            Self::Status {
                status: status.as_u16(),
                message: value.to_string(),
            }
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidUrl(value.to_string())
    }
}
