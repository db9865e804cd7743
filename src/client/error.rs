use inkpost_api_types::ErrorBody;
use thiserror::Error;

use crate::domain::error::DomainError;

/// Failure of an API operation as seen by the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable response: connect failure, timeout or a truncated body.
    #[error("network failure: {message}")]
    NetworkFailure { message: String, timed_out: bool },
    /// The server answered with a non-2xx status other than 401.
    #[error("server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    ServerError { status: u16, message: Option<String> },
    /// Rejected on the client before any request was sent.
    #[error("{message}")]
    ValidationFailure { message: String },
    /// The server answered 401. The session has already been cleared and the
    /// navigator sent to the login entry point.
    #[error("session expired: {}", .message.as_deref().unwrap_or("please log in again"))]
    AuthExpired { message: Option<String> },
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailure {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::decode(err.to_string());
        }
        Self::NetworkFailure {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }

    /// Build the error for a non-2xx response, pulling `message` out of the
    /// JSON body when the server sent one.
    pub(crate) fn from_status(status: u16, body: &[u8]) -> Self {
        let message = server_message(body);
        if status == 401 {
            Self::AuthExpired { message }
        } else {
            Self::ServerError { status, message }
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            Self::AuthExpired { .. } => Some(401),
            _ => None,
        }
    }

    /// Text to show the user: the server's message when it sent one,
    /// validation text as is, otherwise the action-specific `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::ServerError {
                message: Some(message),
                ..
            }
            | Self::AuthExpired {
                message: Some(message),
            }
            | Self::ValidationFailure { message } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::validation(err.to_string())
    }
}

fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}
