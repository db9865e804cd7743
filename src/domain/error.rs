use thiserror::Error;

/// Input rejected on the client. Display text is shown to the user as is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{message}")]
    Validation { message: String },
    #[error("Please login to {action}")]
    LoginRequired { action: &'static str },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn login_required(action: &'static str) -> Self {
        Self::LoginRequired { action }
    }
}
