use std::error::Error as StdError;

use thiserror::Error;

use crate::client::ApiError;
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        Self::Api(err.into())
    }
}

impl AppError {
    /// Message for the user; `fallback` names the failed action.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(err) => err.user_message(fallback),
            Self::Infra(_) => fallback.to_string(),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_auth_expired())
    }

    /// Every message in the source chain, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut current = self.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        messages
    }
}
