#![deny(clippy::all, clippy::pedantic)]

use inkpost::application::AppError;
use inkpost::config::LoadError;
use inkpost::infra::error::InfraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to start client: {0}")]
    Setup(#[source] AppError),
    /// A user action failed; the message is what the user should see.
    #[error("{message}")]
    Action {
        message: String,
        #[source]
        source: AppError,
    },
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Map a service error for an action whose generic failure text is
    /// `fallback`.
    pub fn action(fallback: &'static str) -> impl FnOnce(AppError) -> Self {
        move |source| Self::Action {
            message: source.user_message(fallback),
            source,
        }
    }
}
