//! Outbound access to the blogging backend.

mod error;
mod http;
mod navigator;

pub use error::ApiError;
pub use http::{ApiClient, ClientOptions, api_path};
pub use navigator::{LoggingNavigator, Navigator, RecordingNavigator, Route};
