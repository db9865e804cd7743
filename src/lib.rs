//! Client core for a REST blogging backend.
//!
//! [`client::ApiClient`] talks to the server through a short-lived response
//! cache and owns the global reaction to expired sessions.
//! [`store::AuthStore`] and [`store::PostStore`] hold the state every view
//! reads, and the services in [`application`] keep them in sync with the
//! server.

pub mod application;
pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod infra;
pub mod store;
mod util;
