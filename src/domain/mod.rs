//! Client-side rules applied before anything is sent to the backend.

pub mod error;
pub mod posts;
pub mod uploads;
