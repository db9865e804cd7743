#![deny(clippy::all, clippy::pedantic)]

pub mod auth;
pub mod dashboard;
pub mod feed;
pub mod posts;
pub mod search;
pub mod uploads;
