//! User flows: each service drives the API client and mirrors results into
//! the stores owned by [`AppContext`].

pub mod auth;
pub mod context;
pub mod dashboard;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod posts;
pub mod search;
pub mod uploads;

pub use auth::AuthService;
pub use context::AppContext;
pub use dashboard::{Dashboard, DashboardService, DashboardStats};
pub use debounce::Debouncer;
pub use error::AppError;
pub use feed::{FeedService, HomeFeed};
pub use posts::{PostListing, PostQuery, PostService};
pub use search::{LiveSearch, SearchService};
pub use uploads::UploadService;

#[cfg(test)]
pub(crate) mod test_support;
