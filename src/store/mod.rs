//! Process-wide client state.

mod auth;
mod posts;

pub use auth::{AuthPhase, AuthStore, Session};
pub use posts::{
    FilterPatch, Pagination, PostCollectionState, PostFilters, PostSort, PostStore, filter_posts,
};
