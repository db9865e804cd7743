//! Landing page feed with site-wide counters.

use std::sync::Arc;

use inkpost_api_types::{Post, PostPage, PostsPayload, SiteStats};
use serde::Serialize;
use tracing::warn;

use crate::client::ApiClient;
use crate::store::{Pagination, PostStore};

use super::context::AppContext;
use super::error::AppError;
use super::posts::{DEFAULT_PAGE_SIZE, category_param};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeFeed {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
    pub stats: SiteStats,
}

pub struct FeedService {
    api: ApiClient,
    posts: Arc<PostStore>,
}

impl FeedService {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api().clone(),
            posts: Arc::clone(ctx.posts()),
        }
    }

    /// Latest posts, optionally narrowed to a category (`all` means none),
    /// fetched together with site stats. Missing stats read as zeros.
    pub async fn home(&self, category: Option<&str>) -> Result<HomeFeed, AppError> {
        let mut params = vec![("limit", DEFAULT_PAGE_SIZE.to_string())];
        if let Some(category) = category_param(category) {
            params.push(("category", category));
        }

        self.posts.set_loading(true);
        let (posts, stats) = tokio::join!(
            self.api.get::<PostsPayload>("/api/posts", &params),
            self.api.get::<SiteStats>("/api/stats", &[]),
        );

        let page = match posts {
            Ok(PostsPayload::Page(page)) => page,
            Ok(PostsPayload::List(posts)) => PostPage {
                posts: Some(posts),
                ..PostPage::default()
            },
            Err(err) => {
                self.posts.set_error(Some(err.user_message("Failed to load posts")));
                return Err(err.into());
            }
        };
        let stats = stats.unwrap_or_else(|err| {
            warn!(error = %err, "site stats unavailable");
            SiteStats::default()
        });

        // Only the page count is trusted from the feed endpoint.
        self.posts.set_posts(PostsPayload::Page(PostPage {
            posts: page.posts,
            pages: page.pages,
            ..PostPage::default()
        }));

        Ok(HomeFeed {
            posts: self.posts.posts(),
            pagination: self.posts.pagination(),
            stats,
        })
    }
}
