//! Personal dashboard: the user's posts plus aggregate counters.

use std::sync::Arc;

use inkpost_api_types::{Analytics, Post, PostsPayload};
use serde::Serialize;
use tracing::warn;

use crate::client::ApiClient;
use crate::store::PostStore;

use super::context::AppContext;
use super::error::AppError;

const RECENT_POSTS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_posts: u64,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
}

impl DashboardStats {
    /// Totals over `posts`, saturating at `u64::MAX`.
    pub fn from_posts(posts: &[Post]) -> Self {
        posts.iter().fold(
            Self {
                total_posts: posts.len() as u64,
                ..Self::default()
            },
            |acc, post| Self {
                total_views: acc.total_views.saturating_add(post.views),
                total_likes: acc.total_likes.saturating_add(post.likes_count),
                total_comments: acc.total_comments.saturating_add(post.comments_count),
                ..acc
            },
        )
    }

    /// Server-side analytics win wherever they report a non-zero value.
    pub fn with_analytics(self, analytics: &Analytics) -> Self {
        let prefer = |reported: Option<u64>, computed: u64| {
            reported.filter(|value| *value > 0).unwrap_or(computed)
        };
        Self {
            total_views: prefer(analytics.total_views, self.total_views),
            total_likes: prefer(analytics.total_likes, self.total_likes),
            total_comments: prefer(analytics.total_comments, self.total_comments),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_posts: Vec<Post>,
}

pub struct DashboardService {
    api: ApiClient,
    posts: Arc<PostStore>,
}

impl DashboardService {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api().clone(),
            posts: Arc::clone(ctx.posts()),
        }
    }

    /// Fetch the user's posts and analytics concurrently. Analytics are
    /// optional; a failed post listing fails the dashboard.
    pub async fn load(&self) -> Result<Dashboard, AppError> {
        let (posts, analytics) = tokio::join!(
            self.api.get::<PostsPayload>("/api/posts/user/me", &[]),
            self.api.get::<Analytics>("/api/posts/analytics", &[]),
        );

        let analytics = analytics.unwrap_or_else(|err| {
            warn!(error = %err, "analytics unavailable; using post totals");
            Analytics::default()
        });
        let posts = posts?.into_posts();

        let stats = DashboardStats::from_posts(&posts).with_analytics(&analytics);
        let recent_posts = posts.iter().take(RECENT_POSTS).cloned().collect();
        self.posts.set_user_posts(posts.into());

        Ok(Dashboard {
            stats,
            recent_posts,
        })
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use serde_json::json;

    use crate::application::test_support::{logged_in, post_json};

    use super::*;

    fn posts_json(count: usize) -> serde_json::Value {
        let posts: Vec<_> = (0..count)
            .map(|i| post_json(&format!("p{i}"), &format!("Post {i}")))
            .collect();
        json!({ "posts": posts })
    }

    #[test]
    fn totals_saturate_on_huge_counts() {
        let mut first: Post = serde_json::from_value(post_json("a", "A")).expect("post");
        first.views = u64::MAX;
        first.likes_count = u64::MAX - 1;
        let second: Post = serde_json::from_value(post_json("b", "B")).expect("post");

        let stats = DashboardStats::from_posts(&[first, second]);
        assert_eq!(stats.total_posts, 2);
        assert_eq!(stats.total_views, u64::MAX);
        assert_eq!(stats.total_likes, u64::MAX);
    }

    #[tokio::test]
    async fn analytics_override_computed_totals() -> Result<(), AppError> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/posts/user/me");
            then.status(200).json_body(posts_json(7));
        });
        server.mock(|when, then| {
            when.method("GET").path("/api/posts/analytics");
            then.status(200)
                .json_body(json!({"totalViews": 1000, "totalLikes": 0}));
        });

        let app = logged_in(&server);
        let dashboard = app.ctx.dashboard_service().load().await?;

        assert_eq!(dashboard.recent_posts.len(), 5);
        assert_eq!(dashboard.recent_posts[0].id, "p0");
        assert_eq!(
            dashboard.stats,
            DashboardStats {
                total_posts: 7,
                total_views: 1000,
                total_likes: 7,
                total_comments: 0,
            }
        );
        assert_eq!(app.ctx.posts().user_posts().len(), 7);
        Ok(())
    }

    #[tokio::test]
    async fn analytics_failure_falls_back() -> Result<(), AppError> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/posts/user/me");
            then.status(200).json_body(posts_json(2));
        });
        server.mock(|when, then| {
            when.method("GET").path("/api/posts/analytics");
            then.status(500);
        });

        let app = logged_in(&server);
        let dashboard = app.ctx.dashboard_service().load().await?;

        assert_eq!(dashboard.stats.total_posts, 2);
        assert_eq!(dashboard.stats.total_views, 20);
        Ok(())
    }

    #[tokio::test]
    async fn posts_failure_fails_dashboard() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/posts/user/me");
            then.status(503);
        });
        server.mock(|when, then| {
            when.method("GET").path("/api/posts/analytics");
            then.status(200).json_body(json!({}));
        });

        let app = logged_in(&server);
        let err = app.ctx.dashboard_service().load().await.expect_err("posts failed");
        assert_eq!(
            err.user_message("Failed to load dashboard data"),
            "Failed to load dashboard data"
        );
    }
}
