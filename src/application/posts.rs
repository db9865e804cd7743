//! Post browsing, authoring and social actions.
//!
//! Reads mirror their results into [`PostStore`]; writes update the store
//! only after the server accepted them.

use std::sync::Arc;

use inkpost_api_types::{Comment, CommentInput, LikeResponse, Post, PostsPayload};
use serde::Serialize;
use tracing::{debug, info};

use crate::client::{ApiClient, api_path};
use crate::domain::error::DomainError;
use crate::domain::posts::{PostDraft, comment_body};
use crate::store::{AuthStore, Pagination, PostStore};

use super::context::AppContext;
use super::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 12;
const ALL_CATEGORIES: &str = "all";

/// Listing parameters for `/api/posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl PostQuery {
    /// Query pairs in a stable order. Blank search and the `all` category
    /// are omitted.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.unwrap_or(1).to_string()),
            ("limit", self.limit.unwrap_or(DEFAULT_PAGE_SIZE).to_string()),
        ];
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("q", search.to_string()));
        }
        if let Some(category) = category_param(self.category.as_deref()) {
            params.push(("category", category));
        }
        params
    }
}

/// `None` for a missing, blank or `all` category.
pub(crate) fn category_param(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|category| !category.is_empty() && *category != ALL_CATEGORIES)
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListing {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
    pub has_more: bool,
}

pub struct PostService {
    api: ApiClient,
    auth: Arc<AuthStore>,
    posts: Arc<PostStore>,
}

impl PostService {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api().clone(),
            auth: Arc::clone(ctx.auth()),
            posts: Arc::clone(ctx.posts()),
        }
    }

    pub async fn list(&self, query: &PostQuery) -> Result<PostListing, AppError> {
        self.posts.set_loading(true);
        let params = query.to_params();
        match self.api.get::<PostsPayload>("/api/posts", &params).await {
            Ok(payload) => {
                self.posts.set_error(None);
                self.posts.set_posts(payload);
                Ok(self.listing())
            }
            Err(err) => {
                self.posts.set_error(Some(err.user_message("Failed to load posts")));
                Err(err.into())
            }
        }
    }

    /// Fetch the page after the current one for `query` and append it to the
    /// browsing list. Once the last page is held this returns the listing
    /// without a request.
    pub async fn load_more(&self, query: &PostQuery) -> Result<PostListing, AppError> {
        let pagination = self.posts.pagination();
        if !pagination.has_more() {
            return Ok(self.listing());
        }

        let page = pagination.current_page.saturating_add(1);
        let params = PostQuery {
            page: Some(page),
            ..query.clone()
        }
        .to_params();
        self.posts.set_loading(true);
        match self.api.get::<PostsPayload>("/api/posts", &params).await {
            Ok(payload) => {
                self.posts.set_error(None);
                self.posts.append_posts(payload, page);
                debug!(page, "next page appended");
                Ok(self.listing())
            }
            Err(err) => {
                self.posts.set_error(Some(err.user_message("Failed to load posts")));
                Err(err.into())
            }
        }
    }

    fn listing(&self) -> PostListing {
        let pagination = self.posts.pagination();
        PostListing {
            posts: self.posts.posts(),
            pagination,
            has_more: pagination.has_more(),
        }
    }

    /// Load one post and make it the current post.
    pub async fn get(&self, id: &str) -> Result<Post, AppError> {
        let post: Post = self.api.get(&api_path(&["api", "posts", id])?, &[]).await?;
        self.posts.set_current_post(Some(post.clone()));
        Ok(post)
    }

    /// Posts authored by the logged-in user.
    pub async fn mine(&self) -> Result<Vec<Post>, AppError> {
        let payload: PostsPayload = self.api.get("/api/posts/user/me", &[]).await?;
        self.posts.set_user_posts(payload);
        Ok(self.posts.user_posts())
    }

    pub async fn trending(&self, limit: u32) -> Result<Vec<Post>, AppError> {
        let payload: PostsPayload = self
            .api
            .get("/api/posts/trending", &[("limit", limit.to_string())])
            .await?;
        Ok(payload.into_posts())
    }

    pub async fn create(&self, draft: PostDraft) -> Result<Post, AppError> {
        let input = draft.into_input()?;
        let post: Post = self.api.post("/api/posts", &input).await?;
        info!(post = %post.id, "post created");
        self.posts.add_post(post.clone());
        Ok(post)
    }

    pub async fn update(&self, id: &str, draft: PostDraft) -> Result<Post, AppError> {
        let input = draft.into_input()?;
        let post: Post = self
            .api
            .put(&api_path(&["api", "posts", id])?, &input)
            .await?;
        info!(post = %post.id, "post updated");
        self.posts.update_post(post.clone());
        Ok(post)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.api.delete(&api_path(&["api", "posts", id])?).await?;
        info!(post = %id, "post deleted");
        self.posts.remove_post(id);
        Ok(())
    }

    /// Toggle the user's like; the returned count is applied to every held
    /// copy of the post.
    pub async fn like(&self, id: &str) -> Result<LikeResponse, AppError> {
        if !self.auth.is_authenticated() {
            return Err(DomainError::login_required("like posts").into());
        }
        let response: LikeResponse = self
            .api
            .post_empty(&api_path(&["api", "posts", id, "like"])?)
            .await?;
        let held = self
            .posts
            .patch_post(id, |post| post.likes_count = response.likes_count);
        debug!(post = %id, held, liked = response.is_liked, "like applied");
        Ok(response)
    }

    pub async fn comments(&self, id: &str) -> Result<Vec<Comment>, AppError> {
        let path = api_path(&["api", "posts", id, "comments"])?;
        Ok(self.api.get(&path, &[]).await?)
    }

    pub async fn add_comment(&self, id: &str, content: &str) -> Result<Comment, AppError> {
        if !self.auth.is_authenticated() {
            return Err(DomainError::login_required("comment").into());
        }
        let body = CommentInput {
            content: comment_body(content)?,
        };
        let comment: Comment = self
            .api
            .post(&api_path(&["api", "posts", id, "comments"])?, &body)
            .await?;
        self.posts
            .patch_post(id, |post| post.comments_count = post.comments_count.saturating_add(1));
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use serde_json::json;

    use crate::application::test_support::{app, logged_in, post_json};

    use super::*;

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.into(),
            content: "<p>body</p>".into(),
            excerpt: String::new(),
            categories: "tech, rust".into(),
            cover_image: None,
        }
    }

    #[test]
    fn query_params_skip_blank_and_all() {
        let query = PostQuery {
            page: Some(2),
            search: Some("  ".into()),
            category: Some("all".into()),
            ..PostQuery::default()
        };
        assert_eq!(
            query.to_params(),
            [("page", "2".to_string()), ("limit", "12".to_string())]
        );

        let query = PostQuery {
            search: Some("rust".into()),
            category: Some("tech".into()),
            ..PostQuery::default()
        };
        let params = query.to_params();
        assert!(params.contains(&("q", "rust".to_string())));
        assert!(params.contains(&("category", "tech".to_string())));
    }

    #[tokio::test]
    async fn list_mirrors_into_store() -> Result<(), AppError> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/api/posts")
                .query_param("page", "1")
                .query_param("limit", "12")
                .query_param("category", "tech");
            then.status(200).json_body(json!({
                "posts": [post_json("p1", "One"), post_json("p2", "Two")],
                "pages": 3
            }));
        });

        let app = app(&server);
        app.ctx.posts().set_error(Some("old".into()));
        let listing = app
            .ctx
            .post_service()
            .list(&PostQuery {
                category: Some("tech".into()),
                ..PostQuery::default()
            })
            .await?;

        mock.assert();
        assert_eq!(listing.posts.len(), 2);
        assert_eq!(listing.pagination.total_pages, 3);
        assert_eq!(listing.pagination.total, 2);
        assert!(listing.has_more);
        assert!(app.ctx.posts().error().is_none());
        assert!(!app.ctx.posts().is_loading());
        Ok(())
    }

    #[tokio::test]
    async fn load_more_appends_until_last_page() -> Result<(), AppError> {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method("GET")
                .path("/api/posts")
                .query_param("page", "1")
                .query_param("q", "rust");
            then.status(200).json_body(json!({
                "posts": [post_json("p1", "One"), post_json("p2", "Two")],
                "pages": 2,
                "total": 3
            }));
        });
        let second = server.mock(|when, then| {
            when.method("GET")
                .path("/api/posts")
                .query_param("page", "2")
                .query_param("q", "rust");
            then.status(200).json_body(json!({
                "posts": [post_json("p3", "Three")],
                "pages": 2,
                "currentPage": 2
            }));
        });

        let app = app(&server);
        let service = app.ctx.post_service();
        let query = PostQuery {
            search: Some("rust".into()),
            ..PostQuery::default()
        };
        service.list(&query).await?;

        let listing = service.load_more(&query).await?;
        let ids: Vec<_> = listing.posts.iter().map(|post| post.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);
        assert_eq!(listing.pagination.current_page, 2);
        assert!(!listing.has_more);

        let again = service.load_more(&query).await?;
        assert_eq!(again.posts.len(), 3);
        first.assert_hits(1);
        second.assert_hits(1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_list_records_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/posts");
            then.status(500);
        });

        let app = app(&server);
        let result = app.ctx.post_service().list(&PostQuery::default()).await;

        assert!(result.is_err());
        assert_eq!(app.ctx.posts().error().as_deref(), Some("Failed to load posts"));
        assert!(!app.ctx.posts().is_loading());
    }

    #[tokio::test]
    async fn get_sets_current_post() -> Result<(), AppError> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/posts/p1");
            then.status(200).json_body(post_json("p1", "One"));
        });

        let app = app(&server);
        let post = app.ctx.post_service().get("p1").await?;
        assert_eq!(app.ctx.posts().current_post(), Some(post));
        Ok(())
    }

    #[tokio::test]
    async fn create_prepends_to_lists() -> Result<(), AppError> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/api/posts")
                .header("authorization", "Bearer tok")
                .json_body(json!({
                    "title": "Fresh",
                    "content": "<p>body</p>",
                    "excerpt": "",
                    "categories": ["tech", "rust"]
                }));
            then.status(201).json_body(post_json("new", "Fresh"));
        });

        let app = logged_in(&server);
        app.ctx
            .posts()
            .set_posts(vec![serde_json::from_value(post_json("p1", "Old")).expect("post")].into());

        let post = app.ctx.post_service().create(draft("Fresh")).await?;
        mock.assert();
        assert_eq!(post.id, "new");
        assert_eq!(app.ctx.posts().posts()[0].id, "new");
        assert_eq!(app.ctx.posts().user_posts()[0].id, "new");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_locally() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST").path("/api/posts");
            then.status(201);
        });

        let app = logged_in(&server);
        let err = app
            .ctx
            .post_service()
            .create(draft(""))
            .await
            .expect_err("title required");
        assert_eq!(err.user_message("Failed to create post"), "Title is required");
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn update_and_delete_touch_every_container() -> Result<(), AppError> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("PUT").path("/api/posts/p1");
            then.status(200).json_body(post_json("p1", "Renamed"));
        });
        server.mock(|when, then| {
            when.method("DELETE").path("/api/posts/p1");
            then.status(200).json_body(json!({"message": "Post deleted"}));
        });

        let app = logged_in(&server);
        let held: Post = serde_json::from_value(post_json("p1", "One")).expect("post");
        app.ctx.posts().set_posts(vec![held.clone()].into());
        app.ctx.posts().set_user_posts(vec![held.clone()].into());
        app.ctx.posts().set_current_post(Some(held));

        let service = app.ctx.post_service();
        service.update("p1", draft("Renamed")).await?;
        assert_eq!(app.ctx.posts().posts()[0].title, "Renamed");
        assert_eq!(app.ctx.posts().user_posts()[0].title, "Renamed");
        assert_eq!(
            app.ctx.posts().current_post().map(|p| p.title),
            Some("Renamed".to_string())
        );

        service.delete("p1").await?;
        assert!(app.ctx.posts().posts().is_empty());
        assert!(app.ctx.posts().user_posts().is_empty());
        assert!(app.ctx.posts().current_post().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn like_requires_session() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST").path("/api/posts/p1/like");
            then.status(200);
        });

        let app = app(&server);
        let err = app.ctx.post_service().like("p1").await.expect_err("anonymous");
        assert_eq!(err.user_message("Failed to like post"), "Please login to like posts");
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn like_updates_held_counts() -> Result<(), AppError> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("POST").path("/api/posts/p1/like");
            then.status(200)
                .json_body(json!({"likesCount": 5, "isLiked": true}));
        });

        let app = logged_in(&server);
        let held: Post = serde_json::from_value(post_json("p1", "One")).expect("post");
        app.ctx.posts().set_current_post(Some(held));

        let response = app.ctx.post_service().like("p1").await?;
        assert!(response.is_liked);
        assert_eq!(app.ctx.posts().current_post().map(|p| p.likes_count), Some(5));
        Ok(())
    }

    #[tokio::test]
    async fn add_comment_validates_and_counts() -> Result<(), AppError> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/api/posts/p1/comments")
                .json_body(json!({"content": "Great read"}));
            then.status(201)
                .json_body(json!({"_id": "c1", "content": "Great read"}));
        });

        let app = logged_in(&server);
        let held: Post = serde_json::from_value(post_json("p1", "One")).expect("post");
        app.ctx.posts().set_posts(vec![held].into());
        let service = app.ctx.post_service();

        let err = service.add_comment("p1", "   ").await.expect_err("blank");
        assert_eq!(err.user_message("Failed to add comment"), "Comment cannot be empty");

        let comment = service.add_comment("p1", " Great read ").await?;
        mock.assert();
        assert_eq!(comment.id, "c1");
        assert_eq!(app.ctx.posts().posts()[0].comments_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn traversing_ids_never_leave_the_post() -> Result<(), AppError> {
        let server = MockServer::start();
        let login = server.mock(|when, then| {
            when.method("POST").path("/api/auth/login");
            then.status(200);
        });
        let list = server.mock(|when, then| {
            when.method("GET").path("/api/posts");
            then.status(200).json_body(json!([]));
        });

        let app = logged_in(&server);
        let service = app.ctx.post_service();
        assert!(service.get("..").await.is_err());
        assert!(service.like("../../auth/login").await.is_err());
        login.assert_hits(0);
        list.assert_hits(0);
        Ok(())
    }

    #[tokio::test]
    async fn mine_and_trending_accept_bare_lists() -> Result<(), AppError> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/posts/user/me");
            then.status(200).json_body(json!({"posts": [post_json("p1", "Mine")]}));
        });
        server.mock(|when, then| {
            when.method("GET")
                .path("/api/posts/trending")
                .query_param("limit", "3");
            then.status(200)
                .json_body(json!([post_json("t1", "Hot"), post_json("t2", "Hotter")]));
        });

        let app = logged_in(&server);
        let service = app.ctx.post_service();
        assert_eq!(service.mine().await?.len(), 1);
        assert_eq!(app.ctx.posts().user_posts()[0].id, "p1");
        assert_eq!(service.trending(3).await?.len(), 2);
        Ok(())
    }
}
