//! Request and response shapes exchanged with the inkpost blogging API.
//!
//! Field names follow the backend's JSON (`_id`, camelCase). Optional and
//! count fields default when the server omits them or sends `null`, because
//! list endpoints return trimmed post summaries.

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// Authenticated account as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Author embedded in posts and comments: the profile, or only its id when
/// the server left the reference unpopulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Profile(User),
    Id(String),
}

impl Author {
    pub fn id(&self) -> &str {
        match self {
            Self::Profile(user) => &user.id,
            Self::Id(id) => id,
        }
    }

    pub fn profile(&self) -> Option<&User> {
        match self {
            Self::Profile(user) => Some(user),
            Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

/// Paginated list response. Every field is optional; the server omits
/// pagination metadata on some endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
}

/// Post list payload: either a paginated envelope or a bare array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostsPayload {
    List(Vec<Post>),
    Page(PostPage),
}

impl PostsPayload {
    /// Posts carried by the payload, empty when the envelope has none.
    pub fn into_posts(self) -> Vec<Post> {
        match self {
            Self::List(posts) => posts,
            Self::Page(page) => page.posts.unwrap_or_default(),
        }
    }
}

impl From<Vec<Post>> for PostsPayload {
    fn from(posts: Vec<Post>) -> Self {
        Self::List(posts)
    }
}

impl From<PostPage> for PostsPayload {
    fn from(page: PostPage) -> Self {
        Self::Page(page)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// Body for post create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentInput {
    pub content: String,
}

/// Aggregate counters from `/api/posts/analytics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    #[serde(default)]
    pub total_views: Option<u64>,
    #[serde(default)]
    pub total_likes: Option<u64>,
    #[serde(default)]
    pub total_comments: Option<u64>,
}

/// Site-wide counters from `/api/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_posts: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_users: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

/// Response of `/api/search`. The backend nests post hits under
/// `posts.data`; a bare list is accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<SearchHits>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchHits {
    Wrapped {
        #[serde(default)]
        data: Vec<Post>,
    },
    List(Vec<Post>),
}

impl SearchResults {
    pub fn into_posts(self) -> Vec<Post> {
        match self.posts {
            Some(SearchHits::Wrapped { data }) | Some(SearchHits::List(data)) => data,
            None => Vec::new(),
        }
    }
}

/// `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
