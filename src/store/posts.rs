//! Normalized post state shared by every view of the application.
//!
//! Three containers can hold the same post: the browsing list (`posts`), the
//! current user's list (`user_posts`) and the post being viewed
//! (`current_post`). Edits and deletes go through one write lock and touch all
//! three, so no reader ever sees a post updated in one container but not in
//! another.

use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

use inkpost_api_types::{Post, PostsPayload};
use serde::Serialize;
use tracing::debug;

use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "store::posts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total: 0,
        }
    }
}

impl Pagination {
    /// Pagination reported by a list payload. Missing and zero fields fall
    /// back to `fallback_page`, a single page, and `fallback_total` posts.
    fn from_payload(payload: &PostsPayload, fallback_page: u32, fallback_total: u64) -> Self {
        match payload {
            PostsPayload::List(_) => Self {
                current_page: fallback_page,
                total_pages: fallback_page,
                total: fallback_total,
            },
            PostsPayload::Page(page) => Self {
                current_page: page.current_page.filter(|page| *page > 0).unwrap_or(fallback_page),
                total_pages: page.pages.filter(|pages| *pages > 0).unwrap_or(1),
                total: page.total.filter(|total| *total > 0).unwrap_or(fallback_total),
            },
        }
    }

    /// Whether a page after the current one exists.
    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}

fn payload_len(payload: &PostsPayload) -> usize {
    match payload {
        PostsPayload::List(posts) => posts.len(),
        PostsPayload::Page(page) => page.posts.as_ref().map_or(0, Vec::len),
    }
}

/// Order of the filtered view. Undated posts sort after dated ones in both
/// date orders; ties keep server order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    Popular,
    Views,
}

impl PostSort {
    fn apply(self, posts: &mut [Post]) {
        match self {
            Self::Newest => posts.sort_by(|a, b| by_date(a, b, true)),
            Self::Oldest => posts.sort_by(|a, b| by_date(a, b, false)),
            Self::Popular => posts.sort_by(|a, b| b.likes_count.cmp(&a.likes_count)),
            Self::Views => posts.sort_by(|a, b| b.views.cmp(&a.views)),
        }
    }
}

fn by_date(a: &Post, b: &Post, newest_first: bool) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(a), Some(b)) if newest_first => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Client-side narrowing and ordering of `posts`. Empty strings disable a
/// filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostFilters {
    pub search: String,
    pub category: String,
    pub sort: PostSort,
}

/// Partial filter update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<PostSort>,
}

impl FilterPatch {
    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn sort(sort: PostSort) -> Self {
        Self {
            sort: Some(sort),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCollectionState {
    pub posts: Vec<Post>,
    pub current_post: Option<Post>,
    pub user_posts: Vec<Post>,
    pub pagination: Pagination,
    pub filters: PostFilters,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    state: PostCollectionState,
    filtered: Option<Arc<Vec<Post>>>,
}

impl Inner {
    fn invalidate(&mut self) {
        self.filtered = None;
    }
}

#[derive(Debug, Default)]
pub struct PostStore {
    inner: RwLock<Inner>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the browsing list and its pagination; ends any loading state.
    pub fn set_posts(&self, payload: PostsPayload) {
        let returned = payload_len(&payload) as u64;
        let pagination = Pagination::from_payload(&payload, 1, returned);
        let mut inner = rw_write(&self.inner, SOURCE, "set_posts");
        inner.state.posts = payload.into_posts();
        inner.state.pagination = pagination;
        inner.state.is_loading = false;
        inner.invalidate();
        debug!(
            posts = inner.state.posts.len(),
            total_pages = pagination.total_pages,
            "posts replaced"
        );
    }

    /// Append `page` of the browsing list after the posts already held and
    /// adopt its pagination; ends any loading state.
    pub fn append_posts(&self, payload: PostsPayload, page: u32) {
        let mut inner = rw_write(&self.inner, SOURCE, "append_posts");
        let held = (inner.state.posts.len() + payload_len(&payload)) as u64;
        let pagination = Pagination::from_payload(&payload, page, held);
        inner.state.posts.extend(payload.into_posts());
        inner.state.pagination = pagination;
        inner.state.is_loading = false;
        inner.invalidate();
        debug!(
            posts = inner.state.posts.len(),
            page = pagination.current_page,
            total_pages = pagination.total_pages,
            "posts appended"
        );
    }

    pub fn set_user_posts(&self, payload: PostsPayload) {
        rw_write(&self.inner, SOURCE, "set_user_posts").state.user_posts = payload.into_posts();
    }

    /// Prepend a freshly created post to the browsing and user lists.
    pub fn add_post(&self, post: Post) {
        let mut inner = rw_write(&self.inner, SOURCE, "add_post");
        inner.state.user_posts.insert(0, post.clone());
        inner.state.posts.insert(0, post);
        inner.invalidate();
    }

    /// Replace every held copy of `post` (matched by id). Containers that do
    /// not hold it are left alone.
    pub fn update_post(&self, post: Post) {
        let mut inner = rw_write(&self.inner, SOURCE, "update_post");
        let state = &mut inner.state;
        for list in [&mut state.posts, &mut state.user_posts] {
            if let Some(slot) = list.iter_mut().find(|held| held.id == post.id) {
                *slot = post.clone();
            }
        }
        if let Some(current) = state.current_post.as_mut().filter(|held| held.id == post.id) {
            *current = post;
        }
        inner.invalidate();
    }

    /// Apply `edit` to every held copy of the post with `id`. Returns whether
    /// any container held it.
    pub fn patch_post(&self, id: &str, mut edit: impl FnMut(&mut Post)) -> bool {
        let mut inner = rw_write(&self.inner, SOURCE, "patch_post");
        let state = &mut inner.state;
        let mut found = false;
        for post in state
            .posts
            .iter_mut()
            .chain(state.user_posts.iter_mut())
            .chain(state.current_post.iter_mut())
            .filter(|post| post.id == id)
        {
            edit(post);
            found = true;
        }
        if found {
            inner.invalidate();
        }
        found
    }

    /// Drop the post with `id` from every container.
    pub fn remove_post(&self, id: &str) {
        let mut inner = rw_write(&self.inner, SOURCE, "remove_post");
        let state = &mut inner.state;
        state.posts.retain(|post| post.id != id);
        state.user_posts.retain(|post| post.id != id);
        if state.current_post.as_ref().is_some_and(|post| post.id == id) {
            state.current_post = None;
        }
        inner.invalidate();
    }

    pub fn set_current_post(&self, post: Option<Post>) {
        rw_write(&self.inner, SOURCE, "set_current_post").state.current_post = post;
    }

    pub fn set_filters(&self, patch: FilterPatch) {
        let mut inner = rw_write(&self.inner, SOURCE, "set_filters");
        if let Some(search) = patch.search {
            inner.state.filters.search = search;
        }
        if let Some(category) = patch.category {
            inner.state.filters.category = category;
        }
        if let Some(sort) = patch.sort {
            inner.state.filters.sort = sort;
        }
        inner.invalidate();
    }

    /// Empty the browsing list and reset pagination.
    pub fn clear_posts(&self) {
        let mut inner = rw_write(&self.inner, SOURCE, "clear_posts");
        inner.state.posts.clear();
        inner.state.pagination = Pagination::default();
        inner.invalidate();
    }

    pub fn set_loading(&self, loading: bool) {
        rw_write(&self.inner, SOURCE, "set_loading").state.is_loading = loading;
    }

    /// Record a failure message; ends any loading state.
    pub fn set_error(&self, error: Option<String>) {
        let mut inner = rw_write(&self.inner, SOURCE, "set_error");
        inner.state.error = error;
        inner.state.is_loading = false;
    }

    /// `posts` narrowed and ordered by the current filters.
    ///
    /// The result is computed once per change to `posts` or `filters`; calls
    /// in between share the same allocation.
    pub fn filtered_posts(&self) -> Arc<Vec<Post>> {
        if let Some(cached) = rw_read(&self.inner, SOURCE, "filtered_posts").filtered.clone() {
            return cached;
        }

        let mut inner = rw_write(&self.inner, SOURCE, "filtered_posts");
        if let Some(cached) = inner.filtered.clone() {
            return cached;
        }
        let filtered = Arc::new(filter_posts(&inner.state.posts, &inner.state.filters));
        inner.filtered = Some(Arc::clone(&filtered));
        filtered
    }

    pub fn posts(&self) -> Vec<Post> {
        rw_read(&self.inner, SOURCE, "posts").state.posts.clone()
    }

    pub fn user_posts(&self) -> Vec<Post> {
        rw_read(&self.inner, SOURCE, "user_posts").state.user_posts.clone()
    }

    pub fn current_post(&self) -> Option<Post> {
        rw_read(&self.inner, SOURCE, "current_post").state.current_post.clone()
    }

    pub fn pagination(&self) -> Pagination {
        rw_read(&self.inner, SOURCE, "pagination").state.pagination
    }

    pub fn filters(&self) -> PostFilters {
        rw_read(&self.inner, SOURCE, "filters").state.filters.clone()
    }

    pub fn is_loading(&self) -> bool {
        rw_read(&self.inner, SOURCE, "is_loading").state.is_loading
    }

    pub fn error(&self) -> Option<String> {
        rw_read(&self.inner, SOURCE, "error").state.error.clone()
    }

    pub fn snapshot(&self) -> PostCollectionState {
        rw_read(&self.inner, SOURCE, "snapshot").state.clone()
    }
}

/// Posts matching both filters, in `filters.sort` order.
pub fn filter_posts(posts: &[Post], filters: &PostFilters) -> Vec<Post> {
    let search = filters.search.to_lowercase();
    let mut matched: Vec<Post> = posts
        .iter()
        .filter(|post| matches_filters(post, &search, &filters.category))
        .cloned()
        .collect();
    filters.sort.apply(&mut matched);
    matched
}

/// `search` must already be lowercased.
fn matches_filters(post: &Post, search: &str, category: &str) -> bool {
    let search_ok = search.is_empty()
        || post.title.to_lowercase().contains(search)
        || post
            .excerpt
            .as_deref()
            .is_some_and(|excerpt| excerpt.to_lowercase().contains(search));
    let category_ok = category.is_empty() || post.categories.iter().any(|c| c == category);
    search_ok && category_ok
}
