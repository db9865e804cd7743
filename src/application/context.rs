//! Owner of the process-wide client state.

use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheConfig, ResponseCache};
use crate::client::{ApiClient, ClientOptions, Navigator};
use crate::config::{SearchSettings, Settings};
use crate::infra::session::FileSessionStorage;
use crate::store::{AuthStore, PostStore};

use super::error::AppError;
use super::{
    AuthService, DashboardService, FeedService, PostService, SearchService, UploadService,
};

/// The cache, both stores and the client that shares them.
///
/// Built once at startup and handed to services; there are no globals.
pub struct AppContext {
    api: ApiClient,
    auth: Arc<AuthStore>,
    posts: Arc<PostStore>,
    search: SearchSettings,
}

impl AppContext {
    pub fn new(
        options: &ClientOptions,
        cache: CacheConfig,
        auth: AuthStore,
        navigator: Arc<dyn Navigator>,
        search: SearchSettings,
    ) -> Result<Self, AppError> {
        let auth = Arc::new(auth);
        let cache = Arc::new(ResponseCache::new(cache));
        let api = ApiClient::new(options, cache, Arc::clone(&auth), navigator)?;
        Ok(Self {
            api,
            auth,
            posts: Arc::new(PostStore::new()),
            search,
        })
    }

    /// Context for resolved settings, with the session restored from the
    /// configured session file.
    pub fn from_settings(
        settings: &Settings,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AppError> {
        let storage = Arc::new(FileSessionStorage::new(settings.session.path.clone()));
        let auth = AuthStore::restore(storage);
        info!(
            api = %settings.api.base_url,
            authenticated = auth.is_authenticated(),
            "client context ready"
        );
        Self::new(
            &ClientOptions::from(&settings.api),
            CacheConfig::from(&settings.cache),
            auth,
            navigator,
            settings.search.clone(),
        )
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    pub fn posts(&self) -> &Arc<PostStore> {
        &self.posts
    }

    pub fn cache(&self) -> &ResponseCache {
        self.api.cache()
    }

    pub fn search_settings(&self) -> &SearchSettings {
        &self.search
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self)
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(self)
    }

    pub fn search_service(&self) -> SearchService {
        SearchService::new(self)
    }

    pub fn dashboard_service(&self) -> DashboardService {
        DashboardService::new(self)
    }

    pub fn feed_service(&self) -> FeedService {
        FeedService::new(self)
    }

    pub fn upload_service(&self) -> UploadService {
        UploadService::new(self)
    }
}
