//! HTTP wrapper shared by every service.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use reqwest::{Client, Method, StatusCode, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::cache::{CacheKey, ResponseCache};
use crate::config::ApiSettings;
use crate::store::AuthStore;

use super::error::ApiError;
use super::navigator::{Navigator, Route};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const SEGMENT_BASE: &str = "http://inkpost.invalid/";

/// Where and how long to talk to the backend.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ClientOptions {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&ApiSettings> for ClientOptions {
    fn from(settings: &ApiSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout: settings.timeout,
        }
    }
}

enum Payload {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// Sends API requests with the session's bearer token, serves reads from the
/// response cache and applies the global 401 policy.
///
/// Cloning is cheap; clones share the connection pool, cache and stores.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    cache: Arc<ResponseCache>,
    auth: Arc<AuthStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        options: &ClientOptions,
        cache: Arc<ResponseCache>,
        auth: Arc<AuthStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(options.timeout)
            .build()
            .map_err(ApiError::from_transport)?;

        let mut base = options.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            base,
            cache,
            auth,
            navigator,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("inkpost/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(ApiError::Url)
    }

    /// Drop every cached read so the next reads go to the network.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Cached read. A fresh entry for `path` + `query` is returned without
    /// touching the network; a successful response refreshes the entry.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let caching = self.cache.config().enabled;
        let key = CacheKey::for_request(path, query);

        if caching {
            if let Some(payload) = self.cache.get(&key) {
                return decode(payload);
            }
        }

        let payload = self.execute(Method::GET, path, query, Payload::Empty).await?;
        if caching {
            self.cache.put(key, payload.clone());
        }
        decode(payload)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = self
            .execute(Method::POST, path, &[], Payload::Json(to_value(body)?))
            .await?;
        decode(payload)
    }

    /// `POST` without a request body, e.g. toggling a like.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let payload = self.execute(Method::POST, path, &[], Payload::Empty).await?;
        decode(payload)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = self
            .execute(Method::PUT, path, &[], Payload::Json(to_value(body)?))
            .await?;
        decode(payload)
    }

    /// `DELETE`; any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, &[], Payload::Empty)
            .await
            .map(|_| ())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let payload = self
            .execute(Method::POST, path, &[], Payload::Multipart(form))
            .await?;
        decode(payload)
    }

    #[instrument(skip_all, fields(method = %method, path = %path))]
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Payload,
    ) -> Result<Value, ApiError> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(name, value)| (*name, value.as_str())));
        }

        let mut request = self.http.request(method, url);
        if let Some(token) = self.auth.token() {
            request = request.bearer_auth(token);
        }
        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Multipart(form) => request.multipart(form),
        };

        counter!("inkpost_api_request_total").increment(1);
        let response = request.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            let body = response.bytes().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        let bytes = response.bytes().await.map_err(ApiError::from_transport)?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "response received");
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &bytes));
        }
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| ApiError::decode(format!("response is not JSON: {err}")))
    }

    /// Global reaction to a 401, whichever caller triggered it.
    fn expire_session(&self) {
        counter!("inkpost_api_auth_expired_total").increment(1);
        warn!(
            authenticated = self.auth.is_authenticated(),
            "server rejected credentials; clearing session"
        );
        self.auth.expire();
        self.navigator.redirect(Route::Login);
    }
}

/// Absolute API path built from raw segments.
///
/// Each segment is percent-encoded on its own, so `/`, `?` and `#` inside an
/// id stay part of that id. Empty, `.` and `..` segments are rejected.
pub fn api_path(segments: &[&str]) -> Result<String, ApiError> {
    if let Some(bad) = segments
        .iter()
        .find(|segment| matches!(**segment, "" | "." | ".."))
    {
        return Err(ApiError::validation(format!("invalid path segment {bad:?}")));
    }
    let mut url = Url::parse(SEGMENT_BASE)?;
    url.path_segments_mut()
        .map_err(|()| ApiError::validation("path base cannot hold segments"))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

fn to_value<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|err| ApiError::validation(format!("failed to encode request: {err}")))
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload)
        .map_err(|err| ApiError::decode(format!("unexpected response shape: {err}")))
}
