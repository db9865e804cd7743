use std::sync::Arc;

use httpmock::MockServer;
use inkpost_api_types::User;
use serde_json::{Value, json};

use crate::cache::CacheConfig;
use crate::client::{ClientOptions, RecordingNavigator};
use crate::config::SearchSettings;
use crate::infra::session::{MemorySessionStorage, SessionStorage};
use crate::store::AuthStore;

use super::AppContext;

pub(crate) struct TestApp {
    pub ctx: AppContext,
    pub navigator: Arc<RecordingNavigator>,
}

pub(crate) fn app(server: &MockServer) -> TestApp {
    app_with_storage(server, Arc::new(MemorySessionStorage::new()))
}

pub(crate) fn app_with_storage(server: &MockServer, storage: Arc<dyn SessionStorage>) -> TestApp {
    let navigator = Arc::new(RecordingNavigator::new());
    let options = ClientOptions::new(&server.base_url()).expect("mock url");
    let auth = AuthStore::new(storage);
    let ctx = AppContext::new(
        &options,
        CacheConfig::default(),
        auth,
        navigator.clone(),
        SearchSettings::default(),
    )
    .expect("context");
    TestApp { ctx, navigator }
}

/// Context with an authenticated session for `tok`.
pub(crate) fn logged_in(server: &MockServer) -> TestApp {
    let app = app(server);
    app.ctx
        .auth()
        .set_credentials(alice(), "tok".into())
        .expect("session");
    app
}

pub(crate) fn alice() -> User {
    User {
        id: "u1".into(),
        name: "Alice".into(),
        email: Some("alice@example.com".into()),
        avatar: None,
    }
}

pub(crate) fn post_json(id: &str, title: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "content": "<p>body</p>",
        "categories": ["tech"],
        "likesCount": 1,
        "commentsCount": 0,
        "views": 10
    })
}
