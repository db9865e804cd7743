use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use inkpost::cache::{CacheConfig, ManualClock, ResponseCache};
use inkpost::client::{ApiClient, ClientOptions, RecordingNavigator};
use inkpost::infra::session::MemorySessionStorage;
use inkpost::store::AuthStore;
use metrics_util::debugging::DebuggingRecorder;
use serde_json::{Value, json};
use time::OffsetDateTime;

#[tokio::test]
async fn client_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/posts");
        then.status(200).json_body(json!({"posts": []}));
    });
    server.mock(|when, then| {
        when.method("GET").path("/api/stats");
        then.status(200).json_body(json!({}));
    });
    server.mock(|when, then| {
        when.method("GET").path("/api/posts/user/me");
        then.status(401);
    });

    let clock = Arc::new(ManualClock::new(OffsetDateTime::now_utc()));
    let cache = Arc::new(ResponseCache::with_clock(
        CacheConfig {
            capacity: 1,
            ..CacheConfig::default()
        },
        clock.clone(),
    ));
    let options = ClientOptions::new(&server.base_url()).expect("mock url");
    let client = ApiClient::new(
        &options,
        cache,
        Arc::new(AuthStore::new(Arc::new(MemorySessionStorage::new()))),
        Arc::new(RecordingNavigator::new()),
    )
    .expect("client");

    // miss, hit, stale, then an eviction when a second key arrives
    let _: Value = client.get("/api/posts", &[]).await.expect("posts");
    let _: Value = client.get("/api/posts", &[]).await.expect("cached posts");
    clock.advance(Duration::from_secs(301));
    let _: Value = client.get("/api/posts", &[]).await.expect("stale posts");
    let _: Value = client.get("/api/stats", &[]).await.expect("stats");
    let _ = client.get::<Value>("/api/posts/user/me", &[]).await;

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "inkpost_cache_hit_total",
        "inkpost_cache_miss_total",
        "inkpost_cache_stale_total",
        "inkpost_cache_evict_total",
        "inkpost_api_request_total",
        "inkpost_api_auth_expired_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
