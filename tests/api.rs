use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header::RETRY_AFTER},
};
use planets::{
    AppState,
    cache::{CacheError, CacheStore, MemoryCache, PlanetCache, WindowCount},
    database::MemoryPlanetStore,
    middleware::RateLimiter,
    router::create_router,
    service::PlanetService,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const LIMIT: u32 = 20;
const WINDOW: Duration = Duration::from_secs(60);

/// 所有操作都失败的缓存，模拟 Redis 不可用
struct UnreachableCache;

fn unreachable() -> CacheError {
    CacheError::Backend(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "connection refused",
    )))
}

#[async_trait]
impl CacheStore for UnreachableCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(unreachable())
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(unreachable())
    }

    async fn del(&self, _key: &str) -> Result<(), CacheError> {
        Err(unreachable())
    }

    async fn incr_window(&self, _key: &str, _window: Duration) -> Result<WindowCount, CacheError> {
        Err(unreachable())
    }
}

fn app_with(store: Arc<MemoryPlanetStore>, cache: Arc<dyn CacheStore>) -> Router {
    let state = AppState {
        planets: PlanetService::new(
            store,
            PlanetCache::new(cache.clone(), Duration::from_secs(300)),
        ),
    };
    let limiter = Arc::new(RateLimiter::new(cache, LIMIT, WINDOW));
    create_router(state, limiter)
}

fn app() -> (Router, Arc<MemoryPlanetStore>) {
    let store = Arc::new(MemoryPlanetStore::new());
    (app_with(store.clone(), Arc::new(MemoryCache::new())), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_from(app, "198.51.100.7", method, uri, body).await
}

async fn send_from(
    app: &Router,
    ip: &str,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-real-ip", ip);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn planet_lifecycle() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::POST, "/", Some(json!({ "name": "Mars" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "planet added succesfully", "inserted_id": 1, "name": "Mars" })
    );

    let (status, body) = send(&app, Method::GET, "/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 1, "name": "Mars" }));

    let (status, body) = send(&app, Method::PUT, "/1", Some(json!({ "name": "Mars2" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Planet updated", "id": "1", "name": "Mars2" })
    );

    let (_, body) = send(&app, Method::GET, "/1", None).await;
    assert_eq!(body, json!({ "id": 1, "name": "Mars2" }));

    let (status, body) = send(&app, Method::DELETE, "/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Planeted deleted" }));

    let (status, _) = send(&app, Method::GET, "/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_reflects_writes_and_is_cached_between_them() {
    let (app, store) = app();
    send(&app, Method::POST, "/", Some(json!({ "name": "Venus" }))).await;
    send(&app, Method::POST, "/", Some(json!({ "name": "Earth" }))).await;

    let (status, first) = send(&app, Method::GET, "/", None).await;
    let (_, second) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(store.read_count(), 1);

    send(&app, Method::DELETE, "/1", None).await;
    let (_, after) = send(&app, Method::GET, "/", None).await;
    assert_eq!(after, json!([{ "id": 2, "name": "Earth" }]));
    assert_eq!(store.read_count(), 2);
}

#[tokio::test]
async fn repeated_delete_is_not_found() {
    let (app, _) = app();
    send(&app, Method::POST, "/", Some(json!({ "name": "Ceres" }))).await;

    let (status, _) = send(&app, Method::DELETE, "/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::DELETE, "/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Planet not found" }));
}

#[tokio::test]
async fn malformed_requests_are_rejected() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::POST, "/", Some(json!({ "title": "Mars" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request body" }));

    let (status, _) = send(&app, Method::POST, "/", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/mars", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "invalid planet id" }));

    let (status, body) = send(&app, Method::PUT, "/1", Some(json!("Mars"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request" }));
}

#[tokio::test]
async fn names_round_trip_unchanged() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::POST, "/", Some(json!({ "name": "  Mars  " }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "  Mars  ");

    let (_, body) = send(&app, Method::GET, "/1", None).await;
    assert_eq!(body, json!({ "id": 1, "name": "  Mars  " }));
}

#[tokio::test]
async fn update_of_missing_planet_is_not_found() {
    let (app, _) = app();
    let (status, _) = send(&app, Method::PUT, "/7", Some(json!({ "name": "Vulcan" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_errors_map_to_operation_status() {
    let (app, store) = app();
    store.set_unavailable(true);

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "error selecting planets" }));

    let (status, _) = send(&app, Method::POST, "/", Some(json!({ "name": "Mars" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::PUT, "/1", Some(json!({ "name": "Mars" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(&app, Method::DELETE, "/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "error deleting planet" }));
}

#[tokio::test(start_paused = true)]
async fn rate_limit_window_resets() {
    let (app, _) = app();

    for _ in 0..LIMIT {
        let (status, _) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let request = Request::builder()
        .uri("/")
        .header("x-real-ip", "198.51.100.7")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[RETRY_AFTER], "60");

    tokio::time::advance(WINDOW).await;
    let (status, _) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn retry_after_reports_time_left_in_window() {
    let (app, _) = app();

    send(&app, Method::GET, "/", None).await;
    tokio::time::advance(Duration::from_secs(45)).await;
    for _ in 1..LIMIT {
        send(&app, Method::GET, "/", None).await;
    }

    let request = Request::builder()
        .uri("/")
        .header("x-real-ip", "198.51.100.7")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[RETRY_AFTER], "15");
}

#[tokio::test]
async fn rejected_requests_never_reach_handlers() {
    let (app, store) = app();
    for _ in 0..LIMIT {
        send(&app, Method::GET, "/1", None).await;
    }

    let (status, body) = send(&app, Method::POST, "/", Some(json!({ "name": "Eris" }))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "too many requests" }));

    // 换一个客户端查询，确认被拒绝的请求没有写入
    let (_, planets) = send_from(&app, "203.0.113.1", Method::GET, "/", None).await;
    assert_eq!(planets, json!([]));
    assert_eq!(store.read_count(), LIMIT as usize + 1);
}

#[tokio::test]
async fn clients_are_limited_independently() {
    let (app, _) = app();
    for _ in 0..=LIMIT {
        send_from(&app, "192.0.2.1", Method::GET, "/", None).await;
    }

    let (status, _) = send_from(&app, "192.0.2.1", Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = send_from(&app, "192.0.2.2", Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unreachable_cache_degrades_to_store() {
    let store = Arc::new(MemoryPlanetStore::new());
    let app = app_with(store.clone(), Arc::new(UnreachableCache));

    // 限流器放行，超过上限也不拒绝
    for _ in 0..LIMIT + 5 {
        let (status, _) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(&app, Method::POST, "/", Some(json!({ "name": "Jupiter" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::PUT, "/1", Some(json!({ "name": "Zeus" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Zeus");

    let (_, body) = send(&app, Method::GET, "/1", None).await;
    assert_eq!(body, json!({ "id": 1, "name": "Zeus" }));

    let (status, _) = send(&app, Method::DELETE, "/1", None).await;
    assert_eq!(status, StatusCode::OK);
}
