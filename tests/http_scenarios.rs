//! End-to-end HTTP scenarios for the credential and rotation endpoints.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`, backed
//! by real store implementations.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

use workshop_secrets::config::{AppConfig, SecretString};
use workshop_secrets::store::{
    FileTokenStore, MemoryTokenStore, SecretStore, SharedSecretStore, StoreError, StoreResult,
};
use workshop_secrets::web::{create_router, AppState};

const ADMIN_SECRET: &str = "instructor-secret";
const TOKEN_DELAY: Duration = Duration::from_millis(100);
const ADMIN_DELAY: Duration = Duration::from_millis(150);

fn configured() -> AppConfig {
    let mut config = AppConfig::default();
    config.admin.secret = SecretString::new(ADMIN_SECRET);
    config.credentials.endpoint = "https://workshop.openai.azure.com/".to_string();
    config.credentials.api_key = SecretString::new("azure-key-123");
    config.auth.token_failure_delay_ms = TOKEN_DELAY.as_millis() as u64;
    config.auth.admin_failure_delay_ms = ADMIN_DELAY.as_millis() as u64;
    config
}

fn app(store: SharedSecretStore, config: &AppConfig) -> Router {
    create_router(AppState::new(store, config))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn rotate(app: &Router, admin_secret: &str, new_token: &str) -> (StatusCode, Value) {
    post(
        app,
        "/rotate-token",
        json!({"admin_secret": admin_secret, "new_token": new_token}),
    )
    .await
}

async fn current_token(app: &Router) -> String {
    let (status, body) = post(app, "/get-token", json!({"admin_secret": ADMIN_SECRET})).await;
    assert_eq!(status, StatusCode::OK, "unexpected get-token body {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Backend that is always unreachable.
struct UnreachableStore;

#[async_trait]
impl SecretStore for UnreachableStore {
    async fn get(&self) -> StoreResult<Option<String>> {
        Err(StoreError::Corrupt)
    }

    async fn set(&self, _value: &str) -> StoreResult<()> {
        Err(StoreError::Corrupt)
    }

    fn backend(&self) -> &'static str {
        "unreachable"
    }
}

#[tokio::test]
async fn scenario_empty_store_is_unconfigured() {
    let app = app(Arc::new(MemoryTokenStore::new()), &configured());
    let (status, body) = post(&app, "/get-credentials", json!({"workshop_token": "x"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("configuration"));
}

#[tokio::test]
async fn get_token_on_empty_store_is_unconfigured() {
    let app = app(Arc::new(MemoryTokenStore::new()), &configured());
    let (status, body) = post(&app, "/get-token", json!({"admin_secret": ADMIN_SECRET})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500);
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn scenario_rotate_then_fetch_credentials() {
    let app = app(Arc::new(MemoryTokenStore::new()), &configured());

    let (status, body) = rotate(&app, ADMIN_SECRET, "demo1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body.to_string().contains("demo1"));

    let (status, body) =
        post(&app, "/get-credentials", json!({"workshop_token": "demo1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "endpoint": "https://workshop.openai.azure.com/",
            "api_key": "azure-key-123",
            "chat_deployment": "gpt-4o-mini",
            "embedding_deployment": "text-embedding-ada-002",
            "api_version": "2024-08-01-preview",
        })
    );
}

#[tokio::test]
async fn scenario_wrong_token_is_rejected_after_delay() {
    let app = app(Arc::new(MemoryTokenStore::with_token("demo1")), &configured());

    let start = Instant::now();
    let (status, body) =
        post(&app, "/get-credentials", json!({"workshop_token": "wrong"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(start.elapsed() >= TOKEN_DELAY);

    // Empty token: same status, same message, same delay
    let start = Instant::now();
    let (empty_status, empty_body) =
        post(&app, "/get-credentials", json!({"workshop_token": ""})).await;
    assert_eq!(empty_status, StatusCode::UNAUTHORIZED);
    assert_eq!(empty_body["error"], body["error"]);
    assert!(start.elapsed() >= TOKEN_DELAY);
}

#[tokio::test]
async fn scenario_wrong_admin_secret_leaves_token_unchanged() {
    let app = app(Arc::new(MemoryTokenStore::with_token("demo1")), &configured());

    let start = Instant::now();
    let (status, _) = rotate(&app, "bad", "newtok").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(start.elapsed() >= ADMIN_DELAY);

    assert_eq!(current_token(&app).await, "demo1");

    let (status, _) = post(&app, "/get-token", json!({"admin_secret": "bad"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn scenario_short_new_token_is_rejected() {
    let app = app(Arc::new(MemoryTokenStore::with_token("demo1")), &configured());

    let (status, body) = rotate(&app, ADMIN_SECRET, "ab").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at least 4"));
    assert_eq!(current_token(&app).await, "demo1");

    // Length boundary: 3 refused, 4 accepted
    let (status, _) = rotate(&app, ADMIN_SECRET, "abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = rotate(&app, ADMIN_SECRET, "abcd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current_token(&app).await, "abcd");
}

#[tokio::test]
async fn scenario_health_is_always_ok() {
    let broken = app(Arc::new(UnreachableStore), &AppConfig::default());
    let healthy = app(Arc::new(MemoryTokenStore::new()), &configured());
    for router in [broken, healthy] {
        for uri in ["/health", "/api/health"] {
            let (status, body) = send(
                &router,
                Request::builder().uri(uri).body(Body::empty()).unwrap(),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "healthy");
        }
    }
}

#[tokio::test]
async fn malformed_bodies_are_400_without_delay() {
    let app = app(Arc::new(MemoryTokenStore::with_token("demo1")), &configured());

    let start = Instant::now();
    let (status, body) = post(&app, "/get-credentials", json!({"token": "demo1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("workshop_token"));

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/rotate-token")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/get-token")
            .body(Body::from(r#"{"admin_secret":"x"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(start.elapsed() < TOKEN_DELAY);
}

#[tokio::test]
async fn unconfigured_admin_secret_is_500_not_401() {
    let mut config = configured();
    config.admin.secret = SecretString::default();
    let app = app(Arc::new(MemoryTokenStore::with_token("demo1")), &config);

    let (status, _) = rotate(&app, "", "newtok").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = post(&app, "/get-token", json!({"admin_secret": "guess"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unconfigured_bundle_is_500() {
    let mut config = configured();
    config.credentials.api_key = SecretString::default();
    let app = app(Arc::new(MemoryTokenStore::with_token("demo1")), &config);

    let (status, body) =
        post(&app, "/get-credentials", json!({"workshop_token": "demo1"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("azure-key"));
}

#[tokio::test]
async fn storage_failures_are_500_without_internal_detail() {
    let app = app(Arc::new(UnreachableStore), &configured());

    let (status, body) =
        post(&app, "/get-credentials", json!({"workshop_token": "demo1"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().contains("UTF-8"));

    let (status, _) = rotate(&app, ADMIN_SECRET, "demo1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = post(&app, "/get-token", json!({"admin_secret": ADMIN_SECRET})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn api_prefix_serves_same_routes() {
    let app = app(Arc::new(MemoryTokenStore::new()), &configured());
    let (status, _) = post(
        &app,
        "/api/rotate-token",
        json!({"admin_secret": ADMIN_SECRET, "new_token": "demo1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        post(&app, "/api/get-credentials", json!({"workshop_token": "demo1"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rotation_persists_across_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = configured();

    let first = app(
        Arc::new(FileTokenStore::new(dir.path().join("data"), "workshop-token").unwrap()),
        &config,
    );
    let (status, _) = rotate(&first, ADMIN_SECRET, "persisted").await;
    assert_eq!(status, StatusCode::OK);
    drop(first);

    let second = app(
        Arc::new(FileTokenStore::new(dir.path().join("data"), "workshop-token").unwrap()),
        &config,
    );
    let (status, _) =
        post(&second, "/get-credentials", json!({"workshop_token": "persisted"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn concurrent_validations_agree() {
    let app = app(Arc::new(MemoryTokenStore::with_token("demo1")), &configured());

    let results = futures::future::join_all((0..32).map(|_| {
        let app = app.clone();
        async move { post(&app, "/get-credentials", json!({"workshop_token": "demo1"})).await }
    }))
    .await;
    assert!(results.iter().all(|(status, _)| *status == StatusCode::OK));

    // Failure delays run concurrently instead of queueing behind each other
    let start = Instant::now();
    let results = futures::future::join_all((0..16).map(|_| {
        let app = app.clone();
        async move { post(&app, "/get-credentials", json!({"workshop_token": "nope"})).await }
    }))
    .await;
    assert!(results
        .iter()
        .all(|(status, _)| *status == StatusCode::UNAUTHORIZED));
    assert!(start.elapsed() < TOKEN_DELAY * 8);
}

#[tokio::test]
async fn validation_during_rotation_sees_old_or_new_token() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path(), "workshop-token").unwrap());
    store.set("old-token").await.unwrap();
    let app = app(store, &configured());

    let rotator = {
        let app = app.clone();
        tokio::spawn(async move {
            for i in 0..10 {
                let token = if i % 2 == 0 { "new-token" } else { "old-token" };
                let (status, _) = rotate(&app, ADMIN_SECRET, token).await;
                assert_eq!(status, StatusCode::OK);
            }
        })
    };

    let validators: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                for _ in 0..5 {
                    let (old, _) =
                        post(&app, "/get-credentials", json!({"workshop_token": "old-token"})).await;
                    let (new, _) =
                        post(&app, "/get-credentials", json!({"workshop_token": "new-token"})).await;
                    for status in [old, new] {
                        assert!(
                            status == StatusCode::OK || status == StatusCode::UNAUTHORIZED,
                            "unexpected status {status}"
                        );
                    }
                }
            })
        })
        .collect();

    rotator.await.unwrap();
    for v in validators {
        v.await.unwrap();
    }

    let final_token = current_token(&app).await;
    assert!(final_token == "old-token" || final_token == "new-token");
}
