//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use ih_api::{configure_routes, AppState};
use ih_auth_simple::SimpleAuthenticator;
use ih_core::engine::Engine;
use ih_core::models::{Idea, IdeaDraft};
use ih_core::traits::{IdeaRepo, InteractionRepo};
use ih_db_memory::MemoryStore;
use ih_db_sqlite::SqliteStore;
use ih_storage_local::LocalBlobStore;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const UPLOAD_LIMIT: usize = 64 * 1024;

pub fn memory_engine() -> Engine {
    let store = Arc::new(MemoryStore::new());
    let ideas: Arc<dyn IdeaRepo> = store.clone();
    let interactions: Arc<dyn InteractionRepo> = store;
    Engine::new(ideas, interactions)
}

pub async fn sqlite_engine() -> Engine {
    let store = Arc::new(
        SqliteStore::new("sqlite::memory:")
            .await
            .expect("in-memory sqlite"),
    );
    let ideas: Arc<dyn IdeaRepo> = store.clone();
    let interactions: Arc<dyn InteractionRepo> = store;
    Engine::new(ideas, interactions)
}

/// One engine per storage backend, labelled for assertion messages.
pub async fn engines() -> Vec<(&'static str, Engine)> {
    vec![("memory", memory_engine()), ("sqlite", sqlite_engine().await)]
}

pub fn draft(title: &str, author: &str) -> IdeaDraft {
    IdeaDraft {
        title: title.to_string(),
        description: format!("{title} is a startup idea worth a closer look."),
        tags: vec!["startup".to_string()],
        author_id: author.to_string(),
        image_ref: None,
    }
}

/// Submits ideas a few milliseconds apart so their timestamps differ.
pub async fn submit_spaced(engine: &Engine, titles: &[&str], author: &str) -> Vec<Idea> {
    let mut ideas = Vec::with_capacity(titles.len());
    for title in titles {
        ideas.push(engine.submit_idea(draft(title, author)).await.expect("submit"));
        tokio::time::sleep(Duration::from_millis(3)).await;
    }
    ideas
}

pub fn authenticator() -> SimpleAuthenticator {
    SimpleAuthenticator::new(SecretString::from(SECRET))
}

pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", authenticator().issue_token(user_id))
}

pub fn upload_root() -> PathBuf {
    std::env::temp_dir().join(format!("ih-it-{}", uuid::Uuid::new_v4()))
}

/// Full router over the in-memory store.
pub fn app() -> Router {
    app_with_uploads(upload_root())
}

pub fn app_with_uploads(root: PathBuf) -> Router {
    configure_routes(AppState {
        engine: Arc::new(memory_engine()),
        blobs: Arc::new(LocalBlobStore::new(root, "/static/uploads".into()).with_max_bytes(UPLOAD_LIMIT)),
        auth: Arc::new(authenticator()),
        upload_limit: UPLOAD_LIMIT,
    })
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = token {
        builder = builder.header(header::AUTHORIZATION, bearer(user));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(user) = token {
        builder = builder.header(header::AUTHORIZATION, bearer(user));
    }
    builder.body(Body::empty()).expect("request")
}

/// Creates an idea through the API and returns its JSON.
pub async fn create_idea(app: &Router, title: &str, author: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/ideas",
            serde_json::json!({
                "title": title,
                "description": format!("{title} solves a real problem for real people."),
                "tags": ["startup"],
                "author_id": author,
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

pub async fn record(app: &Router, user: &str, idea_id: &str, swipe: bool, rating: Option<i64>) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            "/interactions",
            serde_json::json!({
                "user_id": user,
                "idea_id": idea_id,
                "swipe": swipe,
                "rating": rating,
            }),
            None,
        ),
    )
    .await
}
