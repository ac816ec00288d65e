//! # ih-api
//!
//! The web routing and orchestration layer for Idea Hub.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use ih_core::engine::Engine;
use ih_core::traits::{Authenticator, BlobStore};

// Room for the multipart framing around the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub blobs: Arc<dyn BlobStore>,
    pub auth: Arc<dyn Authenticator>,
    /// Largest accepted image upload, in bytes
    pub upload_limit: usize,
}

/// Builds the API router.
///
/// The binary can `nest` the result under a prefix (e.g. `/api/v1`) and
/// add its own static file service beside it.
pub fn configure_routes(state: AppState) -> Router {
    let upload_limit = state.upload_limit + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ideas", get(handlers::list_ideas).post(handlers::create_idea))
        .route("/ideas/{id}", get(handlers::get_idea))
        .route("/users/{user_id}/ideas", get(handlers::author_ideas))
        .route(
            "/interactions",
            get(handlers::get_interactions).post(handlers::record_interaction),
        )
        .route(
            "/images",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(middleware::cors_policy())
        .layer(middleware::trace_layer())
        .with_state(state)
}
