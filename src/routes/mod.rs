use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::RecommendationEngine,
};

pub mod genres;
pub mod recommendations;
pub mod titles;

/// Shared state handed to every handler
pub struct AppState {
    pub engine: RecommendationEngine,
    /// Titles shown before any query has been made
    pub popular_titles: Vec<String>,
    /// Accepted range for the requested result count
    pub min_count: usize,
    pub max_count: usize,
}

impl AppState {
    pub fn new(
        engine: RecommendationEngine,
        popular_titles: Vec<String>,
        min_count: usize,
        max_count: usize,
    ) -> Self {
        Self {
            engine,
            popular_titles,
            min_count,
            max_count,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/titles", get(titles::list))
        .route("/titles/popular", get(titles::popular))
        .route("/genres", get(genres::list))
        .route("/recommendations", get(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
