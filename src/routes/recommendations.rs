use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{ItemId, MetadataRecord, Recommendation},
    routes::AppState,
};

pub const DEFAULT_COUNT: usize = 5;
pub const PLACEHOLDER_ARTWORK_URL: &str = "https://via.placeholder.com/500x750?text=No+Image";
const DETAILS_BASE_URL: &str = "https://www.themoviedb.org/movie";

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    pub count: Option<usize>,
    /// Category filter; empty or "None" disables it
    pub genre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub query: String,
    pub genre: Option<String>,
    pub results: Vec<RecommendedTitle>,
}

/// One result as the presentation layer consumes it
#[derive(Debug, Serialize)]
pub struct RecommendedTitle {
    pub id: ItemId,
    pub title: String,
    pub similarity: f32,
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub overview: String,
    pub release_year: Option<i32>,
    pub artwork_url: String,
    pub details_url: String,
}

impl From<Recommendation> for RecommendedTitle {
    fn from(rec: Recommendation) -> Self {
        Self {
            artwork_url: artwork_or_placeholder(&rec.metadata),
            details_url: format!("{}/{}", DETAILS_BASE_URL, rec.item.id),
            id: rec.item.id,
            title: rec.item.title,
            similarity: rec.score,
            genres: rec.metadata.categories,
            rating: rec.metadata.score,
            overview: rec.metadata.summary,
            release_year: rec.metadata.release_year,
        }
    }
}

/// Artwork URL, falling back to a placeholder image
pub fn artwork_or_placeholder(metadata: &MetadataRecord) -> String {
    metadata
        .artwork_url
        .clone()
        .unwrap_or_else(|| PLACEHOLDER_ARTWORK_URL.to_string())
}

fn normalize_genre(genre: Option<String>) -> Option<String> {
    genre
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case("none"))
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let count = params.count.unwrap_or(DEFAULT_COUNT);
    if count < state.min_count || count > state.max_count {
        return Err(AppError::InvalidInput(format!(
            "count must be between {} and {}",
            state.min_count, state.max_count
        )));
    }

    let genre = normalize_genre(params.genre);

    tracing::info!(
        request_id = %request_id,
        title = %params.title,
        count,
        genre = ?genre,
        "Processing recommendation request"
    );

    let recommendations = state
        .engine
        .recommend(&params.title, count, genre.as_deref())
        .await?;

    Ok(Json(RecommendationResponse {
        query: params.title,
        genre,
        results: recommendations
            .into_iter()
            .map(RecommendedTitle::from)
            .collect(),
    }))
}
