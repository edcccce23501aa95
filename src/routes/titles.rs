use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    models::ItemId,
    routes::{recommendations::artwork_or_placeholder, AppState},
    services::titles,
};

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    /// Comma-separated titles; the configured list is used when absent
    names: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PopularTitleResponse {
    pub id: ItemId,
    pub title: String,
    pub artwork_url: String,
}

/// Handler listing every selectable title
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(titles::list_all_titles(&state.engine))
}

/// Handler for the titles shown before any query has been made
pub async fn popular(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PopularQuery>,
) -> Json<Vec<PopularTitleResponse>> {
    let names: Vec<String> = match params.names {
        Some(names) => names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect(),
        None => state.popular_titles.clone(),
    };

    let popular = titles::find_popular(&state.engine, &names)
        .await
        .into_iter()
        .map(|p| PopularTitleResponse {
            artwork_url: artwork_or_placeholder(&p.metadata),
            id: p.item.id,
            title: p.item.title,
        })
        .collect();

    Json(popular)
}
