use serde::{Deserialize, Serialize};

pub mod item;
pub mod metadata;

pub use item::{Item, ItemId};
pub use metadata::{MetadataRecord, Recommendation};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw response from GET /3/movie/{id}
///
/// Every field is optional on our side: the provider omits or nulls fields for
/// sparse entries and a partial record is still useful.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub genres: Option<Vec<TmdbGenre>>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbGenre {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
}
