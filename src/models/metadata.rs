use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Item, TmdbMovieDetails};

/// Enrichment data for a catalog item
///
/// Any field may be absent: the gateway substitutes an empty record when the
/// provider cannot be reached, so consumers must treat every field as optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    /// Category (genre) names, in provider order, without duplicates
    pub categories: Vec<String>,
    /// Average rating in [0, 10]
    pub score: Option<f32>,
    /// Free-text synopsis; empty when unknown
    pub summary: String,
    pub release_year: Option<i32>,
    pub artwork_url: Option<String>,
}

impl MetadataRecord {
    /// The fail-soft record: every optional field absent
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Exact, case-sensitive category membership
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Builds a record from a TMDB details response
    pub fn from_tmdb(details: TmdbMovieDetails, artwork_base_url: &str) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for genre in details.genres.unwrap_or_default() {
            if !categories.contains(&genre.name) {
                categories.push(genre.name);
            }
        }

        let score = details
            .vote_average
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 10.0));

        let release_year = details.release_date.as_deref().and_then(parse_release_year);

        let artwork_url = details
            .poster_path
            .filter(|p| !p.trim().is_empty())
            .map(|p| {
                format!(
                    "{}/{}",
                    artwork_base_url.trim_end_matches('/'),
                    p.trim_start_matches('/')
                )
            });

        Self {
            categories,
            score,
            summary: details.overview.unwrap_or_default(),
            release_year,
            artwork_url,
        }
    }
}

/// Extracts the year from a `YYYY-MM-DD` date
fn parse_release_year(date: &str) -> Option<i32> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

/// One ranked, enriched result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub item: Item,
    /// Similarity score read from the query's similarity row
    pub score: f32,
    pub metadata: MetadataRecord,
}
