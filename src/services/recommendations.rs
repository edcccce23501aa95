use futures::{future, stream, StreamExt};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    catalog::{Catalog, Dataset, SimilarityTable},
    error::AppResult,
    models::{Item, Recommendation},
    services::metadata::MetadataGateway,
};

pub const DEFAULT_SCAN_WINDOW_SIZE: usize = 19;
pub const DEFAULT_METADATA_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Ranking slots inspected per request. The query's own slot counts, so at
    /// most `scan_window_size - 1` candidates are looked at.
    pub scan_window_size: usize,
    /// Metadata lookups in flight per request
    pub metadata_concurrency: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            scan_window_size: DEFAULT_SCAN_WINDOW_SIZE,
            metadata_concurrency: DEFAULT_METADATA_CONCURRENCY,
        }
    }
}

/// Ranks catalog items by similarity to a query title
///
/// Holds the shared dataset and a metadata gateway; every call is independent
/// and the engine itself is immutable, so one instance serves all requests.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
    similarity: Arc<SimilarityTable>,
    gateway: MetadataGateway,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(dataset: &Dataset, gateway: MetadataGateway, settings: EngineSettings) -> Self {
        Self {
            catalog: dataset.catalog.clone(),
            similarity: dataset.similarity.clone(),
            gateway,
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn gateway(&self) -> &MetadataGateway {
        &self.gateway
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Up to `count` items most similar to `title`, enriched with metadata
    ///
    /// The query item is never returned. Candidates are taken in descending
    /// score order (ties by catalog index) from the scan window only; with a
    /// `category` filter, candidates whose metadata lacks that category are
    /// skipped without counting, and so are candidates whose metadata could not
    /// be fetched. Returning fewer than `count` items is not an error.
    ///
    /// Fails only when `title` is not in the catalog.
    pub async fn recommend(
        &self,
        title: &str,
        count: usize,
        category: Option<&str>,
    ) -> AppResult<Vec<Recommendation>> {
        let start = Instant::now();

        let query_index = self.catalog.find_by_title(title)?;
        let mut window = self.candidate_window(query_index)?;

        // Without a filter every candidate is accepted, so only the first
        // `count` ever need metadata.
        if category.is_none() {
            window.truncate(count);
        }

        if count == 0 || window.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = window
            .into_iter()
            .map(|(index, score)| Ok((self.catalog.get(index)?.clone(), score)))
            .collect::<AppResult<Vec<(Item, f32)>>>()?;
        let inspected = candidates.len();

        let gateway = &self.gateway;
        let recommendations: Vec<Recommendation> =
            stream::iter(candidates.into_iter().map(move |(item, score)| async move {
                let metadata = gateway.fetch(&item.id).await;
                Recommendation {
                    item,
                    score,
                    metadata,
                }
            }))
            .buffered(self.settings.metadata_concurrency.max(1))
            .filter(|rec| {
                future::ready(category.map_or(true, |c| rec.metadata.has_category(c)))
            })
            .take(count)
            .collect()
            .await;

        tracing::info!(
            title = %title,
            count,
            category = ?category,
            inspected,
            returned = recommendations.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recommendations computed"
        );

        Ok(recommendations)
    }

    /// Ranked non-self candidates that fit in the scan window
    fn candidate_window(&self, query_index: usize) -> AppResult<Vec<(usize, f32)>> {
        let mut ranked = self.similarity.ranked_candidates(query_index)?;
        ranked.truncate(self.settings.scan_window_size.saturating_sub(1));
        Ok(ranked)
    }
}
