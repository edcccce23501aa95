use futures::{stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    db::MetadataCache,
    error::MetadataError,
    models::{ItemId, MetadataRecord},
    services::providers::MetadataProvider,
};

const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Fail-soft front door to the metadata provider
///
/// `fetch` always yields a record. Cache hits skip the network; provider
/// failures are logged and replaced with `MetadataRecord::unavailable()`.
/// Failed lookups are never cached, so the next request tries again.
#[derive(Clone)]
pub struct MetadataGateway {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<dyn MetadataCache>,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl MetadataGateway {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        cache: Arc<dyn MetadataCache>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            timeout,
            max_retries: 0,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Allows `max_retries` extra attempts on transient failures, waiting
    /// `backoff * attempt` between them
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    pub async fn fetch(&self, id: &ItemId) -> MetadataRecord {
        if let Some(record) = self.cached(id).await {
            tracing::debug!(item_id = %id, cache = self.cache.name(), "Metadata cache hit");
            return record;
        }

        match self.fetch_from_provider(id).await {
            Ok(record) => {
                self.cache.put(id, &record).await;
                record
            }
            Err(e) => {
                tracing::warn!(
                    item_id = %id,
                    provider = self.provider.name(),
                    error = %e,
                    "Metadata unavailable, continuing without it"
                );
                MetadataRecord::unavailable()
            }
        }
    }

    /// Fetches several records with at most `concurrency` lookups in flight,
    /// returning them in input order
    pub async fn fetch_many(&self, ids: &[ItemId], concurrency: usize) -> Vec<MetadataRecord> {
        let fetches: Vec<_> = ids.iter().map(|id| self.fetch(id)).collect();
        stream::iter(fetches)
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Cache read bounded by the lookup timeout; a stalled cache is a miss
    async fn cached(&self, id: &ItemId) -> Option<MetadataRecord> {
        match tokio::time::timeout(self.timeout, self.cache.get(id)).await {
            Ok(record) => record,
            Err(_) => {
                tracing::warn!(
                    item_id = %id,
                    cache = self.cache.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Metadata cache read timed out, treating as miss"
                );
                None
            }
        }
    }

    async fn fetch_from_provider(&self, id: &ItemId) -> Result<MetadataRecord, MetadataError> {
        let mut attempt = 0u32;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.provider.fetch_details(id))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(MetadataError::Timeout(self.timeout.as_millis() as u64)),
            };

            match result {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        item_id = %id,
                        attempt,
                        error = %e,
                        "Retrying metadata lookup"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                other => return other,
            }
        }
    }
}
