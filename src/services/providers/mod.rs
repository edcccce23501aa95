/// Metadata provider abstraction
///
/// A provider turns an item id into enrichment data by calling some external
/// source. Providers report failures honestly; the fail-soft policy lives one
/// layer up in `MetadataGateway`.
use crate::{
    error::MetadataError,
    models::{ItemId, MetadataRecord},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for external metadata sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch enrichment data for one item
    async fn fetch_details(&self, id: &ItemId) -> Result<MetadataRecord, MetadataError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
