use crate::{
    models::{Item, MetadataRecord},
    services::recommendations::RecommendationEngine,
};

/// A popular title with the metadata needed to show it
#[derive(Debug, Clone, PartialEq)]
pub struct PopularTitle {
    pub item: Item,
    pub metadata: MetadataRecord,
}

/// Every catalog title, in catalog order
pub fn list_all_titles(engine: &RecommendationEngine) -> Vec<String> {
    engine
        .catalog()
        .titles()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Catalog items for `names`, enriched for display
///
/// Names that are not in the catalog are dropped. Order follows `names`.
pub async fn find_popular(engine: &RecommendationEngine, names: &[String]) -> Vec<PopularTitle> {
    let items = engine.catalog().find_popular_subset(names);
    let ids: Vec<_> = items.iter().map(|item| item.id.clone()).collect();

    let metadata = engine
        .gateway()
        .fetch_many(&ids, engine.settings().metadata_concurrency)
        .await;

    tracing::debug!(
        requested = names.len(),
        found = items.len(),
        "Popular titles resolved"
    );

    items
        .into_iter()
        .zip(metadata)
        .map(|(item, metadata)| PopularTitle { item, metadata })
        .collect()
}
