/// Fixed item catalog and its aligned similarity table
///
/// Both are loaded once at startup and shared read-only behind `Arc`s, so no
/// locking is needed on the request path.
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{Item, ItemId},
};

pub mod loader;
pub mod similarity;

pub use loader::{load_dataset, CatalogRecord, Dataset};
pub use similarity::SimilarityTable;

/// Ordered list of known items with exact-title lookup
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    /// Title → index of its first occurrence in catalog order
    by_title: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from `(id, title)` records, assigning indices in order
    ///
    /// Duplicate titles are kept as separate items; lookups by title resolve to
    /// the first occurrence.
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        let mut items = Vec::with_capacity(records.len());
        let mut by_title = HashMap::with_capacity(records.len());
        let mut duplicates = 0usize;

        for (index, record) in records.into_iter().enumerate() {
            if by_title.contains_key(&record.title) {
                duplicates += 1;
            } else {
                by_title.insert(record.title.clone(), index);
            }
            items.push(Item {
                id: ItemId(record.id),
                title: record.title,
                index,
            });
        }

        if duplicates > 0 {
            tracing::warn!(
                duplicates,
                "Catalog contains duplicate titles; lookups resolve to the first occurrence"
            );
        }

        Self { items, by_title }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Exact-title lookup
    pub fn find_by_title(&self, title: &str) -> AppResult<usize> {
        self.by_title
            .get(title)
            .copied()
            .ok_or_else(|| AppError::NotFound(title.to_string()))
    }

    pub fn get(&self, index: usize) -> AppResult<&Item> {
        self.items.get(index).ok_or(AppError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// Every title in catalog order, for selection lists
    pub fn titles(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.title.as_str()).collect()
    }

    /// Items for the given titles, in the order requested
    ///
    /// Names missing from the catalog are skipped.
    pub fn find_popular_subset<S: AsRef<str>>(&self, names: &[S]) -> Vec<Item> {
        names
            .iter()
            .filter_map(|name| {
                self.by_title
                    .get(name.as_ref())
                    .map(|&index| self.items[index].clone())
            })
            .collect()
    }
}
