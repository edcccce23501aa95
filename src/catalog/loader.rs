use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use super::{Catalog, SimilarityTable};
use crate::error::{AppError, AppResult};

/// On-disk catalog entry. The catalog blob is a bincode `Vec<CatalogRecord>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogRecord {
    pub id: String,
    pub title: String,
}

/// Catalog and similarity table, validated to share one index space
#[derive(Debug, Clone)]
pub struct Dataset {
    pub catalog: Arc<Catalog>,
    pub similarity: Arc<SimilarityTable>,
}

impl Dataset {
    /// Pairs a catalog with its similarity table
    ///
    /// Fails when the table's dimension differs from the catalog length.
    pub fn new(catalog: Catalog, similarity: SimilarityTable) -> AppResult<Self> {
        if similarity.dimension() != catalog.len() {
            return Err(AppError::DataIntegrity(format!(
                "similarity table is {}x{} but catalog has {} items",
                similarity.dimension(),
                similarity.dimension(),
                catalog.len()
            )));
        }

        Ok(Self {
            catalog: Arc::new(catalog),
            similarity: Arc::new(similarity),
        })
    }
}

/// Loads and validates both blobs
///
/// Any read, decode or shape problem is a `DataIntegrity` error; the caller is
/// expected to abort startup rather than serve partial data.
pub fn load_dataset(
    catalog_path: impl AsRef<Path>,
    similarity_path: impl AsRef<Path>,
) -> AppResult<Dataset> {
    let records: Vec<CatalogRecord> = read_blob(catalog_path.as_ref())?;
    let rows: Vec<Vec<f32>> = read_blob(similarity_path.as_ref())?;

    let catalog = Catalog::new(records);
    let similarity = SimilarityTable::from_rows(rows)?;
    let dataset = Dataset::new(catalog, similarity)?;

    tracing::info!(
        items = dataset.catalog.len(),
        catalog = %catalog_path.as_ref().display(),
        similarity = %similarity_path.as_ref().display(),
        "Dataset loaded"
    );

    Ok(dataset)
}

fn read_blob<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    // Decoding from an in-memory slice bounds every length prefix by the file size
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::DataIntegrity(format!("cannot read {}: {}", path.display(), e))
    })?;

    bincode::deserialize(&bytes).map_err(|e| {
        AppError::DataIntegrity(format!("cannot decode {}: {}", path.display(), e))
    })
}

fn write_blob<T: Serialize + ?Sized>(path: &Path, value: &T) -> AppResult<()> {
    let file = File::create(path).map_err(|e| {
        AppError::Internal(format!("cannot create {}: {}", path.display(), e))
    })?;

    bincode::serialize_into(BufWriter::new(file), value).map_err(|e| {
        AppError::Internal(format!("cannot encode {}: {}", path.display(), e))
    })
}

/// Writes a catalog blob in the format `load_dataset` reads
pub fn write_catalog(path: impl AsRef<Path>, records: &[CatalogRecord]) -> AppResult<()> {
    write_blob(path.as_ref(), records)
}

/// Writes a similarity blob in the format `load_dataset` reads
pub fn write_similarity(path: impl AsRef<Path>, rows: &[Vec<f32>]) -> AppResult<()> {
    write_blob(path.as_ref(), rows)
}
