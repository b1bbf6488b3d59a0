//! On-disk benchmark datasets: one directory per task, one sub-directory per
//! split. Retrieval splits hold corpus/queries/qrels, reranking splits hold
//! flat query/positive/negative samples.

pub mod reranking;
pub mod retrieval;

pub use reranking::{RerankingSample, SampleStats};
pub use retrieval::{CorpusDoc, RetrievalSplit};

use crate::error::{EmbedbenchError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and deserialize one JSON dataset file, with the path in any error.
pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        EmbedbenchError::Dataset(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        EmbedbenchError::Dataset(format!("Invalid JSON in {}: {}", path.display(), e))
    })
}
