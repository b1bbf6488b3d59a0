use crate::error::{EmbedbenchError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// One reranking sample: a query with positive and negative candidate texts.
#[derive(Debug, Clone, Deserialize)]
pub struct RerankingSample {
    pub query: String,
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

/// Load all samples of one split from `<task_dir>/<split>/samples.json`.
pub fn load_samples(task_dir: &Path, split: &str) -> Result<Vec<RerankingSample>> {
    let path = task_dir.join(split).join("samples.json");
    let samples: Vec<RerankingSample> = super::read_json_file(&path)?;
    if samples.is_empty() {
        return Err(EmbedbenchError::Dataset(format!(
            "No samples in {}",
            path.display()
        )));
    }
    Ok(samples)
}

/// Descriptive statistics over a loaded reranking split.
///
/// Unique counts deduplicate by candidate text value, not by sample position:
/// the same passage appearing in two samples counts once. Average lengths are
/// character counts, divided by the unique-candidate count for positives and
/// negatives but by the total sample count for queries.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStats {
    pub num_samples: usize,
    pub total_positives: usize,
    pub unique_positives: usize,
    pub total_negatives: usize,
    pub unique_negatives: usize,
    pub avg_query_len: f64,
    pub avg_positive_len: f64,
    pub avg_negative_len: f64,
}

impl SampleStats {
    pub fn compute(samples: &[RerankingSample]) -> Result<Self> {
        if samples.is_empty() {
            return Err(EmbedbenchError::Dataset(
                "Cannot compute statistics over an empty sample list".to_string(),
            ));
        }

        let total_positives: usize = samples.iter().map(|s| s.positive.len()).sum();
        let total_negatives: usize = samples.iter().map(|s| s.negative.len()).sum();

        let unique_positives: HashSet<&str> = samples
            .iter()
            .flat_map(|s| s.positive.iter().map(String::as_str))
            .collect();
        let unique_negatives: HashSet<&str> = samples
            .iter()
            .flat_map(|s| s.negative.iter().map(String::as_str))
            .collect();

        if unique_positives.is_empty() {
            return Err(EmbedbenchError::Dataset(
                "Split has no positive candidates".to_string(),
            ));
        }
        if unique_negatives.is_empty() {
            return Err(EmbedbenchError::Dataset(
                "Split has no negative candidates".to_string(),
            ));
        }

        let query_chars: usize = samples.iter().map(|s| s.query.chars().count()).sum();
        let positive_chars: usize = unique_positives.iter().map(|p| p.chars().count()).sum();
        let negative_chars: usize = unique_negatives.iter().map(|n| n.chars().count()).sum();

        Ok(Self {
            num_samples: samples.len(),
            total_positives,
            unique_positives: unique_positives.len(),
            total_negatives,
            unique_negatives: unique_negatives.len(),
            avg_query_len: query_chars as f64 / samples.len() as f64,
            avg_positive_len: positive_chars as f64 / unique_positives.len() as f64,
            avg_negative_len: negative_chars as f64 / unique_negatives.len() as f64,
        })
    }

    /// Write the diagnostic lines for a loaded split.
    pub fn log(&self, samples: &[RerankingSample]) {
        log::info!(
            "Total queries: {}; total/unique positives: {}/{}; total/unique negatives: {}/{}",
            self.num_samples,
            self.total_positives,
            self.unique_positives,
            self.total_negatives,
            self.unique_negatives
        );
        log::info!(
            "Average lengths: [query: {:.2}, positive: {:.2}, negative: {:.2}]",
            self.avg_query_len,
            self.avg_positive_len,
            self.avg_negative_len
        );
        if let Some(first) = samples.first() {
            log::info!("Example query: {}", first.query);
            log::info!(
                "Example positives: {:?}",
                &first.positive[..first.positive.len().min(3)]
            );
            log::info!(
                "Example negatives: {:?}",
                &first.negative[..first.negative.len().min(3)]
            );
        }
    }
}
