//! Reranking evaluation: per sample, rank positive and negative candidates
//! against the prompted query embedding, then average MAP and MRR@10 over
//! all usable samples.

use crate::dataset::RerankingSample;
use crate::encoder::InstructedEncoder;
use crate::error::{EmbedbenchError, Result};
use crate::eval::cosine_similarity;
use crate::eval::metrics::ScoreReport;

/// Cutoff for the reciprocal-rank component of the score report.
const MRR_CUTOFF: usize = 10;

/// Score all samples and return the aggregate report ("map", "mrr@10").
///
/// Samples without at least one positive and one negative candidate are
/// skipped with a warning; a split where every sample is skipped is a
/// dataset error.
pub async fn rerank(
    encoder: &InstructedEncoder<'_>,
    samples: &[RerankingSample],
) -> Result<ScoreReport> {
    let mut ap_sum = 0.0;
    let mut rr_sum = 0.0;
    let mut evaluated = 0usize;
    let mut skipped = 0usize;

    for (idx, sample) in samples.iter().enumerate() {
        if sample.positive.is_empty() || sample.negative.is_empty() {
            log::warn!(
                "Skipping sample {}: needs at least one positive and one negative candidate",
                idx
            );
            skipped += 1;
            continue;
        }

        let query_vecs = encoder
            .encode_queries(std::slice::from_ref(&sample.query))
            .await?;

        let mut candidates: Vec<String> =
            Vec::with_capacity(sample.positive.len() + sample.negative.len());
        candidates.extend(sample.positive.iter().cloned());
        candidates.extend(sample.negative.iter().cloned());
        let candidate_vecs = encoder.encode_passages(&candidates).await?;

        let (ap, rr) = score_sample(&query_vecs[0], &candidate_vecs, sample.positive.len());
        ap_sum += ap;
        rr_sum += rr;
        evaluated += 1;
    }

    if evaluated == 0 {
        return Err(EmbedbenchError::Evaluation(
            "No usable reranking samples (every sample was skipped)".to_string(),
        ));
    }
    if skipped > 0 {
        log::warn!("Skipped {}/{} samples", skipped, samples.len());
    }

    let mut report = ScoreReport::new();
    report.insert("map".to_string(), ap_sum / evaluated as f64);
    report.insert(format!("mrr@{}", MRR_CUTOFF), rr_sum / evaluated as f64);
    Ok(report)
}

/// Rank one sample's candidates against the query embedding.
///
/// The first `num_positive` candidate vectors are the relevant ones. Returns
/// (average precision over the full candidate list, reciprocal rank within
/// the MRR cutoff).
pub(crate) fn score_sample(
    query_vec: &[f32],
    candidate_vecs: &[Vec<f32>],
    num_positive: usize,
) -> (f64, f64) {
    let mut order: Vec<(usize, f32)> = candidate_vecs
        .iter()
        .map(|v| cosine_similarity(query_vec, v))
        .enumerate()
        .collect();
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut hits = 0usize;
    let mut precision_sum = 0.0;
    let mut reciprocal_rank = 0.0;
    for (rank, (candidate_idx, _)) in order.iter().enumerate() {
        if *candidate_idx < num_positive {
            hits += 1;
            precision_sum += hits as f64 / (rank + 1) as f64;
            if reciprocal_rank == 0.0 && rank < MRR_CUTOFF {
                reciprocal_rank = 1.0 / (rank + 1) as f64;
            }
        }
    }

    let ap = if num_positive == 0 {
        0.0
    } else {
        precision_sum / num_positive as f64
    };
    (ap, reciprocal_rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_sample_perfect_ranking() {
        let query = vec![1.0, 0.0];
        let candidates = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let (ap, rr) = score_sample(&query, &candidates, 1);
        assert!((ap - 1.0).abs() < 1e-9);
        assert!((rr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_sample_positive_ranked_second() {
        let query = vec![1.0, 0.0];
        // Positive is orthogonal, negative matches the query
        let candidates = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let (ap, rr) = score_sample(&query, &candidates, 1);
        assert!((ap - 0.5).abs() < 1e-9);
        assert!((rr - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_score_sample_interleaved_positives() {
        let query = vec![1.0, 0.0];
        // Ranking order: pos(1.0), neg(0.8), pos(0.6)
        let candidates = vec![
            vec![1.0, 0.0],
            vec![0.6, 0.8],
            vec![0.8, 0.6],
        ];
        let (ap, _) = score_sample(&query, &candidates, 2);
        // Hits at ranks 1 and 3: (1/1 + 2/3) / 2
        assert!((ap - (1.0 + 2.0 / 3.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_sample_rr_zero_beyond_cutoff() {
        let query = vec![1.0, 0.0];
        // 10 negatives score higher than the single positive
        let mut candidates = vec![vec![0.0, 1.0]];
        for _ in 0..10 {
            candidates.push(vec![1.0, 0.0]);
        }
        let (ap, rr) = score_sample(&query, &candidates, 1);
        assert_eq!(rr, 0.0);
        // AP still credits the hit at rank 11
        assert!((ap - 1.0 / 11.0).abs() < 1e-9);
    }
}
