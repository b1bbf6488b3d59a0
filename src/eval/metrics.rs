//! Ranking metrics: Recall@K, Precision@K, MRR@K, MAP@K, and NDCG@K.

use std::collections::{BTreeMap, HashSet};

/// Mapping from metric name (e.g. "recall@10") to its aggregate value.
pub type ScoreReport = BTreeMap<String, f64>;

/// Recall at K: proportion of all relevant documents that appear in the
/// top-K ranking. Returns 0.0 when there are no relevant documents.
pub fn recall_at_k(ranked: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = ranked
        .iter()
        .take(k)
        .filter(|id| relevant.contains(**id))
        .count();
    hits as f64 / relevant.len() as f64
}

/// Precision at K: proportion of the top-K ranking that is relevant.
/// Returns 0.0 when k is 0.
pub fn precision_at_k(ranked: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = ranked
        .iter()
        .take(k)
        .filter(|id| relevant.contains(**id))
        .count();
    hits as f64 / k as f64
}

/// Reciprocal rank of the first relevant document within the top-K,
/// or 0.0 if none appears.
pub fn reciprocal_rank_at_k(ranked: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    for (rank, id) in ranked.iter().take(k).enumerate() {
        if relevant.contains(*id) {
            return 1.0 / (rank + 1) as f64;
        }
    }
    0.0
}

/// Average precision at K: mean of precision values at each relevant hit in
/// the top-K, normalized by min(|relevant|, k).
pub fn average_precision_at_k(ranked: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if relevant.is_empty() || k == 0 {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut precision_sum = 0.0;
    for (rank, id) in ranked.iter().take(k).enumerate() {
        if relevant.contains(*id) {
            hits += 1;
            precision_sum += hits as f64 / (rank + 1) as f64;
        }
    }
    precision_sum / relevant.len().min(k) as f64
}

/// Normalized discounted cumulative gain at K with exponential gain
/// (2^grade - 1) and log2 position discount. Returns 0.0 when no positive
/// grades exist.
pub fn ndcg_at_k(ranked: &[&str], grades: &BTreeMap<String, i32>, k: usize) -> f64 {
    let dcg: f64 = ranked
        .iter()
        .take(k)
        .enumerate()
        .map(|(rank, id)| {
            let grade = grades.get(*id).copied().unwrap_or(0);
            gain(grade) / (rank as f64 + 2.0).log2()
        })
        .sum();

    let mut ideal: Vec<i32> = grades.values().copied().filter(|&g| g > 0).collect();
    ideal.sort_unstable_by(|a, b| b.cmp(a));
    let idcg: f64 = ideal
        .iter()
        .take(k)
        .enumerate()
        .map(|(rank, &grade)| gain(grade) / (rank as f64 + 2.0).log2())
        .sum();

    if idcg == 0.0 {
        return 0.0;
    }
    dcg / idcg
}

fn gain(grade: i32) -> f64 {
    if grade <= 0 {
        0.0
    } else {
        (2.0f64).powi(grade) - 1.0
    }
}

/// Aggregate ranking metrics over all judged queries at every cutoff.
///
/// Queries present in `qrels` but missing from `results` contribute zero to
/// every metric. Metric values are averaged over the judged query count.
pub fn evaluate_retrieval(
    qrels: &BTreeMap<String, BTreeMap<String, i32>>,
    results: &BTreeMap<String, Vec<(String, f32)>>,
    k_values: &[usize],
) -> ScoreReport {
    let mut report = ScoreReport::new();
    if qrels.is_empty() {
        return report;
    }
    let num_queries = qrels.len() as f64;

    for &k in k_values {
        let mut recall_sum = 0.0;
        let mut precision_sum = 0.0;
        let mut mrr_sum = 0.0;
        let mut map_sum = 0.0;
        let mut ndcg_sum = 0.0;

        for (qid, grades) in qrels {
            let ranked: Vec<&str> = results
                .get(qid)
                .map(|r| r.iter().map(|(id, _)| id.as_str()).collect())
                .unwrap_or_default();
            let relevant: HashSet<&str> = grades
                .iter()
                .filter(|(_, &g)| g > 0)
                .map(|(id, _)| id.as_str())
                .collect();

            recall_sum += recall_at_k(&ranked, &relevant, k);
            precision_sum += precision_at_k(&ranked, &relevant, k);
            mrr_sum += reciprocal_rank_at_k(&ranked, &relevant, k);
            map_sum += average_precision_at_k(&ranked, &relevant, k);
            ndcg_sum += ndcg_at_k(&ranked, grades, k);
        }

        report.insert(format!("recall@{}", k), recall_sum / num_queries);
        report.insert(format!("precision@{}", k), precision_sum / num_queries);
        report.insert(format!("mrr@{}", k), mrr_sum / num_queries);
        report.insert(format!("map@{}", k), map_sum / num_queries);
        report.insert(format!("ndcg@{}", k), ndcg_sum / num_queries);
    }

    report
}
