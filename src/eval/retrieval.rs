//! Retrieval evaluation: rank the full corpus for every query by cosine
//! similarity of prompted-query vs. plain-document embeddings.

use crate::dataset::RetrievalSplit;
use crate::encoder::InstructedEncoder;
use crate::error::Result;
use crate::eval::cosine_similarity;
use std::collections::BTreeMap;

/// Encode queries and corpus, then rank the corpus per query.
///
/// Returns, for each query id, the top `top_k` documents as
/// (doc id, similarity score) pairs in descending score order.
pub async fn retrieve(
    encoder: &InstructedEncoder<'_>,
    data: &RetrievalSplit,
    top_k: usize,
) -> Result<BTreeMap<String, Vec<(String, f32)>>> {
    let query_ids: Vec<&str> = data.queries.keys().map(String::as_str).collect();
    let query_texts: Vec<String> = data.queries.values().cloned().collect();
    let query_vecs = encoder.encode_queries(&query_texts).await?;

    let doc_ids: Vec<&str> = data.corpus.keys().map(String::as_str).collect();
    let docs: Vec<_> = data.corpus.values().collect();
    let doc_vecs = encoder.encode_documents(&docs).await?;

    Ok(rank_corpus(&query_ids, &query_vecs, &doc_ids, &doc_vecs, top_k))
}

/// Score every document against every query and keep the top `top_k` per query.
pub(crate) fn rank_corpus(
    query_ids: &[&str],
    query_vecs: &[Vec<f32>],
    doc_ids: &[&str],
    doc_vecs: &[Vec<f32>],
    top_k: usize,
) -> BTreeMap<String, Vec<(String, f32)>> {
    let mut results = BTreeMap::new();

    for (qid, query_vec) in query_ids.iter().zip(query_vecs) {
        let mut scored: Vec<(String, f32)> = doc_ids
            .iter()
            .zip(doc_vecs)
            .map(|(doc_id, doc_vec)| (doc_id.to_string(), cosine_similarity(query_vec, doc_vec)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        results.insert(qid.to_string(), scored);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::metrics::evaluate_retrieval;

    #[test]
    fn test_rank_corpus_orders_by_similarity() {
        let query_ids = ["q1"];
        let query_vecs = vec![vec![1.0, 0.0]];
        let doc_ids = ["far", "near", "mid"];
        let doc_vecs = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let results = rank_corpus(&query_ids, &query_vecs, &doc_ids, &doc_vecs, 10);
        let ranked = &results["q1"];
        assert_eq!(ranked[0].0, "near");
        assert_eq!(ranked[1].0, "mid");
        assert_eq!(ranked[2].0, "far");
        assert!(ranked[0].1 > ranked[1].1 && ranked[1].1 > ranked[2].1);
    }

    #[test]
    fn test_rank_corpus_truncates_to_top_k() {
        let query_ids = ["q1"];
        let query_vecs = vec![vec![1.0, 0.0]];
        let doc_ids = ["a", "b", "c"];
        let doc_vecs = vec![vec![1.0, 0.0], vec![1.0, 0.1], vec![0.5, 0.5]];
        let results = rank_corpus(&query_ids, &query_vecs, &doc_ids, &doc_vecs, 2);
        assert_eq!(results["q1"].len(), 2);
    }

    #[test]
    fn test_rank_then_evaluate_end_to_end() {
        // 2 queries, 3 documents, exactly one relevant document per query
        let query_ids = ["q1", "q2"];
        let query_vecs = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]];
        let doc_ids = ["d1", "d2", "d3"];
        let doc_vecs = vec![
            vec![0.9, 0.1, 0.0],
            vec![0.1, 0.9, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        let results = rank_corpus(&query_ids, &query_vecs, &doc_ids, &doc_vecs, 100);

        let qrels = std::collections::BTreeMap::from([
            (
                "q1".to_string(),
                std::collections::BTreeMap::from([("d1".to_string(), 1)]),
            ),
            (
                "q2".to_string(),
                std::collections::BTreeMap::from([("d2".to_string(), 1)]),
            ),
        ]);

        let k_values = [1, 5, 10, 20, 50, 100];
        let report = evaluate_retrieval(&qrels, &results, &k_values);
        for k in k_values {
            for family in ["recall", "precision", "mrr", "map", "ndcg"] {
                let value = report[&format!("{}@{}", family, k)];
                assert!(value.is_finite());
                assert!((0.0..=1.0).contains(&value));
            }
        }
        // Both relevant documents rank first for their query
        assert!((report["recall@1"] - 1.0).abs() < 1e-9);
        assert!((report["mrr@1"] - 1.0).abs() < 1e-9);
    }
}
