//! Task runners: one pass per configured benchmark task, strictly in list
//! order. Any failure propagates and aborts the whole run.

use crate::config::Config;
use crate::dataset::{reranking, RetrievalSplit, SampleStats};
use crate::embeddings::EmbeddingsClient;
use crate::encoder::InstructedEncoder;
use crate::error::Result;
use crate::eval::metrics::evaluate_retrieval;
use crate::eval::{reranking as reranking_eval, retrieval as retrieval_eval, ScoreReport};
use std::time::Instant;

/// Final scores for one benchmark task.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task: String,
    pub scores: ScoreReport,
}

/// Run every configured retrieval task and log each score report.
pub async fn run_retrieval_tasks(
    config: &Config,
    client: &EmbeddingsClient,
) -> Result<Vec<TaskReport>> {
    let encoder = InstructedEncoder::new(client, &config.benchmark.query_prompt);
    let mut reports = Vec::with_capacity(config.benchmark.retrieval_tasks.len());

    for task in &config.benchmark.retrieval_tasks {
        log::info!(
            "Starting retrieval task {} for model {} with instruction prompt: {}",
            task,
            client.model(),
            config.benchmark.query_prompt
        );

        let data = RetrievalSplit::load(&config.task_dir(task), &config.benchmark.split)?;
        log::info!(
            "Loaded split '{}': {} queries, {} documents, {} judged queries",
            config.benchmark.split,
            data.queries.len(),
            data.corpus.len(),
            data.qrels.len()
        );

        let results = retrieval_eval::retrieve(&encoder, &data, config.max_k()).await?;
        let scores = evaluate_retrieval(&data.qrels, &results, &config.benchmark.k_values);
        log_scores(task, &scores);

        reports.push(TaskReport {
            task: task.clone(),
            scores,
        });
    }

    Ok(reports)
}

/// Run every configured reranking task and log statistics plus scores.
pub async fn run_reranking_tasks(
    config: &Config,
    client: &EmbeddingsClient,
) -> Result<Vec<TaskReport>> {
    let encoder = InstructedEncoder::new(client, &config.benchmark.query_prompt);
    let mut reports = Vec::with_capacity(config.benchmark.reranking_tasks.len());

    for task in &config.benchmark.reranking_tasks {
        log::info!(
            "Starting reranking task {} for model {} with instruction prompt: {}",
            task,
            client.model(),
            config.benchmark.query_prompt
        );

        let samples = reranking::load_samples(&config.task_dir(task), &config.benchmark.split)?;
        let stats = SampleStats::compute(&samples)?;
        stats.log(&samples);

        let started = Instant::now();
        let scores = reranking_eval::rerank(&encoder, &samples).await?;
        log::info!(
            "Scores computed in {:.2} seconds",
            started.elapsed().as_secs_f64()
        );
        log_scores(task, &scores);

        reports.push(TaskReport {
            task: task.clone(),
            scores,
        });
    }

    Ok(reports)
}

fn log_scores(task: &str, scores: &ScoreReport) {
    let rendered: Vec<String> = scores
        .iter()
        .map(|(name, value)| format!("{}: {:.4}", name, value))
        .collect();
    log::info!("Scores for {}: {{{}}}", task, rendered.join(", "));
}
