use clap::Parser;
use embedbench::cache::EmbeddingCache;
use embedbench::embeddings::EmbeddingsClient;
use embedbench::{logging, runner, Config};
use std::path::PathBuf;
use std::sync::Arc;

/// Evaluate a sentence-embedding model on retrieval and reranking benchmarks.
#[derive(Parser, Debug)]
#[command(name = "embedbench")]
struct Args {
    /// Path to the configuration file (default: $EMBEDBENCH_CONFIG or ./embedbench.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single phase instead of both.
    #[arg(long, value_enum)]
    only: Option<Phase>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Phase {
    Retrieval,
    Reranking,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    logging::init(&config.logging)?;

    log::info!(
        "Evaluating model {} with instruction-based prompt",
        config.model.name
    );

    let api_key = std::env::var(&config.model.api_key_env).map_err(|_| {
        anyhow::anyhow!(
            "Environment variable {} not set. Set it in your .env file or as an environment variable.",
            config.model.api_key_env
        )
    })?;

    // Wrap in an LRU cache if cache_capacity > 0 (reranking splits repeat candidates)
    let cache = if config.model.cache_capacity > 0 {
        Some(Arc::new(EmbeddingCache::new(config.model.cache_capacity)))
    } else {
        None
    };
    let client = EmbeddingsClient::new(&config.model, api_key, cache);

    if args.only != Some(Phase::Reranking) {
        runner::run_retrieval_tasks(&config, &client).await?;
    }
    if args.only != Some(Phase::Retrieval) {
        runner::run_reranking_tasks(&config, &client).await?;
    }

    log::info!("Evaluation complete");
    Ok(())
}
