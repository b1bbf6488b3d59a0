use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Embedding model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model identifier sent to the embeddings endpoint.
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key_env: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    pub dimensions: usize,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

/// Benchmark task configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkConfig {
    /// Base directory containing one sub-directory per task name.
    pub data_dir: PathBuf,
    #[serde(default = "default_split")]
    pub split: String,
    /// Instruction prefix applied to query encoding only.
    pub query_prompt: String,
    #[serde(default)]
    pub retrieval_tasks: Vec<String>,
    #[serde(default)]
    pub reranking_tasks: Vec<String>,
    #[serde(default = "default_k_values")]
    pub k_values: Vec<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_split() -> String {
    "test".to_string()
}

fn default_k_values() -> Vec<usize> {
    vec![1, 5, 10, 20, 50, 100]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("embedbench.log")
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Explicit path argument (from the CLI)
    /// 2. Path specified in EMBEDBENCH_CONFIG environment variable
    /// 3. ./embedbench.toml in current directory
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("EMBEDBENCH_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("embedbench.toml")),
        };

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse embedbench.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.benchmark.data_dir.exists() {
            anyhow::bail!(
                "data_dir path does not exist: {}. Set benchmark.data_dir to the benchmark dataset directory.",
                self.benchmark.data_dir.display()
            );
        }

        if !self.benchmark.data_dir.is_dir() {
            anyhow::bail!(
                "data_dir must be a directory, not a file: {}",
                self.benchmark.data_dir.display()
            );
        }

        // Check both environment variable and .env file (dotenv already loaded in Config::load)
        std::env::var(&self.model.api_key_env)
            .with_context(|| {
                format!(
                    "Environment variable {} not set. Set it in your .env file or as an environment variable with your embeddings API key.",
                    self.model.api_key_env
                )
            })?;

        if self.model.batch_size == 0 {
            anyhow::bail!("model.batch_size must be greater than 0");
        }

        if self.model.dimensions == 0 {
            anyhow::bail!("model.dimensions must be greater than 0");
        }

        if self.benchmark.split.is_empty() {
            anyhow::bail!("benchmark.split must not be empty");
        }

        if self.benchmark.k_values.is_empty() {
            anyhow::bail!("benchmark.k_values must not be empty");
        }

        if self.benchmark.k_values.iter().any(|&k| k == 0) {
            anyhow::bail!("benchmark.k_values entries must be greater than 0");
        }

        if self.benchmark.retrieval_tasks.is_empty() && self.benchmark.reranking_tasks.is_empty() {
            anyhow::bail!("No tasks configured: both retrieval_tasks and reranking_tasks are empty");
        }

        Ok(())
    }

    /// Largest configured metric cutoff (ranking depth for the retrieval evaluator)
    pub fn max_k(&self) -> usize {
        self.benchmark.k_values.iter().copied().max().unwrap_or(1)
    }

    /// Directory holding the given task's dataset
    pub fn task_dir(&self, task: &str) -> PathBuf {
        self.benchmark.data_dir.join(task)
    }
}
