use crate::cache::EmbeddingCache;
use crate::config::ModelConfig;
use crate::error::{EmbedbenchError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const MAX_RETRIES: usize = 3;

/// Request structure for the OpenAI-compatible embeddings API
#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

/// Response structure from the embeddings API
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// Individual embedding data in API response
#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible embeddings endpoint.
///
/// The model behind the endpoint is treated as a black box: texts in, one
/// fixed-dimension vector per text out. Handles batch splitting, retry with
/// exponential backoff on 429/5xx, and optional value-based caching.
pub struct EmbeddingsClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    batch_size: usize,
    dimensions: usize,
    cache: Option<Arc<EmbeddingCache>>,
}

impl EmbeddingsClient {
    /// Build a client from model configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// normal operation).
    pub fn new(config: &ModelConfig, api_key: String, cache: Option<Arc<EmbeddingCache>>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.name.clone(),
            batch_size: config.batch_size.max(1),
            dimensions: config.dimensions,
            cache,
        }
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed a list of texts, returning one vector per input in the same order.
    ///
    /// Cached texts are served from memory; the rest are fetched in batches of
    /// at most `batch_size`. Every returned vector is checked against the
    /// configured dimension.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut pending: Vec<usize> = Vec::new();

        if let Some(cache) = &self.cache {
            for (i, text) in texts.iter().enumerate() {
                match cache.get(text) {
                    Some(hit) => embeddings[i] = Some(hit),
                    None => pending.push(i),
                }
            }
            if !pending.is_empty() {
                log::debug!(
                    "Embedding cache: {} hits, {} misses",
                    texts.len() - pending.len(),
                    pending.len()
                );
            }
        } else {
            pending = (0..texts.len()).collect();
        }

        for batch in pending.chunks(self.batch_size) {
            let inputs: Vec<String> = batch.iter().map(|&i| texts[i].clone()).collect();
            let vectors = self.request_with_retry(inputs).await?;

            if vectors.len() != batch.len() {
                return Err(EmbedbenchError::Embedding(format!(
                    "Embeddings API returned {} vectors for {} inputs",
                    vectors.len(),
                    batch.len()
                )));
            }

            for (&i, vector) in batch.iter().zip(vectors) {
                if vector.len() != self.dimensions {
                    return Err(EmbedbenchError::Embedding(format!(
                        "Unexpected embedding dimension: expected {}, got {}",
                        self.dimensions,
                        vector.len()
                    )));
                }
                if let Some(cache) = &self.cache {
                    cache.put(texts[i].clone(), vector.clone());
                }
                embeddings[i] = Some(vector);
            }

            // Small delay between full batches to stay under rate limits
            if batch.len() == self.batch_size {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        Ok(embeddings
            .into_iter()
            .map(|v| v.expect("every index filled from cache or API"))
            .collect())
    }

    /// Send one batch, retrying on 429/5xx with exponential backoff.
    async fn request_with_retry(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0;
        let mut delay = Duration::from_secs(1);

        loop {
            match self.request_batch(inputs.clone()).await {
                Ok(vectors) => return Ok(vectors),
                Err(RequestError::Retryable(status, body)) if attempt < MAX_RETRIES => {
                    log::warn!(
                        "Retry {}/{} after embeddings API error {}: {}",
                        attempt + 1,
                        MAX_RETRIES,
                        status,
                        body
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(RequestError::Retryable(status, body)) => {
                    return Err(EmbedbenchError::Embedding(format!(
                        "Embeddings API error {} after {} retries: {}",
                        status, MAX_RETRIES, body
                    )));
                }
                Err(RequestError::Fatal(err)) => return Err(err),
            }
        }
    }

    /// Single POST to the embeddings endpoint.
    async fn request_batch(
        &self,
        inputs: Vec<String>,
    ) -> std::result::Result<Vec<Vec<f32>>, RequestError> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: inputs,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                RequestError::Fatal(EmbedbenchError::Embedding(format!("Network error: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                return Err(RequestError::Retryable(status, body));
            }
            return Err(RequestError::Fatal(EmbedbenchError::Embedding(format!(
                "Embeddings API error {}: {}",
                status, body
            ))));
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| {
            RequestError::Fatal(EmbedbenchError::Embedding(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Internal split between retry-worthy and fatal request failures.
enum RequestError {
    Retryable(StatusCode, String),
    Fatal(EmbedbenchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_model_config(batch_size: usize) -> ModelConfig {
        ModelConfig {
            name: "mxbai-embed-large-v1".to_string(),
            base_url: "https://api.openai.com/v1/".to_string(),
            api_key_env: "EMBEDBENCH_API_KEY".to_string(),
            batch_size,
            dimensions: 1024,
            cache_capacity: 10,
        }
    }

    #[test]
    fn test_client_new_trims_base_url() {
        let client = EmbeddingsClient::new(&test_model_config(32), "key".to_string(), None);
        assert_eq!(client.base_url, "https://api.openai.com/v1");
        assert_eq!(client.model(), "mxbai-embed-large-v1");
        assert_eq!(client.batch_size, 32);
    }

    #[test]
    fn test_client_zero_batch_size_clamped() {
        let client = EmbeddingsClient::new(&test_model_config(0), "key".to_string(), None);
        assert_eq!(client.batch_size, 1);
    }

    #[tokio::test]
    async fn test_embed_empty_input() {
        let client = EmbeddingsClient::new(&test_model_config(32), "key".to_string(), None);
        let vectors = client.embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_embed_all_cached_skips_api() {
        let cache = Arc::new(EmbeddingCache::new(10));
        cache.put("warm".to_string(), vec![0.5; 1024]);
        let client =
            EmbeddingsClient::new(&test_model_config(32), "key".to_string(), Some(cache));
        // Fully cached input never reaches the network
        let vectors = client.embed(&["warm".to_string()]).await.unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].len(), 1024);
    }

    // Note: Integration tests for actual API calls would require a live
    // endpoint and should be run separately with proper fixtures.
}
