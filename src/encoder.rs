//! Instruction-prompted encoding: queries are embedded with a fixed
//! instruction prefix, corpus text never is. The two benchmark shapes share
//! one capability surface and differ only in how corpus input is flattened
//! (title+text records for retrieval, flat strings for reranking).

use crate::dataset::CorpusDoc;
use crate::embeddings::EmbeddingsClient;
use crate::error::Result;

/// Embedding adapter enforcing the query/corpus prompt asymmetry.
pub struct InstructedEncoder<'a> {
    client: &'a EmbeddingsClient,
    prompt: &'a str,
}

impl<'a> InstructedEncoder<'a> {
    pub fn new(client: &'a EmbeddingsClient, prompt: &'a str) -> Self {
        Self { client, prompt }
    }

    /// Encode queries, each prefixed with the instruction prompt.
    pub async fn encode_queries(&self, queries: &[String]) -> Result<Vec<Vec<f32>>> {
        log::debug!(
            "Encoding {} queries with instruction prompt: {}",
            queries.len(),
            self.prompt
        );
        self.client.embed(&prefix_queries(self.prompt, queries)).await
    }

    /// Encode corpus documents (title+text records), with no prompt.
    pub async fn encode_documents(&self, docs: &[&CorpusDoc]) -> Result<Vec<Vec<f32>>> {
        log::debug!("Encoding {} corpus documents with no prompt", docs.len());
        self.client.embed(&flatten_documents(docs)).await
    }

    /// Encode flat candidate passages, with no prompt.
    pub async fn encode_passages(&self, passages: &[String]) -> Result<Vec<Vec<f32>>> {
        log::debug!("Encoding {} candidate passages with no prompt", passages.len());
        self.client.embed(passages).await
    }
}

/// Prepend the instruction prompt to every query.
fn prefix_queries(prompt: &str, queries: &[String]) -> Vec<String> {
    queries
        .iter()
        .map(|q| format!("{}{}", prompt, q))
        .collect()
}

/// Flatten title+text records into the passage form the model sees.
fn flatten_documents(docs: &[&CorpusDoc]) -> Vec<String> {
    docs.iter().map(|d| d.passage()).collect()
}
