pub mod client;

pub use client::EmbeddingsClient;
