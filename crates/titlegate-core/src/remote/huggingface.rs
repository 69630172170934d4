//! Embedding client for a hosted sentence-encoder inference endpoint.

use std::time::Duration;

use super::{Embedder, RemoteError, RemoteFuture};

pub const DEFAULT_EMBEDDING_API_URL: &str =
    "https://api-inference.huggingface.co/models/sentence-transformers/all-MiniLM-L6-v2";

pub struct HuggingFaceEmbedder {
    api_url: String,
    token: String,
}

impl HuggingFaceEmbedder {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: token.into(),
        }
    }
}

impl Embedder for HuggingFaceEmbedder {
    fn embed<'a>(
        &'a self,
        client: &'a reqwest::Client,
        text: &'a str,
        timeout: Duration,
    ) -> RemoteFuture<'a, Vec<f32>> {
        Box::pin(async move {
            let resp = client
                .post(&self.api_url)
                .bearer_auth(&self.token)
                .json(&serde_json::json!({ "inputs": text }))
                .timeout(timeout)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(RemoteError::Status(resp.status()));
            }

            let data: serde_json::Value = resp.json().await?;
            parse_vector(&data)
        })
    }
}

/// The service answers a single input with either a flat vector or a vector
/// wrapped in an outer list; accept both shapes.
fn parse_vector(data: &serde_json::Value) -> Result<Vec<f32>, RemoteError> {
    let outer = data
        .as_array()
        .ok_or_else(|| RemoteError::Shape("expected a JSON array".into()))?;

    let flat = match outer.first() {
        Some(serde_json::Value::Array(inner)) => inner,
        _ => outer,
    };

    flat.iter()
        .map(|value| {
            value
                .as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| RemoteError::Shape("non-numeric vector element".into()))
        })
        .collect()
}
