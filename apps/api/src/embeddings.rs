//! Embedding provider — HTTP client for the CLIP sidecar service.
//!
//! The batch importer and the embedding backfill both go through the
//! `EmbeddingProvider` trait carried in `AppState`, so tests and future
//! backends can swap implementations without touching callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Call sites are strictly sequential and there is no retry here: a failed
/// call is terminal for that one item (the batch loops record it and
/// continue).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Maps an image URL to a fixed-length vector (512 dims for ViT-B/32).
    async fn embed_image_url(&self, image_url: &str) -> Result<Vec<f32>, AppError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingRequest<'a> {
    image_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
    #[allow(dead_code)]
    dimensions: Option<usize>,
}

/// CLIP service client. A stalled call is bounded by the request timeout
/// rather than blocking its batch item forever.
#[derive(Clone)]
pub struct ClipEmbedder {
    client: reqwest::Client,
    base_url: String,
}

impl ClipEmbedder {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for ClipEmbedder {
    async fn embed_image_url(&self, image_url: &str) -> Result<Vec<f32>, AppError> {
        let url = format!("{}/api/embedding", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest { image_url })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "CLIP service returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("invalid response body: {e}")))?;

        if parsed.embedding.is_empty() {
            return Err(AppError::Embedding("empty embedding returned".to_string()));
        }

        Ok(parsed.embedding)
    }
}
