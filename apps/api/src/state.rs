use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::activity::buffer::ActivityBuffer;
use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::vision_client::VisionClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub vision: VisionClient,
    /// Pluggable embedding backend; production uses the CLIP sidecar.
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// Activity queue owned here, flushed by the background task and again
    /// on shutdown.
    pub activity: Arc<ActivityBuffer>,
    pub config: Config,
}
