mod activity;
mod admin;
mod config;
mod db;
mod embeddings;
mod errors;
mod feed;
mod models;
mod onboarding;
mod paintings;
mod room;
mod routes;
mod saved;
mod state;
mod vision_client;
mod visitor;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::activity::buffer::ActivityBuffer;
use crate::config::Config;
use crate::db::create_pool;
use crate::embeddings::ClipEmbedder;
use crate::routes::build_router;
use crate::state::AppState;
use crate::vision_client::VisionClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("artwall_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ArtWall API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize vision client
    let vision = VisionClient::new(config.anthropic_api_key.clone());
    info!("Vision client initialized (model: {})", vision_client::MODEL);

    // Initialize embedding client
    let embedder = Arc::new(ClipEmbedder::new(config.clip_service_url.clone()));
    info!("Embedding client initialized ({})", config.clip_service_url);

    // Activity buffer: owned here, flushed on an interval and on shutdown
    let activity = ActivityBuffer::new(pool.clone());
    let flusher = activity.spawn_flusher();

    // Build app state
    let state = AppState {
        db: pool,
        s3,
        vision,
        embedder,
        activity: Arc::clone(&activity),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Teardown: stop the interval task (waiting out any flush it has in
    // flight), then drain whatever is still queued.
    flusher.stop().await;
    let queued = activity.pending();
    if queued > 0 {
        match activity.flush().await {
            Ok(count) => info!("Final activity flush wrote {count} events"),
            Err(e) => tracing::error!("Final activity flush failed, {queued} events dropped: {e}"),
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "artwall-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
