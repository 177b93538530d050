//! Admin batch importer and embedding backfill.
//!
//! Both loops are strictly sequential per item; a per-item failure is
//! recorded and never aborts the batch. The embedding client's request
//! timeout bounds how long one stalled item can hold the loop.

use chrono::Utc;
use pgvector::Vector;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::embeddings::EmbeddingProvider;
use crate::errors::AppError;
use crate::models::job::{BatchItemResult, ItemStatus};
use crate::models::painting::PaintingInput;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub job_id: String,
    pub status: String,
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
}

/// Imports a list of painting records: embed, then insert. Items whose id
/// or source URL already exists in the catalog are skipped (idempotent
/// re-submission), not re-embedded or overwritten.
pub async fn import_batch(
    pool: &PgPool,
    embedder: &dyn EmbeddingProvider,
    paintings: &[PaintingInput],
) -> Result<BatchReport, AppError> {
    let job_id = format!("job_{}", Utc::now().timestamp_millis());
    sqlx::query("INSERT INTO batch_jobs (id, status, total) VALUES ($1, 'processing', $2)")
        .bind(&job_id)
        .bind(paintings.len() as i32)
        .execute(pool)
        .await?;

    let mut results = Vec::with_capacity(paintings.len());
    for painting in paintings {
        results.push(import_one(pool, embedder, painting).await);
    }

    let failed_results: Vec<BatchItemResult> = results
        .iter()
        .filter(|r| r.status == ItemStatus::Failed)
        .cloned()
        .collect();
    let failed_count = failed_results.len();
    let processed = results.len() - failed_count;
    let failed_items = (!failed_results.is_empty()).then(|| json!({ "items": failed_results }));

    sqlx::query(
        "UPDATE batch_jobs \
         SET status = 'completed', processed = $2, failed = $3, \
             failed_items = $4, completed_at = NOW() \
         WHERE id = $1",
    )
    .bind(&job_id)
    .bind(processed as i32)
    .bind(failed_count as i32)
    .bind(&failed_items)
    .execute(pool)
    .await?;

    info!(
        "Batch {job_id}: {processed}/{} processed, {failed_count} failed",
        results.len()
    );

    Ok(BatchReport {
        job_id,
        status: "completed".to_string(),
        total: results.len(),
        processed,
        failed: failed_count,
        results,
    })
}

async fn import_one(
    pool: &PgPool,
    embedder: &dyn EmbeddingProvider,
    painting: &PaintingInput,
) -> BatchItemResult {
    match try_import(pool, embedder, painting).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Import of {} failed: {e}", painting.id);
            BatchItemResult::failed(&painting.id, e.to_string())
        }
    }
}

async fn try_import(
    pool: &PgPool,
    embedder: &dyn EmbeddingProvider,
    painting: &PaintingInput,
) -> Result<BatchItemResult, AppError> {
    let exists: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM paintings \
         WHERE id = $1 OR (source_url IS NOT NULL AND source_url = $2)",
    )
    .bind(&painting.id)
    .bind(&painting.source_url)
    .fetch_optional(pool)
    .await?;
    if exists.is_some() {
        return Ok(BatchItemResult::skipped(&painting.id));
    }

    let embedding = embedder.embed_image_url(&painting.image_url).await?;

    sqlx::query(
        "INSERT INTO paintings \
             (id, title, title_en, artist, artist_en, year, style, \
              image_url, image_hd_url, source, source_url, license, \
              tags, aspect_ratio, embedding, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
                 $13, $14, $15, NOW(), NOW())",
    )
    .bind(&painting.id)
    .bind(&painting.title)
    .bind(&painting.title_en)
    .bind(&painting.artist)
    .bind(&painting.artist_en)
    .bind(painting.year)
    .bind(&painting.style)
    .bind(&painting.image_url)
    .bind(&painting.image_hd_url)
    .bind(&painting.source)
    .bind(&painting.source_url)
    .bind(&painting.license)
    .bind(&painting.tags)
    .bind(&painting.aspect_ratio)
    .bind(Vector::from(embedding))
    .execute(pool)
    .await?;

    Ok(BatchItemResult::imported(&painting.id))
}

// ────────────────────────────────────────────────────────────────────────────
// Embedding backfill
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    pub message: String,
    pub processed: usize,
    pub total: usize,
    pub failed: Vec<BatchItemResult>,
}

/// Paintings imported before the embedding pipeline existed carry either a
/// NULL embedding or an all-zeros placeholder; both need backfilling.
pub fn needs_embedding(embedding: Option<&[f32]>) -> bool {
    match embedding {
        None => true,
        Some(values) => values.iter().all(|v| *v == 0.0),
    }
}

/// Fetches embeddings for every catalog row that lacks a real one.
pub async fn backfill_embeddings(
    pool: &PgPool,
    embedder: &dyn EmbeddingProvider,
) -> Result<BackfillReport, AppError> {
    let rows: Vec<(String, String, Option<Vector>)> = sqlx::query_as(
        "SELECT id, image_url, embedding FROM paintings WHERE image_url IS NOT NULL",
    )
    .fetch_all(pool)
    .await?;

    let pending: Vec<(String, String)> = rows
        .into_iter()
        .filter(|(_, _, embedding)| {
            needs_embedding(embedding.as_ref().map(|v| v.to_vec()).as_deref())
        })
        .map(|(id, image_url, _)| (id, image_url))
        .collect();

    if pending.is_empty() {
        return Ok(BackfillReport {
            message: "No paintings need embeddings".to_string(),
            processed: 0,
            total: 0,
            failed: Vec::new(),
        });
    }

    info!("Found {} paintings needing embeddings", pending.len());

    let mut processed = 0;
    let mut failed = Vec::new();
    for (id, image_url) in &pending {
        match embedder.embed_image_url(image_url).await {
            Ok(embedding) => {
                let updated = sqlx::query(
                    "UPDATE paintings SET embedding = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(id)
                .bind(Vector::from(embedding))
                .execute(pool)
                .await;
                match updated {
                    Ok(_) => processed += 1,
                    Err(e) => failed.push(BatchItemResult::failed(id, e.to_string())),
                }
            }
            Err(e) => {
                warn!("Embedding backfill for {id} failed: {e}");
                failed.push(BatchItemResult::failed(id, e.to_string()));
            }
        }
    }

    Ok(BackfillReport {
        message: "Embedding generation complete".to_string(),
        processed,
        total: pending.len(),
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_embedding_needs_backfill() {
        assert!(needs_embedding(None));
    }

    #[test]
    fn test_zero_embedding_needs_backfill() {
        let zeros = vec![0.0_f32; 512];
        assert!(needs_embedding(Some(&zeros)));
    }

    #[test]
    fn test_real_embedding_skipped() {
        let mut values = vec![0.0_f32; 512];
        values[7] = 0.3;
        assert!(!needs_embedding(Some(&values)));
    }
}
