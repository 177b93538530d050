use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::deletion::{self, DeletePreviewReport, DeleteReport};
use crate::admin::importer::{self, BackfillReport, BatchReport};
use crate::errors::AppError;
use crate::models::job::BatchJobRow;
use crate::models::painting::PaintingInput;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BatchUploadRequest {
    #[serde(default)]
    pub paintings: Vec<PaintingInput>,
}

/// POST /api/v1/admin/paintings/batch
pub async fn handle_batch_upload(
    State(state): State<AppState>,
    Json(req): Json<BatchUploadRequest>,
) -> Result<Json<BatchReport>, AppError> {
    if req.paintings.is_empty() {
        return Err(AppError::Validation("No paintings provided".to_string()));
    }

    let report = importer::import_batch(&state.db, state.embedder.as_ref(), &req.paintings).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JobStatusResponse {
    Single { job: BatchJobRow },
    Recent { jobs: Vec<BatchJobRow> },
}

/// GET /api/v1/admin/paintings/batch — one job by id, or the 10 most recent.
pub async fn handle_batch_status(
    State(state): State<AppState>,
    Query(params): Query<JobQuery>,
) -> Result<Json<JobStatusResponse>, AppError> {
    match params.job_id {
        Some(job_id) => {
            let job = sqlx::query_as::<_, BatchJobRow>("SELECT * FROM batch_jobs WHERE id = $1")
                .bind(&job_id)
                .fetch_optional(&state.db)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
            Ok(Json(JobStatusResponse::Single { job }))
        }
        None => {
            let jobs = sqlx::query_as::<_, BatchJobRow>(
                "SELECT * FROM batch_jobs ORDER BY created_at DESC LIMIT 10",
            )
            .fetch_all(&state.db)
            .await?;
            Ok(Json(JobStatusResponse::Recent { jobs }))
        }
    }
}

/// POST /api/v1/admin/paintings/generate-embeddings
pub async fn handle_generate_embeddings(
    State(state): State<AppState>,
) -> Result<Json<BackfillReport>, AppError> {
    let report = importer::backfill_embeddings(&state.db, state.embedder.as_ref()).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// GET /api/v1/admin/paintings/delete-batch — dry-run preview.
pub async fn handle_delete_preview(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<DeletePreviewReport>, AppError> {
    let report = deletion::preview_page(&state.db, params.page.unwrap_or(1)).await?;
    Ok(Json(report))
}

/// DELETE /api/v1/admin/paintings/delete-batch
pub async fn handle_delete_batch(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<DeleteReport>, AppError> {
    let report = deletion::delete_page(&state.db, params.page.unwrap_or(1)).await?;
    Ok(Json(report))
}
