//! Painting detail lookup.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::painting::{PaintingDetail, PaintingDetailRow};
use crate::state::AppState;
use crate::visitor::optional_visitor;

#[derive(Debug, Serialize)]
pub struct PaintingDetailResponse {
    pub painting: PaintingDetail,
}

/// GET /api/v1/paintings/:id
pub async fn handle_get_painting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PaintingDetailResponse>, AppError> {
    let row = sqlx::query_as::<_, PaintingDetailRow>(
        "SELECT id, title, title_en, artist, artist_en, year, style, \
                image_url, image_hd_url, source, source_url, license, \
                tags, aspect_ratio \
         FROM paintings WHERE id = $1",
    )
    .bind(&id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Painting {id} not found")))?;

    let is_saved = match optional_visitor(&headers) {
        Some(visitor) => {
            let saved: Option<i32> = sqlx::query_scalar(
                "SELECT 1 FROM saved_paintings WHERE visitor_id = $1 AND painting_id = $2",
            )
            .bind(&visitor)
            .bind(&id)
            .fetch_optional(&state.db)
            .await?;
            saved.is_some()
        }
        None => false,
    };

    Ok(Json(PaintingDetailResponse {
        painting: PaintingDetail::from_row(row, is_saved),
    }))
}
