//! Saved-painting toggle and listing.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::painting::SavedPainting;
use crate::state::AppState;
use crate::visitor::require_visitor;

#[derive(Debug, Serialize)]
pub struct SavedListResponse {
    pub paintings: Vec<SavedPainting>,
    pub total: usize,
}

/// GET /api/v1/saved — the visitor's favorites, most recent first.
pub async fn handle_list_saved(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SavedListResponse>, AppError> {
    let visitor = require_visitor(&headers)?;

    let paintings = sqlx::query_as::<_, SavedPainting>(
        "SELECT p.id, p.title, p.title_en, p.artist, p.artist_en, p.year, p.style, \
                p.image_url, p.aspect_ratio \
         FROM saved_paintings sp \
         JOIN paintings p ON p.id = sp.painting_id \
         WHERE sp.visitor_id = $1 \
         ORDER BY sp.saved_at DESC",
    )
    .bind(&visitor)
    .fetch_all(&state.db)
    .await?;

    let total = paintings.len();
    Ok(Json(SavedListResponse { paintings, total }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSavedRequest {
    pub painting_id: String,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSavedResponse {
    pub success: bool,
    pub action: &'static str,
    pub painting_id: String,
}

/// POST /api/v1/saved — save or unsave a painting.
/// Any action other than "unsave" defaults to save.
pub async fn handle_toggle_saved(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ToggleSavedRequest>,
) -> Result<Json<ToggleSavedResponse>, AppError> {
    let visitor = require_visitor(&headers)?;
    if req.painting_id.is_empty() {
        return Err(AppError::Validation("Painting ID required".to_string()));
    }

    sqlx::query(
        "INSERT INTO user_preferences (visitor_id) VALUES ($1) \
         ON CONFLICT (visitor_id) DO NOTHING",
    )
    .bind(&visitor)
    .execute(&state.db)
    .await?;

    let action = if req.action.as_deref() == Some("unsave") {
        sqlx::query("DELETE FROM saved_paintings WHERE visitor_id = $1 AND painting_id = $2")
            .bind(&visitor)
            .bind(&req.painting_id)
            .execute(&state.db)
            .await?;
        "unsaved"
    } else {
        sqlx::query(
            "INSERT INTO saved_paintings (visitor_id, painting_id, saved_at) \
             VALUES ($1, $2, NOW()) \
             ON CONFLICT (visitor_id, painting_id) DO UPDATE SET saved_at = NOW()",
        )
        .bind(&visitor)
        .bind(&req.painting_id)
        .execute(&state.db)
        .await?;
        "saved"
    };

    Ok(Json(ToggleSavedResponse {
        success: true,
        action,
        painting_id: req.painting_id,
    }))
}
