use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::preference::{PlacementSuggestion, UserPreferenceRow};
use crate::room::photo::{object_key, validate_upload};
use crate::state::AppState;
use crate::visitor::require_visitor;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadResponse {
    pub success: bool,
    pub image_url: String,
}

/// POST /api/v1/room/photo — multipart upload of a room photo.
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<PhotoUploadResponse>, AppError> {
    let visitor = require_visitor(&headers)?;

    let mut file: Option<(String, bytes::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().map(String::from).unwrap_or_default();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            file = Some((content_type, data));
            break;
        }
    }

    let (content_type, data) =
        file.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    // Validation comes before any storage or database write.
    validate_upload(Some(&content_type), data.len())?;

    let key = object_key(&visitor, &content_type, chrono::Utc::now().timestamp_millis());

    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&key)
        .body(ByteStream::from(data))
        .content_type(&content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Upload failed: {e}")))?;

    let image_url = format!(
        "{}/{}/{}",
        state.config.s3_endpoint, state.config.s3_bucket, key
    );

    sqlx::query(
        "INSERT INTO user_preferences (visitor_id, room_photo_url) VALUES ($1, $2) \
         ON CONFLICT (visitor_id) DO UPDATE \
         SET room_photo_url = EXCLUDED.room_photo_url, updated_at = NOW()",
    )
    .bind(&visitor)
    .bind(&image_url)
    .execute(&state.db)
    .await?;

    info!("Room photo uploaded by {visitor}: {image_url}");

    Ok(Json(PhotoUploadResponse {
        success: true,
        image_url,
    }))
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub placement: PlacementSuggestion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/v1/room/analyze — ask the vision service where to hang art.
///
/// Degrade-to-default contract: an upstream failure never fails the
/// request; the caller gets the fixed centred placement and
/// `success: false` instead.
pub async fn handle_analyze_room(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let visitor = require_visitor(&headers)?;

    let pref: Option<UserPreferenceRow> =
        sqlx::query_as("SELECT * FROM user_preferences WHERE visitor_id = $1")
            .bind(&visitor)
            .fetch_optional(&state.db)
            .await?;

    let room_photo_url = pref.and_then(|p| p.room_photo_url).ok_or_else(|| {
        AppError::Validation("No room photo found. Please upload a room photo first.".to_string())
    })?;

    match state.vision.analyze_room(&room_photo_url).await {
        Ok(placement) => {
            let placement_json = serde_json::to_value(&placement)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize placement: {e}")))?;
            sqlx::query(
                "UPDATE user_preferences \
                 SET placement_suggestion = $2, updated_at = NOW() \
                 WHERE visitor_id = $1",
            )
            .bind(&visitor)
            .bind(&placement_json)
            .execute(&state.db)
            .await?;

            info!("Room analyzed for {visitor}");
            Ok(Json(AnalyzeResponse {
                success: true,
                placement,
                error: None,
            }))
        }
        Err(e) => {
            warn!("Room analysis failed for {visitor}: {e}");
            Ok(Json(AnalyzeResponse {
                success: false,
                placement: PlacementSuggestion::default_centered(
                    "Default placement (analysis failed)",
                ),
                error: Some("Failed to analyze room, using default placement".to_string()),
            }))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResponse {
    pub placement: Option<Value>,
    pub room_photo_url: Option<String>,
}

/// GET /api/v1/room/placement — the stored suggestion, if any.
pub async fn handle_get_placement(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PlacementResponse>, AppError> {
    let visitor = require_visitor(&headers)?;

    let pref: Option<UserPreferenceRow> =
        sqlx::query_as("SELECT * FROM user_preferences WHERE visitor_id = $1")
            .bind(&visitor)
            .fetch_optional(&state.db)
            .await?;

    let (placement, room_photo_url) = match pref {
        Some(p) => (p.placement_suggestion, p.room_photo_url),
        None => (None, None),
    };
    Ok(Json(PlacementResponse {
        placement,
        room_photo_url,
    }))
}
