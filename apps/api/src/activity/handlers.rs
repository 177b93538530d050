use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::activity::{filter_valid, ActivityEvent};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    #[serde(default)]
    pub events: Vec<ActivityEvent>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub success: bool,
    pub logged: usize,
}

/// POST /api/v1/activity — accept a batch of client activity events.
/// Malformed events are dropped; survivors are stamped and buffered for
/// the interval flusher.
pub async fn handle_post_activity(
    State(state): State<AppState>,
    Json(req): Json<ActivityRequest>,
) -> Result<Json<ActivityResponse>, AppError> {
    if req.events.is_empty() {
        return Err(AppError::Validation("No events provided".to_string()));
    }

    let valid = filter_valid(req.events);
    if valid.is_empty() {
        return Err(AppError::Validation("No valid events".to_string()));
    }

    let logged = state.activity.enqueue(valid);
    Ok(Json(ActivityResponse {
        success: true,
        logged,
    }))
}
