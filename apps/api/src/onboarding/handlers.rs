use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::style::{HomeStyle, HomeStyleRow};
use crate::onboarding::selection::{check_submission, replace_selections, validate_style_ids};
use crate::state::AppState;
use crate::visitor::require_visitor;

#[derive(Debug, Serialize)]
pub struct StyleCatalogResponse {
    pub styles: Vec<HomeStyle>,
}

/// GET /api/v1/styles — the full catalog of selectable home styles.
pub async fn handle_get_styles(
    State(state): State<AppState>,
) -> Result<Json<StyleCatalogResponse>, AppError> {
    let styles = sqlx::query_as::<_, HomeStyleRow>(
        "SELECT id, name, name_en, image_url FROM home_styles ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(StyleCatalogResponse {
        styles: styles.into_iter().map(HomeStyle::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectStylesRequest {
    pub style_ids: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct SelectStylesResponse {
    pub success: bool,
    pub styles: Vec<HomeStyle>,
}

/// POST /api/v1/styles — replace the visitor's style selections.
pub async fn handle_select_styles(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SelectStylesRequest>,
) -> Result<Json<SelectStylesResponse>, AppError> {
    let visitor = require_visitor(&headers)?;
    check_submission(&req.style_ids)?;

    let valid = validate_style_ids(&state.db, &req.style_ids).await?;
    replace_selections(&state.db, &visitor, &valid).await?;

    info!(
        "Visitor {visitor} selected styles: {:?}",
        valid.iter().map(|s| s.id).collect::<Vec<_>>()
    );

    Ok(Json(SelectStylesResponse {
        success: true,
        styles: valid.into_iter().map(HomeStyle::from).collect(),
    }))
}
