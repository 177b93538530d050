use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::feed::ranker::{self, clamp_limit};
use crate::models::painting::FeedPainting;
use crate::state::AppState;
use crate::visitor::optional_visitor;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub paintings: Vec<FeedPainting>,
    pub next_offset: Option<i64>,
    pub has_more: bool,
}

/// GET /api/v1/feed
///
/// Serves one ranked page, then records the returned items as shown for
/// the visitor so they are never repeated in later pages.
pub async fn handle_get_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, AppError> {
    let offset = params.offset.unwrap_or(0).max(0);
    let limit = clamp_limit(params.limit);
    let visitor = optional_visitor(&headers);

    let page = ranker::fetch_feed_page(&state.db, visitor.as_deref(), offset, limit).await?;

    if let Some(visitor) = &visitor {
        if !page.paintings.is_empty() {
            let ids: Vec<String> = page.paintings.iter().map(|p| p.id.clone()).collect();
            ranker::mark_shown(&state.db, visitor, &ids).await?;
            debug!("Marked {} paintings shown for {visitor}", ids.len());
        }
    }

    Ok(Json(FeedResponse {
        paintings: page.paintings.into_iter().map(FeedPainting::from).collect(),
        next_offset: page.next_offset,
        has_more: page.has_more,
    }))
}
