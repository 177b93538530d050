//! Page-wise admin batch deletion with an order guard: paintings referenced
//! by an order are never deleted, and related records (shown/saved/
//! activities) are removed before the paintings themselves.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;

pub const DELETE_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintingPreview {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePreviewReport {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub count: usize,
    pub paintings: Vec<PaintingPreview>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    pub deleted: usize,
    pub skipped_with_orders: usize,
    pub message: String,
}

pub fn page_offset(page: i64) -> i64 {
    (page.max(1) - 1) * DELETE_PAGE_SIZE
}

pub fn total_pages(total: i64) -> i64 {
    (total + DELETE_PAGE_SIZE - 1) / DELETE_PAGE_SIZE
}

/// Dry run: which paintings would page N delete.
pub async fn preview_page(pool: &PgPool, page: i64) -> Result<DeletePreviewReport, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM paintings")
        .fetch_one(pool)
        .await?;

    let paintings: Vec<PaintingPreview> = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
        "SELECT id, title, created_at FROM paintings \
         ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(DELETE_PAGE_SIZE)
    .bind(page_offset(page))
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(id, title, created_at)| PaintingPreview {
        id,
        title,
        created_at,
    })
    .collect();

    Ok(DeletePreviewReport {
        page: page.max(1),
        page_size: DELETE_PAGE_SIZE,
        total,
        total_pages: total_pages(total),
        count: paintings.len(),
        paintings,
    })
}

/// Deletes page N of the catalog (newest first), cascading related records
/// and skipping anything an order references.
pub async fn delete_page(pool: &PgPool, page: i64) -> Result<DeleteReport, AppError> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT id FROM paintings ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(DELETE_PAGE_SIZE)
    .bind(page_offset(page))
    .fetch_all(pool)
    .await?;

    if ids.is_empty() {
        return Ok(DeleteReport {
            deleted: 0,
            skipped_with_orders: 0,
            message: "No paintings found for this page".to_string(),
        });
    }

    let ordered: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT painting_id FROM order_items WHERE painting_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let deletable: Vec<String> = ids
        .iter()
        .filter(|id| !ordered.contains(id))
        .cloned()
        .collect();

    if !deletable.is_empty() {
        let mut tx = pool.begin().await?;

        // Related records go first; the paintings row is the FK target.
        sqlx::query("DELETE FROM shown_paintings WHERE painting_id = ANY($1)")
            .bind(&deletable)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM saved_paintings WHERE painting_id = ANY($1)")
            .bind(&deletable)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM activities WHERE painting_id = ANY($1)")
            .bind(&deletable)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM paintings WHERE id = ANY($1)")
            .bind(&deletable)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    info!(
        "Deleted {} paintings (page {page}), skipped {} with orders",
        deletable.len(),
        ordered.len()
    );

    Ok(DeleteReport {
        deleted: deletable.len(),
        skipped_with_orders: ordered.len(),
        message: format!("Deleted {} paintings", deletable.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(2), 100);
        assert_eq!(page_offset(0), 0); // clamped to page 1
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(100), 1);
        assert_eq!(total_pages(101), 2);
    }
}
