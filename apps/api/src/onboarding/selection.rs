//! Style Selection Manager — validates a visitor's submitted style ids and
//! atomically replaces their prior selection set.
//!
//! Policy for partially-invalid submissions: proceed with whatever
//! validated (unknown ids are dropped). The response echoes the accepted
//! styles so clients can detect the drop. Only a list with zero known ids
//! is rejected.

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::style::HomeStyleRow;

/// A visitor may hold at most 3 simultaneous selections.
pub const MAX_STYLE_SELECTIONS: usize = 3;

/// Structural checks, enforced before any mutation. A rejected submission
/// must leave the visitor's prior selections untouched.
pub fn check_submission(style_ids: &[i32]) -> Result<(), AppError> {
    if style_ids.is_empty() {
        return Err(AppError::Validation("No style IDs provided".to_string()));
    }
    if style_ids.len() > MAX_STYLE_SELECTIONS {
        return Err(AppError::Validation(format!(
            "Maximum {MAX_STYLE_SELECTIONS} styles allowed"
        )));
    }
    Ok(())
}

/// Filters the submitted ids down to those present in the style catalog.
pub async fn validate_style_ids(
    pool: &PgPool,
    style_ids: &[i32],
) -> Result<Vec<HomeStyleRow>, AppError> {
    let valid = sqlx::query_as::<_, HomeStyleRow>(
        "SELECT id, name, name_en, image_url FROM home_styles WHERE id = ANY($1) ORDER BY id",
    )
    .bind(style_ids)
    .fetch_all(pool)
    .await?;

    if valid.is_empty() {
        return Err(AppError::Validation("Invalid style IDs".to_string()));
    }
    Ok(valid)
}

/// Replaces the visitor's selection set: ensure the preference row exists,
/// delete all existing selection rows, insert the new set. One transaction,
/// so the swap is atomic from the visitor's perspective.
pub async fn replace_selections(
    pool: &PgPool,
    visitor_id: &str,
    styles: &[HomeStyleRow],
) -> Result<(), AppError> {
    let style_ids: Vec<i32> = styles.iter().map(|s| s.id).collect();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO user_preferences (visitor_id) VALUES ($1) \
         ON CONFLICT (visitor_id) DO NOTHING",
    )
    .bind(visitor_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM user_style_selections WHERE visitor_id = $1")
        .bind(visitor_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO user_style_selections (visitor_id, style_id, selected_at) \
         SELECT $1, t.style_id, NOW() FROM unnest($2::int4[]) AS t(style_id)",
    )
    .bind(visitor_id)
    .bind(&style_ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_submission_rejected() {
        assert!(check_submission(&[]).is_err());
    }

    #[test]
    fn test_over_long_submission_rejected() {
        assert!(check_submission(&[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_max_submission_accepted() {
        assert!(check_submission(&[1, 2, 3]).is_ok());
    }

    #[test]
    fn test_single_submission_accepted() {
        assert!(check_submission(&[7]).is_ok());
    }
}
