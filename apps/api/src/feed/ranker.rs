//! Feed Ranker — composes the retrieval query that scores catalog items
//! against a visitor's preference signals, excludes already-shown items,
//! and paginates the result.
//!
//! Signal policy, in priority order:
//! 1. Visitor has ≥1 style selection or a learned embedding → rank by the
//!    max-of-max combined similarity (see `RANKED_SQL`): whichever signal
//!    best matches an item wins, rather than an average that would
//!    penalize diverse taste.
//! 2. Otherwise → newest catalog additions first, similarity reported as
//!    a constant 1.0 so the API surface stays uniform.

use pgvector::Vector;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::painting::FeedPaintingRow;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;

/// One ordered page of the feed plus the pagination cursor.
#[derive(Debug)]
pub struct FeedPage {
    pub paintings: Vec<FeedPaintingRow>,
    pub next_offset: Option<i64>,
    pub has_more: bool,
}

const FEED_COLUMNS: &str = "p.id, p.title, p.title_en, p.artist, p.artist_en, p.year, p.style, \
     p.image_url, p.tags, p.aspect_ratio";

/// Combined-similarity ranking. Per candidate, the score is the greater of:
/// - the best match across the visitor's selected style embeddings, and
/// - the match against the learned preference embedding ($2, may be NULL).
///
/// `1 - (a <=> b)` turns pgvector's cosine distance into a similarity.
/// Ties fall back to the store's natural order (no explicit tie-break
/// column).
const RANKED_SQL: &str = "\
    SELECT p.id, p.title, p.title_en, p.artist, p.artist_en, p.year, p.style, \
           p.image_url, p.tags, p.aspect_ratio, \
           GREATEST( \
               COALESCE(( \
                   SELECT MAX(1 - (p.embedding <=> hs.embedding)) \
                   FROM user_style_selections uss \
                   JOIN home_styles hs ON hs.id = uss.style_id \
                   WHERE uss.visitor_id = $1 \
               ), 0::float8), \
               COALESCE(1 - (p.embedding <=> $2), 0::float8) \
           ) AS similarity \
    FROM paintings p \
    WHERE p.embedding IS NOT NULL \
      AND p.id NOT IN (SELECT painting_id FROM shown_paintings WHERE visitor_id = $1) \
    ORDER BY similarity DESC \
    LIMIT $3 OFFSET $4";

/// Fetches one feed page for an (optionally identified) visitor.
///
/// Exclusion is applied before ranking/limiting, so offsets are unstable
/// across calls once new items are marked shown mid-session. Acceptable:
/// the UI consumes pages sequentially and never seeks backward.
pub async fn fetch_feed_page(
    pool: &PgPool,
    visitor_id: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<FeedPage, AppError> {
    let paintings = match visitor_id {
        Some(visitor) => {
            let learned = learned_embedding(pool, visitor).await?;
            let has_styles = has_style_selections(pool, visitor).await?;

            if learned.is_some() || has_styles {
                sqlx::query_as::<_, FeedPaintingRow>(RANKED_SQL)
                    .bind(visitor)
                    .bind(learned)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
            } else {
                recency_page(pool, Some(visitor), offset, limit).await?
            }
        }
        None => recency_page(pool, None, offset, limit).await?,
    };

    let (has_more, next_offset) = page_cursor(paintings.len(), offset, limit);
    Ok(FeedPage {
        paintings,
        next_offset,
        has_more,
    })
}

/// Recency fallback: newest embedded paintings first, constant similarity.
/// Known visitors still get their exclusion filter applied.
async fn recency_page(
    pool: &PgPool,
    visitor_id: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<Vec<FeedPaintingRow>, AppError> {
    let rows = match visitor_id {
        Some(visitor) => {
            let sql = format!(
                "SELECT {FEED_COLUMNS}, 1.0::float8 AS similarity \
                 FROM paintings p \
                 WHERE p.embedding IS NOT NULL \
                   AND p.id NOT IN (SELECT painting_id FROM shown_paintings WHERE visitor_id = $1) \
                 ORDER BY p.created_at DESC \
                 LIMIT $2 OFFSET $3"
            );
            sqlx::query_as::<_, FeedPaintingRow>(&sql)
                .bind(visitor)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {FEED_COLUMNS}, 1.0::float8 AS similarity \
                 FROM paintings p \
                 WHERE p.embedding IS NOT NULL \
                 ORDER BY p.created_at DESC \
                 LIMIT $1 OFFSET $2"
            );
            sqlx::query_as::<_, FeedPaintingRow>(&sql)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows)
}

async fn learned_embedding(pool: &PgPool, visitor_id: &str) -> Result<Option<Vector>, AppError> {
    let embedding: Option<Option<Vector>> =
        sqlx::query_scalar("SELECT embedding FROM user_preferences WHERE visitor_id = $1")
            .bind(visitor_id)
            .fetch_optional(pool)
            .await?;
    Ok(embedding.flatten())
}

async fn has_style_selections(pool: &PgPool, visitor_id: &str) -> Result<bool, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_style_selections WHERE visitor_id = $1")
            .bind(visitor_id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

/// Records the served page into the exclusion ledger.
///
/// The preference row is upserted first (no-op if it exists), then all
/// returned ids go in through a single parameterized multi-row upsert —
/// re-serving a frozen result set refreshes `shown_at` instead of erroring,
/// which also makes concurrent same-visitor requests race-safe.
pub async fn mark_shown(
    pool: &PgPool,
    visitor_id: &str,
    painting_ids: &[String],
) -> Result<(), AppError> {
    if painting_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO user_preferences (visitor_id) VALUES ($1) \
         ON CONFLICT (visitor_id) DO NOTHING",
    )
    .bind(visitor_id)
    .execute(pool)
    .await?;

    sqlx::query(
        "INSERT INTO shown_paintings (visitor_id, painting_id, shown_at) \
         SELECT $1, t.painting_id, NOW() FROM unnest($2::text[]) AS t(painting_id) \
         ON CONFLICT (visitor_id, painting_id) DO UPDATE SET shown_at = NOW()",
    )
    .bind(visitor_id)
    .bind(painting_ids)
    .execute(pool)
    .await?;

    Ok(())
}

/// Clamps the client-requested page size to `[1, MAX_LIMIT]`,
/// defaulting to `DEFAULT_LIMIT`.
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// `hasMore` is inferred from a full page. This misreports "no more"
/// exactly when the catalog holds precisely `offset + limit` matching
/// items — a known limitation carried over deliberately.
pub fn page_cursor(returned: usize, offset: i64, limit: i64) -> (bool, Option<i64>) {
    let has_more = returned as i64 == limit;
    let next_offset = has_more.then_some(offset + limit);
    (has_more, next_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit_defaults() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn test_clamp_limit_caps_at_max() {
        assert_eq!(clamp_limit(Some(500)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(50)), 50);
    }

    #[test]
    fn test_clamp_limit_floor() {
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-3)), 1);
    }

    #[test]
    fn test_page_cursor_full_page() {
        let (has_more, next) = page_cursor(10, 20, 10);
        assert!(has_more);
        assert_eq!(next, Some(30));
    }

    #[test]
    fn test_page_cursor_short_page() {
        let (has_more, next) = page_cursor(3, 20, 10);
        assert!(!has_more);
        assert_eq!(next, None);
    }

    #[test]
    fn test_page_cursor_empty_page() {
        let (has_more, next) = page_cursor(0, 0, 10);
        assert!(!has_more);
        assert_eq!(next, None);
    }
}
