use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row returned by the feed ranking queries. `similarity` is computed in SQL:
/// either `1 - (embedding <=> signal)` or a constant 1.0 on the recency path.
#[derive(Debug, Clone, FromRow)]
pub struct FeedPaintingRow {
    pub id: String,
    pub title: String,
    pub title_en: Option<String>,
    pub artist: String,
    pub artist_en: Option<String>,
    pub year: Option<i32>,
    pub style: Option<String>,
    pub image_url: String,
    pub tags: Vec<String>,
    pub aspect_ratio: Option<String>,
    pub similarity: f64,
}

/// Wire shape of a feed item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPainting {
    pub id: String,
    pub title: String,
    pub title_en: Option<String>,
    pub artist: String,
    pub artist_en: Option<String>,
    pub year: Option<i32>,
    pub style: Option<String>,
    pub image_url: String,
    pub tags: Vec<String>,
    pub aspect_ratio: Option<String>,
    pub similarity: f64,
}

impl From<FeedPaintingRow> for FeedPainting {
    fn from(row: FeedPaintingRow) -> Self {
        FeedPainting {
            id: row.id,
            title: row.title,
            title_en: row.title_en,
            artist: row.artist,
            artist_en: row.artist_en,
            year: row.year,
            style: row.style,
            image_url: row.image_url,
            tags: row.tags,
            aspect_ratio: row.aspect_ratio,
            similarity: row.similarity,
        }
    }
}

/// Full catalog record, as served by the painting-detail endpoint.
#[derive(Debug, Clone, FromRow)]
pub struct PaintingDetailRow {
    pub id: String,
    pub title: String,
    pub title_en: Option<String>,
    pub artist: String,
    pub artist_en: Option<String>,
    pub year: Option<i32>,
    pub style: Option<String>,
    pub image_url: String,
    pub image_hd_url: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub license: Option<String>,
    pub tags: Vec<String>,
    pub aspect_ratio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintingDetail {
    pub id: String,
    pub title: String,
    pub title_en: Option<String>,
    pub artist: String,
    pub artist_en: Option<String>,
    pub year: Option<i32>,
    pub style: Option<String>,
    pub image_url: String,
    pub image_hd_url: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub license: Option<String>,
    pub tags: Vec<String>,
    pub aspect_ratio: Option<String>,
    pub is_saved: bool,
}

impl PaintingDetail {
    pub fn from_row(row: PaintingDetailRow, is_saved: bool) -> Self {
        PaintingDetail {
            id: row.id,
            title: row.title,
            title_en: row.title_en,
            artist: row.artist,
            artist_en: row.artist_en,
            year: row.year,
            style: row.style,
            image_url: row.image_url,
            image_hd_url: row.image_hd_url,
            source: row.source,
            source_url: row.source_url,
            license: row.license,
            tags: row.tags,
            aspect_ratio: row.aspect_ratio,
            is_saved,
        }
    }
}

/// Compact shape used by the saved-paintings listing.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedPainting {
    pub id: String,
    pub title: String,
    pub title_en: Option<String>,
    pub artist: String,
    pub artist_en: Option<String>,
    pub year: Option<i32>,
    pub style: Option<String>,
    pub image_url: String,
    pub aspect_ratio: Option<String>,
}

/// A painting record as submitted to the admin batch importer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintingInput {
    pub id: String,
    pub title: String,
    pub title_en: Option<String>,
    pub artist: String,
    pub artist_en: Option<String>,
    pub year: Option<i32>,
    pub style: Option<String>,
    pub image_url: String,
    pub image_hd_url: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub license: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub aspect_ratio: Option<String>,
}
