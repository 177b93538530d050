use serde::Serialize;
use sqlx::FromRow;

/// A home-style archetype. The precomputed `embedding` column is only ever
/// touched inside the feed ranking SQL, so it is not mapped here.
#[derive(Debug, Clone, FromRow)]
pub struct HomeStyleRow {
    pub id: i32,
    pub name: String,
    pub name_en: Option<String>,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeStyle {
    pub id: i32,
    pub name: String,
    pub name_en: Option<String>,
    pub image_url: String,
}

impl From<HomeStyleRow> for HomeStyle {
    fn from(row: HomeStyleRow) -> Self {
        HomeStyle {
            id: row.id,
            name: row.name,
            name_en: row.name_en,
            image_url: row.image_url,
        }
    }
}
