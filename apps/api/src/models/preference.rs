#![allow(dead_code)]

use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Per-visitor preference record. Created lazily on first interaction;
/// the learned `embedding` is written by the event worker, only read here.
#[derive(Debug, Clone, FromRow)]
pub struct UserPreferenceRow {
    pub visitor_id: String,
    pub room_photo_url: Option<String>,
    pub placement_suggestion: Option<Value>,
    pub interaction_count: i32,
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A transparent region of the room photo (window, door, french door).
/// All coordinates are percentages of the image dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlassArea {
    pub left: f64,
    pub right: f64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallSection {
    pub left: f64,
    pub right: f64,
    #[serde(default)]
    pub width: Option<f64>,
}

/// Placement suggestion returned by the vision service. Every field the
/// model may omit carries a default so a partially-formed response still
/// decodes rather than failing the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSuggestion {
    #[serde(default)]
    pub glass_areas: Vec<GlassArea>,
    #[serde(default)]
    pub solid_wall_sections: Vec<WallSection>,
    #[serde(default)]
    pub no_suitable_wall: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub recommended_aspect: Option<String>,
    #[serde(default)]
    pub recommended_frame: Option<String>,
    #[serde(default)]
    pub needs_mat: bool,
    #[serde(default)]
    pub reasoning: String,
}

impl PlacementSuggestion {
    /// Fixed centred fallback used whenever the vision service fails or
    /// returns something undecodable.
    pub fn default_centered(reasoning: &str) -> Self {
        PlacementSuggestion {
            glass_areas: Vec::new(),
            solid_wall_sections: Vec::new(),
            no_suitable_wall: false,
            x: 35.0,
            y: 25.0,
            width: 30.0,
            height: 30.0,
            recommended_aspect: None,
            recommended_frame: None,
            needs_mat: false,
            reasoning: reasoning.to_string(),
        }
    }
}
