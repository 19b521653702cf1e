//! Core type definitions for catalog records, analyses, and recommendations.
//!
//! Field names follow the hosted `items` table (snake_case columns) and the
//! JSON objects the generation endpoint is asked to produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::ItemId;

/// Category written back when the analysis did not name one.
pub const UNKNOWN: &str = "Unknown";

/// Lifecycle state of a wardrobe item.
///
/// Items are inserted as `Processing` and move to `Available` exactly once,
/// when their analysis is written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Uploaded, analysis not yet persisted.
    #[default]
    Processing,
    /// Analysis persisted; eligible for recommendations.
    Available,
}

impl ItemStatus {
    /// Column value used in filters (`status=eq.available`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Available => "available",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured tagging of one clothing photo, as returned by the vision model.
///
/// The reply object is kept whole and stored verbatim as `ai_data`. The
/// model is asked for `type`, `color`, `category`, `tags` and `description`
/// but their JSON types are not guaranteed, so the accessors read them
/// leniently: a string or an array of strings is accepted and anything else
/// counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClothingAnalysis(Map<String, Value>);

impl ClothingAnalysis {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Garment type, e.g. "T-Shirt", "Jeans".
    pub fn kind(&self) -> Option<String> {
        self.text("type")
    }

    /// Main color; several colors are joined with ", ".
    pub fn color(&self) -> Option<String> {
        self.text("color")
    }

    /// One of Top, Bottom, Shoes, Accessory, One-Piece (not enforced).
    pub fn category(&self) -> Option<String> {
        self.text("category")
    }

    pub fn description(&self) -> Option<String> {
        self.text("description")
    }

    /// Style tags. A single comma-separated string is split into tags.
    pub fn tags(&self) -> Vec<String> {
        match self.0.get("tags") {
            Some(Value::String(s)) => s.split(',').filter_map(non_blank).collect(),
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .filter_map(non_blank)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Raw value of any field, including ones beyond the requested five.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => non_blank(s),
            Value::Array(values) => {
                let parts: Vec<String> = values
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(non_blank)
                    .collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for ClothingAnalysis {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// A catalog record as stored by the remote `items` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: ItemId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Public URL of the compressed image.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_path: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ai_data: Option<ClothingAnalysis>,
    pub created_at: DateTime<Utc>,
}

/// Projection of an `available` item used as recommendation input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableItem {
    pub id: ItemId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub ai_data: Option<ClothingAnalysis>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_path: String,
}

impl From<&WardrobeItem> for AvailableItem {
    fn from(item: &WardrobeItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            ai_data: item.ai_data.clone(),
            image_path: item.image_path.clone(),
        }
    }
}

/// Row inserted when an image has been uploaded but not yet analysed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewItem {
    pub name: String,
    pub image_path: String,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
}

impl NewItem {
    /// A fresh `processing` record for an uploaded image.
    pub fn processing(name: impl Into<String>, image_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_path: image_path.into(),
            status: ItemStatus::Processing,
            created_at: Utc::now(),
        }
    }
}

/// Column values written when an analysis completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisUpdate {
    pub status: ItemStatus,
    pub category: String,
    pub tags: Vec<String>,
    pub ai_data: ClothingAnalysis,
}

impl From<&ClothingAnalysis> for AnalysisUpdate {
    fn from(analysis: &ClothingAnalysis) -> Self {
        Self {
            status: ItemStatus::Available,
            category: analysis
                .category()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            tags: analysis.tags(),
            ai_data: analysis.clone(),
        }
    }
}

/// An AI-generated outfit drawn from the available items.
///
/// Transient: produced per request and never persisted. `item_ids` may name
/// items that no longer exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutfitRecommendation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(rename = "itemIds", default, deserialize_with = "null_as_default")]
    pub item_ids: Vec<ItemId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
