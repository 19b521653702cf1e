//! Outfit-of-the-day recommendations.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use wardrobe_common::{AvailableItem, Error, ItemId, OutfitRecommendation, Result, UNKNOWN};

use super::{parse_model_json, GenerativeModel, Part};

pub const DEFAULT_OCCASION: &str = "casual everyday";
pub const DEFAULT_WEATHER: &str = "comfortable";

/// The user's context for a recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfitRequest {
    pub occasion: String,
    pub weather: String,
}

impl Default for OutfitRequest {
    fn default() -> Self {
        Self {
            occasion: DEFAULT_OCCASION.to_string(),
            weather: DEFAULT_WEATHER.to_string(),
        }
    }
}

impl OutfitRequest {
    /// Build a request, falling back to the defaults for blank input.
    pub fn new(occasion: Option<&str>, weather: Option<&str>) -> Self {
        let pick = |value: Option<&str>, default: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        Self {
            occasion: pick(occasion, DEFAULT_OCCASION),
            weather: pick(weather, DEFAULT_WEATHER),
        }
    }
}

/// The fields of an item the stylist needs, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDescriptor {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    pub tags: Vec<String>,
    pub category: String,
}

impl From<&AvailableItem> for ItemDescriptor {
    fn from(item: &AvailableItem) -> Self {
        let ai = item.ai_data.as_ref();
        let field = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            kind: field(ai.and_then(|a| a.kind())),
            color: field(ai.and_then(|a| a.color())),
            tags: ai.map(|a| a.tags()).unwrap_or_default(),
            category: field(ai.and_then(|a| a.category())),
        }
    }
}

/// Render the stylist prompt for `request` over `items`.
pub fn build_prompt(request: &OutfitRequest, items: &[AvailableItem]) -> Result<String> {
    let descriptors: Vec<ItemDescriptor> = items.iter().map(ItemDescriptor::from).collect();
    let wardrobe = serde_json::to_string(&descriptors)
        .map_err(|e| Error::parse(format!("serializing wardrobe: {e}")))?;

    Ok(format!(
        r#"You are a top fashion stylist.
Recommend the best OOTD (Outfit of the Day) for the situation below, using only items from the user's wardrobe.

### 1. Today's situation
- Weather: {weather}
- Occasion: {occasion}

### 2. Wardrobe
```json
{wardrobe}
```

### 3. Your task
Pick items from the wardrobe that combine into one outfit.
Take the weather, the occasion and how the styles go together into account.

### 4. Response format (CRITICAL)
Return **only one JSON object** and nothing else, shaped like this:
```json
{{
  "title": "Name of the look",
  "reason": "Why this works today (2-3 sentences)",
  "itemIds": ["id1", "id2"],
  "notes": "Styling tip"
}}
```"#,
        weather = request.weather,
        occasion = request.occasion,
    ))
}

/// Asks the model for an outfit drawn from the available items.
#[derive(Clone)]
pub struct OutfitAdvisor {
    model: Arc<dyn GenerativeModel>,
}

impl OutfitAdvisor {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Request a recommendation.
    ///
    /// An empty `items` list fails with [`Error::EmptyWardrobe`] without
    /// contacting the model.
    pub async fn recommend(
        &self,
        request: &OutfitRequest,
        items: &[AvailableItem],
    ) -> Result<OutfitRecommendation> {
        if items.is_empty() {
            return Err(Error::EmptyWardrobe);
        }

        let prompt = build_prompt(request, items)?;
        let text = self.model.generate(vec![Part::text(prompt)]).await?;
        let recommendation: OutfitRecommendation = parse_model_json(&text)?;

        info!(
            title = %recommendation.title,
            pieces = recommendation.item_ids.len(),
            "Received outfit recommendation"
        );
        Ok(recommendation)
    }
}
