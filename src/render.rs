//! Text projections of the catalog and of outfit recommendations.
//!
//! Both views are built from fresh snapshots and never patched in place.

use std::fmt;

use tracing::debug;
use wardrobe_common::{AvailableItem, ItemId, ItemStatus, OutfitRecommendation, WardrobeItem};

/// Shown for items without a name.
pub const UNTITLED: &str = "Untitled";

/// Shown instead of a category while analysis is pending.
pub const ANALYZING: &str = "Analyzing...";

/// One entry of the catalog view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCard {
    pub id: ItemId,
    pub title: String,
    pub subtitle: String,
    pub status: ItemStatus,
    pub image_url: String,
}

impl From<&WardrobeItem> for CatalogCard {
    fn from(item: &WardrobeItem) -> Self {
        let title = if item.name.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            item.name.clone()
        };
        let subtitle = item
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(ANALYZING)
            .to_string();

        Self {
            id: item.id.clone(),
            title,
            subtitle,
            status: item.status,
            image_url: item.image_path.clone(),
        }
    }
}

impl fmt::Display for CatalogCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<28} {:<14} [{}] {}\n    {}",
            self.title, self.subtitle, self.status, self.id, self.image_url
        )
    }
}

/// Project catalog items into cards, keeping their order.
pub fn render_catalog(items: &[WardrobeItem]) -> Vec<CatalogCard> {
    items.iter().map(CatalogCard::from).collect()
}

/// A piece of a rendered outfit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfitPiece {
    pub id: ItemId,
    pub name: String,
    pub image_url: String,
}

/// A recommendation resolved against the items it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfitView {
    pub title: String,
    pub reason: String,
    pub notes: String,
    pub pieces: Vec<OutfitPiece>,
    /// Ids the recommendation named that are not in the catalog.
    pub missing: Vec<ItemId>,
}

/// Resolve a recommendation's item ids against `items`.
///
/// Ids with no matching item are skipped and reported in
/// [`OutfitView::missing`]; they are never an error.
pub fn render_outfit(recommendation: &OutfitRecommendation, items: &[AvailableItem]) -> OutfitView {
    let mut pieces = Vec::with_capacity(recommendation.item_ids.len());
    let mut missing = Vec::new();

    for id in &recommendation.item_ids {
        match items.iter().find(|item| &item.id == id) {
            Some(item) => pieces.push(OutfitPiece {
                id: item.id.clone(),
                name: item.name.clone(),
                image_url: item.image_path.clone(),
            }),
            None => {
                debug!(id = %id, "Recommended item not in catalog, skipping");
                missing.push(id.clone());
            }
        }
    }

    OutfitView {
        title: recommendation.title.clone(),
        reason: recommendation.reason.clone(),
        notes: recommendation.notes.clone(),
        pieces,
        missing,
    }
}

impl fmt::Display for OutfitView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f)?;
        writeln!(f, "{}", self.reason)?;
        writeln!(f)?;
        for piece in &self.pieces {
            writeln!(f, "  - {} ({})", piece.name, piece.image_url)?;
        }
        if !self.notes.is_empty() {
            writeln!(f)?;
            write!(f, "Tip: {}", self.notes)?;
        }
        Ok(())
    }
}
