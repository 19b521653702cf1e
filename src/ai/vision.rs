//! Clothing photo tagging.

use std::sync::Arc;

use tracing::info;
use wardrobe_common::{ClothingAnalysis, Result};

use super::{parse_model_json, GenerativeModel, Part};
use crate::compress::CompressedImage;

/// Instruction sent alongside every photo.
pub const ANALYSIS_PROMPT: &str = "\
Analyze this clothing item image. Return a JSON object with these fields:
- type: (e.g., T-Shirt, Dress, Jeans)
- color: (Main color)
- category: (Top, Bottom, Shoes, Accessory, One-Piece)
- tags: (Array of style tags, e.g., Casual, Formal, Vintage)
- description: (Short description)

IMPORTANT: Output PURE JSON only. Do not use Markdown code blocks.";

/// Sends photos to the vision model and parses its tagging.
#[derive(Clone)]
pub struct ClothingAnalyzer {
    model: Arc<dyn GenerativeModel>,
}

impl ClothingAnalyzer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Tag a compressed photo.
    pub async fn analyze(&self, image: &CompressedImage) -> Result<ClothingAnalysis> {
        self.analyze_bytes(image.data(), image.mime_type()).await
    }

    /// Tag raw image bytes of the given MIME type.
    ///
    /// Fails with `Error::Parse` when the reply is not a JSON object. Field
    /// types inside the object are not checked. Nothing is retried.
    pub async fn analyze_bytes(&self, data: &[u8], mime_type: &str) -> Result<ClothingAnalysis> {
        let parts = vec![Part::text(ANALYSIS_PROMPT), Part::inline(mime_type, data)];
        let text = self.model.generate(parts).await?;
        let analysis: ClothingAnalysis = parse_model_json(&text)?;

        info!(
            kind = analysis.kind().as_deref().unwrap_or("?"),
            category = analysis.category().as_deref().unwrap_or("?"),
            "Analyzed clothing photo"
        );
        Ok(analysis)
    }
}
