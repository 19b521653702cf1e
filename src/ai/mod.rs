//! Hosted generation endpoint and the two clients built on it.
//!
//! # Module layout
//!
//! - [`gemini`] -- HTTP client for the `generateContent` endpoint.
//! - [`vision`] -- Tags a clothing photo with type, color, category, tags.
//! - [`outfit`] -- Picks an outfit from the available items.
//!
//! Model replies are plain text that is supposed to be JSON. Models often wrap
//! it in markdown code fences anyway, so every reply goes through
//! [`strip_code_fences`] before parsing. Text that is still not valid JSON is a
//! [`Error::Parse`]; there is no fallback to an empty object.

pub mod gemini;
pub mod outfit;
pub mod vision;

pub use gemini::GeminiClient;
pub use outfit::{ItemDescriptor, OutfitAdvisor, OutfitRequest};
pub use vision::ClothingAnalyzer;

use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wardrobe_common::{Error, Result};

/// One element of a multimodal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

/// Base64-encoded binary payload of a [`Part`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Inline binary data, base64-encoded.
    pub fn inline(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            },
        }
    }
}

/// A hosted text/multimodal generation model.
///
/// Implementations send one request per call and never retry.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Submit `parts` and return the text of the first candidate.
    ///
    /// Non-success responses fail with [`Error::Api`]; transport failures
    /// with [`Error::Network`].
    async fn generate(&self, parts: Vec<Part>) -> Result<String>;
}

const FENCE: &str = "```";

/// Remove markdown code-fence markers and surrounding whitespace.
///
/// An opening fence may carry a language tag in any case (`json`, `JSON`,
/// `javascript`) and the tag is removed with it. Idempotent: stripping an
/// already stripped string changes nothing.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(FENCE) {
        out.push_str(&rest[..start]);
        let after = &rest[start + FENCE.len()..];
        let tag_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
            .unwrap_or(after.len());
        rest = &after[tag_len..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Strip fences from a model reply and parse it as `T`.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let clean = strip_code_fences(text);
    serde_json::from_str(&clean).map_err(|e| {
        let excerpt: String = clean.chars().take(200).collect();
        Error::parse(format!("{e}; output was: {excerpt}"))
    })
}
