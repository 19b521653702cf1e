//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], a [`Wardrobe`] wired to an in-memory backend and a
//! [`ScriptedModel`] that replays canned replies and records what it was sent.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use image::{ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;

use wardrobe::ai::{GenerativeModel, Part};
use wardrobe::compress::ImageCompressor;
use wardrobe::pipeline::UploadFile;
use wardrobe::storage::{MemoryBackend, StorageGateway};
use wardrobe::Wardrobe;
use wardrobe_common::{ClothingAnalysis, Error, ItemId, ItemStatus, Result, WardrobeItem};

/// Generation model that answers from a queue of scripted replies.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<Vec<Part>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, text: impl Into<String>) -> &Self {
        self.replies.lock().push_back(Ok(text.into()));
        self
    }

    pub fn fail(&self, error: Error) -> &Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<Vec<Part>> {
        self.requests.lock().clone()
    }

    /// Text of the first part of the `n`th request.
    pub fn prompt(&self, n: usize) -> String {
        match self.requests.lock().get(n).and_then(|parts| parts.first()) {
            Some(Part::Text { text }) => text.clone(),
            other => panic!("request {n} has no leading text part: {other:?}"),
        }
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        self.requests.lock().push(parts);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::network("no scripted reply left")))
    }
}

/// A [`Wardrobe`] over memory storage and a scripted model.
pub struct TestHarness {
    pub wardrobe: Wardrobe,
    pub backend: Arc<MemoryBackend>,
    pub model: Arc<ScriptedModel>,
}

impl TestHarness {
    pub fn new() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let model = Arc::new(ScriptedModel::new());
        let wardrobe = Wardrobe::new(
            StorageGateway::from_backend(backend.clone()),
            ImageCompressor::default(),
            model.clone(),
        );
        Self {
            wardrobe,
            backend,
            model,
        }
    }
}

/// PNG bytes of a `width`x`height` gradient.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("encode png fixture");
    buf.into_inner()
}

pub fn photo(name: &str) -> UploadFile {
    UploadFile::new(name, png(64, 48))
}

/// A model reply tagging a garment.
pub fn analysis_reply(kind: &str, category: &str) -> String {
    format!(
        r#"{{"type": "{kind}", "color": "Black", "category": "{category}", "tags": ["Casual"], "description": "A {kind}"}}"#
    )
}

/// A catalog record created `age_minutes` ago.
pub fn item(id: i64, name: &str, status: ItemStatus, age_minutes: i64) -> WardrobeItem {
    WardrobeItem {
        id: ItemId::from(id),
        name: name.to_string(),
        image_path: format!("memory://wardrobe_images/{id}.webp"),
        status,
        category: None,
        tags: Vec::new(),
        ai_data: None,
        created_at: Utc::now() - Duration::minutes(age_minutes),
    }
}

/// An `available` record carrying a full analysis.
pub fn tagged(id: i64, name: &str, kind: &str, color: &str, category: &str) -> WardrobeItem {
    let analysis: ClothingAnalysis = serde_json::from_value(serde_json::json!({
        "type": kind,
        "color": color,
        "category": category,
        "tags": ["Casual"]
    }))
    .unwrap();
    WardrobeItem {
        category: Some(category.to_string()),
        tags: analysis.tags(),
        ai_data: Some(analysis),
        ..item(id, name, ItemStatus::Available, 0)
    }
}
