//! In-process backend holding objects and records in memory.
//!
//! Behaves like the hosted backend (no-overwrite uploads, update-by-id that
//! fails on unknown ids, newest-first listing) and can be told to fail a given
//! step, which is how the pipeline's failure handling is exercised.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use wardrobe_common::{
    AnalysisUpdate, AvailableItem, Error, ItemId, ItemStatus, NewItem, Result, WardrobeItem,
};

use super::{ItemStore, ObjectStorage};

const URL_PREFIX: &str = "memory://wardrobe_images/";

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<String, Bytes>,
    items: Vec<WardrobeItem>,
    upload_attempts: usize,
    fail_uploads: bool,
    fail_inserts: bool,
    fail_updates: bool,
}

/// Memory-backed [`ObjectStorage`] and [`ItemStore`].
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add existing records.
    pub fn seed(&self, items: impl IntoIterator<Item = WardrobeItem>) {
        self.state.lock().items.extend(items);
    }

    /// Snapshot of every record, in insertion order.
    pub fn items(&self) -> Vec<WardrobeItem> {
        self.state.lock().items.clone()
    }

    /// Keys of every stored object.
    pub fn object_keys(&self) -> Vec<String> {
        self.state.lock().objects.keys().cloned().collect()
    }

    /// Number of upload calls, successful or not.
    pub fn upload_attempts(&self) -> usize {
        self.state.lock().upload_attempts
    }

    /// Make every subsequent upload fail.
    pub fn fail_uploads(&self, fail: bool) {
        self.state.lock().fail_uploads = fail;
    }

    /// Make every subsequent insert fail.
    pub fn fail_inserts(&self, fail: bool) {
        self.state.lock().fail_inserts = fail;
    }

    /// Make every subsequent analysis update fail.
    pub fn fail_updates(&self, fail: bool) {
        self.state.lock().fail_updates = fail;
    }
}

#[async_trait]
impl ObjectStorage for MemoryBackend {
    async fn upload(&self, key: &str, payload: Bytes, _content_type: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.upload_attempts += 1;
        if state.fail_uploads {
            return Err(Error::Upload("storage unavailable".to_string()));
        }
        if state.objects.contains_key(key) {
            return Err(Error::Upload(format!("object {key} already exists")));
        }
        state.objects.insert(key.to_string(), payload);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{URL_PREFIX}{key}")
    }

    async fn download(&self, url: &str) -> Result<Bytes> {
        url.strip_prefix(URL_PREFIX)
            .and_then(|key| self.state.lock().objects.get(key).cloned())
            .ok_or_else(|| Error::Fetch(format!("no object at {url}")))
    }
}

#[async_trait]
impl ItemStore for MemoryBackend {
    async fn insert(&self, item: &NewItem) -> Result<ItemId> {
        let mut state = self.state.lock();
        if state.fail_inserts {
            return Err(Error::Insert("table unavailable".to_string()));
        }
        let id = ItemId::random();
        state.items.push(WardrobeItem {
            id: id.clone(),
            name: item.name.clone(),
            image_path: item.image_path.clone(),
            status: item.status,
            category: None,
            tags: Vec::new(),
            ai_data: None,
            created_at: item.created_at,
        });
        Ok(id)
    }

    async fn update_analysis(&self, id: &ItemId, update: &AnalysisUpdate) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_updates {
            return Err(Error::Update("write rejected".to_string()));
        }
        let item = state
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| Error::Update(format!("no item with id {id}")))?;

        item.status = update.status;
        item.category = Some(update.category.clone());
        item.tags = update.tags.clone();
        item.ai_data = Some(update.ai_data.clone());
        Ok(())
    }

    async fn get(&self, id: &ItemId) -> Result<Option<WardrobeItem>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .find(|item| &item.id == id)
            .cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<WardrobeItem>> {
        let mut items = self.items();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit);
        Ok(items)
    }

    async fn list_available(&self) -> Result<Vec<AvailableItem>> {
        Ok(self
            .state
            .lock()
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::Available)
            .map(AvailableItem::from)
            .collect())
    }

    async fn delete(&self, id: &ItemId) -> Result<()> {
        let mut state = self.state.lock();
        let before = state.items.len();
        state.items.retain(|item| &item.id != id);
        if state.items.len() == before {
            return Err(Error::not_found(id.to_string()));
        }
        Ok(())
    }
}
