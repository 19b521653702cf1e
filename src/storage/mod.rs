//! Remote storage gateway.
//!
//! Images go to public object storage and catalog records go to a
//! table-backed datastore. Both are reached through the [`ObjectStorage`] and
//! [`ItemStore`] traits so the hosted service ([`SupabaseBackend`]) and the
//! in-process [`MemoryBackend`] are interchangeable.
//!
//! [`StorageGateway`] layers the item lifecycle on top: an upload is stored
//! before its record is inserted, so a failed upload never leaves a record
//! pointing at a missing blob.

mod memory;
mod schema;
mod supabase;

pub use memory::MemoryBackend;
pub use schema::schema_sql;
pub use supabase::SupabaseBackend;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use wardrobe_common::{
    AnalysisUpdate, AvailableItem, ClothingAnalysis, Error, ItemId, NewItem, Result, WardrobeItem,
};

use crate::compress::{CompressedImage, WEBP_EXTENSION};

/// Default size of the catalog view.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Blob storage with publicly dereferenceable URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `payload` under `key`. Existing keys are never overwritten;
    /// failures map to [`Error::Upload`].
    async fn upload(&self, key: &str, payload: Bytes, content_type: &str) -> Result<()>;

    /// Public URL of an object. Does not check that the object exists.
    fn public_url(&self, key: &str) -> String;

    /// Fetch an object by its public URL; failures map to [`Error::Fetch`].
    async fn download(&self, url: &str) -> Result<Bytes>;
}

/// The `items` table.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a record and return the identifier the store assigned.
    async fn insert(&self, item: &NewItem) -> Result<ItemId>;

    /// Write analysis columns for `id`. Unknown ids fail with
    /// [`Error::Update`] and leave the table untouched.
    async fn update_analysis(&self, id: &ItemId, update: &AnalysisUpdate) -> Result<()>;

    /// Look up one record.
    async fn get(&self, id: &ItemId) -> Result<Option<WardrobeItem>>;

    /// All items, newest `created_at` first, at most `limit`.
    async fn list_recent(&self, limit: usize) -> Result<Vec<WardrobeItem>>;

    /// Every item whose status is `available`.
    async fn list_available(&self) -> Result<Vec<AvailableItem>>;

    /// Remove one record; unknown ids fail with [`Error::NotFound`].
    async fn delete(&self, id: &ItemId) -> Result<()>;
}

/// Coordinates object storage and catalog records for wardrobe items.
#[derive(Clone)]
pub struct StorageGateway {
    objects: Arc<dyn ObjectStorage>,
    items: Arc<dyn ItemStore>,
    recent_limit: usize,
}

impl StorageGateway {
    /// Create a gateway over the given storage and record backends.
    pub fn new(objects: Arc<dyn ObjectStorage>, items: Arc<dyn ItemStore>) -> Self {
        Self {
            objects,
            items,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    /// Use one backend for both blobs and records.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ObjectStorage + ItemStore + 'static,
    {
        Self::new(backend.clone(), backend)
    }

    /// Override how many items [`list_recent`](Self::list_recent) returns.
    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit.max(1);
        self
    }

    /// Upload a compressed image and create its `processing` record.
    ///
    /// The blob is uploaded under `{millis}_{sanitized name}.webp`. An upload
    /// failure returns before any record is written. An insert failure after
    /// a successful upload leaves the blob orphaned; this is logged and not
    /// retried.
    pub async fn store_item(&self, image: &CompressedImage, original_name: &str) -> Result<ItemId> {
        let key = storage_key(original_name, Utc::now().timestamp_millis());

        self.objects
            .upload(&key, image.data().clone(), image.mime_type())
            .await?;
        let url = self.objects.public_url(&key);

        let record = NewItem::processing(name_stem(original_name), url);
        match self.items.insert(&record).await {
            Ok(id) => {
                info!(id = %id, key = %key, "Stored wardrobe item");
                Ok(id)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Record insert failed; uploaded image is orphaned");
                Err(e)
            }
        }
    }

    /// Mark an item `available` with the given analysis.
    ///
    /// Failure leaves the item `processing`; the earlier upload is not undone.
    pub async fn update_analysis(&self, id: &ItemId, analysis: &ClothingAnalysis) -> Result<()> {
        let update = AnalysisUpdate::from(analysis);
        self.items.update_analysis(id, &update).await?;
        info!(id = %id, category = %update.category, "Item analysis saved");
        Ok(())
    }

    /// Fetch one item or fail with [`Error::NotFound`].
    pub async fn get_item(&self, id: &ItemId) -> Result<WardrobeItem> {
        self.items
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found(id.to_string()))
    }

    /// Newest items for the catalog view.
    pub async fn list_recent(&self) -> Result<Vec<WardrobeItem>> {
        self.items.list_recent(self.recent_limit).await
    }

    /// Items eligible for outfit recommendations.
    pub async fn list_available(&self) -> Result<Vec<AvailableItem>> {
        self.items.list_available().await
    }

    /// Delete an item's record. The image blob is left in storage.
    pub async fn remove_item(&self, id: &ItemId) -> Result<()> {
        self.items.delete(id).await?;
        info!(id = %id, "Removed wardrobe item");
        Ok(())
    }

    /// Download a stored image by its public URL.
    pub async fn download_image(&self, url: &str) -> Result<Bytes> {
        self.objects.download(url).await
    }
}

/// Object key for an upload: `{millis}_{name}.webp`, where every character of
/// the original file name that is not an ASCII letter or digit becomes `_`.
pub fn storage_key(original_name: &str, millis: i64) -> String {
    let clean: String = original_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{millis}_{clean}.{WEBP_EXTENSION}")
}

/// Display name for an upload: the file name up to its first dot.
pub fn name_stem(original_name: &str) -> &str {
    original_name.split('.').next().unwrap_or(original_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_sanitizes_name() {
        assert_eq!(
            storage_key("blue shirt.JPG", 1_700_000_000_123),
            "1700000000123_blue_shirt_JPG.webp"
        );
        assert_eq!(storage_key("外套-1.png", 5), "5____1_png.webp");
        assert_eq!(storage_key("", 9), "9_.webp");
    }

    #[test]
    fn stem_stops_at_first_dot() {
        assert_eq!(name_stem("jacket.final.jpg"), "jacket");
        assert_eq!(name_stem("noext"), "noext");
        assert_eq!(name_stem(".hidden"), "");
    }
}
