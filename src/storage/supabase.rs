//! Hosted backend: Supabase Storage for images, PostgREST for the `items` table.
//!
//! Every request carries the project key both as `apikey` and as a bearer
//! token. Writes ask for `Prefer: return=representation` so the affected rows
//! come back and a write that matched nothing can be told apart from one that
//! succeeded.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;
use wardrobe_common::{
    AnalysisUpdate, AvailableItem, Error, ItemId, ItemStatus, NewItem, Result, WardrobeItem,
};

use super::{ItemStore, ObjectStorage};
use crate::config::StorageConfig;

const AVAILABLE_COLUMNS: &str = "id,name,ai_data,image_path";
const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: ItemId,
}

/// Client for one Supabase project.
pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
    table: String,
    cache_control: String,
}

impl SupabaseBackend {
    /// Create a backend for the project at `base_url`.
    pub fn new(base_url: &str, api_key: &str, config: &StorageConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: config.bucket.clone(),
            table: config.table.clone(),
            cache_control: config.cache_control.clone(),
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    /// GET rows from the table with PostgREST query parameters.
    async fn select<T>(&self, params: &[(&str, String)]) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = self.table_url();
        debug!(url = %url, ?params, "Selecting items");

        let resp = self
            .authed(self.client.get(&url))
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let resp = check(resp).await.map_err(Error::Fetch)?;
        resp.json()
            .await
            .map_err(|e| Error::Fetch(format!("unexpected response shape: {e}")))
    }
}

/// Turn a non-success response into `"<status>: <body>"`.
async fn check(resp: Response) -> std::result::Result<Response, String> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(format!("{status}: {body}"))
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl ObjectStorage for SupabaseBackend {
    async fn upload(&self, key: &str, payload: Bytes, content_type: &str) -> Result<()> {
        let url = self.object_url(key);
        debug!(url = %url, bytes = payload.len(), "Uploading image");

        let resp = self
            .authed(self.client.post(&url))
            .header("content-type", content_type)
            .header("cache-control", format!("max-age={}", self.cache_control))
            .header("x-upsert", "false")
            .body(payload)
            .send()
            .await
            .map_err(|e| Error::Upload(e.to_string()))?;

        check(resp).await.map_err(Error::Upload)?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }

    async fn download(&self, url: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("downloading {url}: {e}")))?;
        let resp = check(resp).await.map_err(Error::Fetch)?;
        resp.bytes()
            .await
            .map_err(|e| Error::Fetch(format!("reading {url}: {e}")))
    }
}

#[async_trait]
impl ItemStore for SupabaseBackend {
    async fn insert(&self, item: &NewItem) -> Result<ItemId> {
        let url = self.table_url();
        let resp = self
            .authed(self.client.post(&url))
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[("select", "id")])
            .json(&[item])
            .send()
            .await
            .map_err(|e| Error::Insert(e.to_string()))?;

        let resp = check(resp).await.map_err(Error::Insert)?;
        let rows: Vec<InsertedRow> = resp
            .json()
            .await
            .map_err(|e| Error::Insert(format!("unexpected response shape: {e}")))?;

        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| Error::Insert("no row returned".to_string()))
    }

    async fn update_analysis(&self, id: &ItemId, update: &AnalysisUpdate) -> Result<()> {
        let url = self.table_url();
        let resp = self
            .authed(self.client.patch(&url))
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[("id", eq(id)), ("select", "id".to_string())])
            .json(update)
            .send()
            .await
            .map_err(|e| Error::Update(e.to_string()))?;

        let resp = check(resp).await.map_err(Error::Update)?;
        let rows: Vec<InsertedRow> = resp
            .json()
            .await
            .map_err(|e| Error::Update(format!("unexpected response shape: {e}")))?;

        if rows.is_empty() {
            return Err(Error::Update(format!("no item with id {id}")));
        }
        Ok(())
    }

    async fn get(&self, id: &ItemId) -> Result<Option<WardrobeItem>> {
        let rows: Vec<WardrobeItem> = self
            .select(&[
                ("select", "*".to_string()),
                ("id", eq(id)),
                ("limit", "1".to_string()),
            ])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<WardrobeItem>> {
        self.select(&[
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ])
        .await
    }

    async fn list_available(&self) -> Result<Vec<AvailableItem>> {
        self.select(&[
            ("select", AVAILABLE_COLUMNS.to_string()),
            ("status", eq(ItemStatus::Available)),
        ])
        .await
    }

    async fn delete(&self, id: &ItemId) -> Result<()> {
        let url = self.table_url();
        let resp = self
            .authed(self.client.delete(&url))
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[("id", eq(id)), ("select", "id".to_string())])
            .send()
            .await
            .map_err(|e| Error::Delete(e.to_string()))?;

        let resp = check(resp).await.map_err(Error::Delete)?;
        let rows: Vec<InsertedRow> = resp
            .json()
            .await
            .map_err(|e| Error::Delete(format!("unexpected response shape: {e}")))?;

        if rows.is_empty() {
            return Err(Error::not_found(id.to_string()));
        }
        Ok(())
    }
}
