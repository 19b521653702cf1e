//! Orchestrates user actions over the compressor, storage gateway, and
//! generation clients.
//!
//! Upload: `compressing -> uploading -> analyzing -> persisted | failed`, one
//! file at a time (see [`upload`]).
//!
//! Recommendation: `fetching-catalog -> requesting -> rendering | failed`.
//! Errors in the recommendation flow propagate to the caller unchanged.
//!
//! Only storage credentials are needed to open a [`Wardrobe`]. Actions that
//! call the generation endpoint check for its key before doing anything else.

mod upload;

pub use upload::{BatchReport, FileOutcome, UploadFile, UploadProgress, UploadStage};

use std::sync::Arc;

use tracing::{debug, info};
use wardrobe_common::{ClothingAnalysis, Error, ItemId, ItemStatus, Result, WardrobeItem};

use crate::ai::{ClothingAnalyzer, GeminiClient, GenerativeModel, OutfitAdvisor, OutfitRequest};
use crate::compress::{ImageCompressor, WEBP_MIME};
use crate::config::{Config, MISSING_GEMINI_KEY};
use crate::render::{render_catalog, render_outfit, CatalogCard, OutfitView};
use crate::storage::{StorageGateway, SupabaseBackend};

/// The wardrobe application: every user action is a method here.
#[derive(Clone)]
pub struct Wardrobe {
    gateway: StorageGateway,
    compressor: ImageCompressor,
    analyzer: Option<ClothingAnalyzer>,
    advisor: Option<OutfitAdvisor>,
}

impl std::fmt::Debug for Wardrobe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wardrobe")
            .field("compressor", &self.compressor)
            .finish_non_exhaustive()
    }
}

impl Wardrobe {
    /// Wire the components around one generation model.
    pub fn new(
        gateway: StorageGateway,
        compressor: ImageCompressor,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        Self {
            gateway,
            compressor,
            analyzer: Some(ClothingAnalyzer::new(model.clone())),
            advisor: Some(OutfitAdvisor::new(model)),
        }
    }

    /// Catalog access only. Upload, recommend and reanalyze fail with
    /// [`Error::Config`].
    pub fn storage_only(gateway: StorageGateway, compressor: ImageCompressor) -> Self {
        Self {
            gateway,
            compressor,
            analyzer: None,
            advisor: None,
        }
    }

    /// Build against the hosted services named in `config`.
    ///
    /// Fails with [`Error::Config`] when the storage URL or key is missing.
    /// A missing generation key is reported later, by the actions that need
    /// it. No request is made.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (url, key) = config.credentials.require_storage()?;

        let backend = Arc::new(SupabaseBackend::new(url, key, &config.storage));
        let gateway =
            StorageGateway::from_backend(backend).with_recent_limit(config.storage.recent_limit);
        let compressor = ImageCompressor::from_config(&config.compression);

        Ok(match config.credentials.require_vision() {
            Ok(gemini_key) => Self::new(
                gateway,
                compressor,
                Arc::new(GeminiClient::new(gemini_key, &config.gemini)),
            ),
            Err(_) => {
                debug!("No generation key configured, catalog access only");
                Self::storage_only(gateway, compressor)
            }
        })
    }

    pub fn gateway(&self) -> &StorageGateway {
        &self.gateway
    }

    /// Fails with [`Error::Config`] unless a generation model is wired in.
    pub fn require_vision(&self) -> Result<()> {
        self.analyzer().map(|_| ())
    }

    fn analyzer(&self) -> Result<&ClothingAnalyzer> {
        self.analyzer
            .as_ref()
            .ok_or_else(|| Error::config(MISSING_GEMINI_KEY))
    }

    fn advisor(&self) -> Result<&OutfitAdvisor> {
        self.advisor
            .as_ref()
            .ok_or_else(|| Error::config(MISSING_GEMINI_KEY))
    }

    /// Catalog view: newest items first.
    pub async fn catalog(&self) -> Result<Vec<CatalogCard>> {
        let items = self.gateway.list_recent().await?;
        Ok(render_catalog(&items))
    }

    /// Ask for an outfit for `request` and resolve it against the catalog.
    pub async fn recommend(&self, request: &OutfitRequest) -> Result<OutfitView> {
        let advisor = self.advisor()?;

        info!(stage = "fetching-catalog", "Recommendation");
        let items = self.gateway.list_available().await?;
        if items.is_empty() {
            return Err(Error::EmptyWardrobe);
        }

        info!(
            stage = "requesting",
            candidates = items.len(),
            occasion = %request.occasion,
            weather = %request.weather,
            "Recommendation"
        );
        let recommendation = advisor.recommend(request, &items).await?;

        info!(stage = "rendering", "Recommendation");
        Ok(render_outfit(&recommendation, &items))
    }

    /// Look up one item.
    pub async fn item(&self, id: &ItemId) -> Result<WardrobeItem> {
        self.gateway.get_item(id).await
    }

    /// Run analysis again for an item stuck in `processing`.
    ///
    /// The stored image is downloaded from its public URL. Items that are
    /// already `available` are rejected with [`Error::Update`].
    pub async fn reanalyze(&self, id: &ItemId) -> Result<ClothingAnalysis> {
        let analyzer = self.analyzer()?;
        let item = self.gateway.get_item(id).await?;
        if item.status == ItemStatus::Available {
            return Err(Error::Update(format!("item {id} is already available")));
        }

        info!(id = %id, "Re-analyzing item");
        let data = self.gateway.download_image(&item.image_path).await?;
        let analysis = analyzer.analyze_bytes(&data, WEBP_MIME).await?;
        self.gateway.update_analysis(id, &analysis).await?;
        Ok(analysis)
    }

    /// Delete an item's record.
    pub async fn remove(&self, id: &ItemId) -> Result<()> {
        self.gateway.remove_item(id).await
    }
}
