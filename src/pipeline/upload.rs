//! Sequential multi-file upload.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{info, warn};
use wardrobe_common::{Error, ItemId, Result};

use super::Wardrobe;
use crate::ai::ClothingAnalyzer;

/// A user-selected photo.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name, used for the storage key and the item name.
    pub name: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, naming it after its final path component.
    pub async fn read(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, data))
    }
}

/// Where one file is in the upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStage {
    Compressing,
    /// Compressed; `preview` is a local copy of the compressed image that is
    /// removed once the file is done.
    Uploading { preview: Option<PathBuf> },
    Analyzing,
    Persisted(ItemId),
    Failed(String),
}

impl UploadStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Persisted(_) | Self::Failed(_))
    }
}

/// Progress event passed to the batch callback.
#[derive(Debug, Clone)]
pub struct UploadProgress<'a> {
    /// 1-based position in the batch.
    pub index: usize,
    pub total: usize,
    pub file: &'a str,
    pub stage: UploadStage,
}

/// Result for one file of a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub file: String,
    /// Set once a record exists, even if a later stage failed.
    pub item_id: Option<ItemId>,
    pub error: Option<Error>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals for a finished batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    fn record(&mut self, outcome: FileOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl Wardrobe {
    /// Upload, analyze, and persist each file in order.
    ///
    /// Fails with `Error::Config` before the first file when no generation
    /// model is configured. Past that check, a failure at any stage is
    /// recorded for that file and the batch moves on. Files are handled
    /// strictly one after another.
    pub async fn upload_batch<F>(
        &self,
        files: Vec<UploadFile>,
        mut on_progress: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(&UploadProgress<'_>),
    {
        let analyzer = self.analyzer()?;
        let total = files.len();
        let mut report = BatchReport::default();

        for (i, file) in files.into_iter().enumerate() {
            let index = i + 1;
            let mut item_id = None;
            let mut emit = |stage: UploadStage| {
                on_progress(&UploadProgress {
                    index,
                    total,
                    file: &file.name,
                    stage,
                })
            };

            let result = self
                .process_file(analyzer, &file, &mut item_id, &mut emit)
                .await;
            let error = match result {
                Ok(id) => {
                    emit(UploadStage::Persisted(id));
                    None
                }
                Err(e) => {
                    warn!(file = %file.name, index, total, error = %e, "Upload failed");
                    emit(UploadStage::Failed(e.to_string()));
                    Some(e)
                }
            };

            report.record(FileOutcome {
                file: file.name,
                item_id,
                error,
            });
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "Upload batch finished"
        );
        Ok(report)
    }

    async fn process_file(
        &self,
        analyzer: &ClothingAnalyzer,
        file: &UploadFile,
        item_id: &mut Option<ItemId>,
        emit: &mut impl FnMut(UploadStage),
    ) -> Result<ItemId> {
        emit(UploadStage::Compressing);
        let image = self.compressor.compress(file.data.clone()).await?;

        // Removed when this function returns.
        let preview = image
            .write_preview()
            .map_err(|e| warn!(file = %file.name, error = %e, "Could not write preview"))
            .ok();
        emit(UploadStage::Uploading {
            preview: preview.as_ref().map(|p| p.to_path_buf()),
        });
        let id = self.gateway.store_item(&image, &file.name).await?;
        *item_id = Some(id.clone());

        emit(UploadStage::Analyzing);
        let analysis = analyzer.analyze(&image).await?;
        self.gateway.update_analysis(&id, &analysis).await?;

        Ok(id)
    }
}
