// components/playlist_downloader/src/pipeline.rs
//! Single-item download pipeline
//!
//! id extraction -> metadata -> filename -> existing output check ->
//! stream fetch -> transcode. Every step can end the item as a `Failure`;
//! nothing here returns an error to the caller.

use crate::error::ItemError;
use crate::provider::{StreamProvider, Transcoder};
use crate::types::{AudioQuality, ItemRef, TrackMetadata};
use crate::utils::{extract_video_id, output_filename};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Per-call pipeline settings; holds no state between items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory that receives the produced files
    pub output_dir: PathBuf,

    /// Audio rendition to fetch
    pub quality: AudioQuality,
}

impl PipelineConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            quality: AudioQuality::default(),
        }
    }

    pub fn with_quality(mut self, quality: AudioQuality) -> Self {
        self.quality = quality;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new("./downloads")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Success {
    pub item: ItemRef,
    pub output_filename: PathBuf,
    pub output_path: PathBuf,
    pub metadata: TrackMetadata,

    /// The output already existed; nothing was fetched or encoded
    pub skipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub item: ItemRef,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PipelineResult {
    Success(Success),
    Failure(Failure),
}

impl PipelineResult {
    pub fn item(&self) -> &ItemRef {
        match self {
            PipelineResult::Success(success) => &success.item,
            PipelineResult::Failure(failure) => &failure.item,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success(_))
    }
}

/// Runs one item through the provider and transcoder
pub struct ItemPipeline<'a> {
    provider: &'a dyn StreamProvider,
    transcoder: &'a dyn Transcoder,
}

impl<'a> ItemPipeline<'a> {
    pub fn new(provider: &'a dyn StreamProvider, transcoder: &'a dyn Transcoder) -> Self {
        Self {
            provider,
            transcoder,
        }
    }

    pub async fn process(&self, item: &ItemRef, config: &PipelineConfig) -> PipelineResult {
        match self.try_process(item, config).await {
            Ok(success) => {
                if success.skipped {
                    info!("Skipping {}: {} already exists", item, success.output_path.display());
                } else {
                    info!("Downloaded {} to {}", item, success.output_path.display());
                }
                PipelineResult::Success(success)
            }
            Err(error) => {
                warn!("Failed {}: {}", item, error);
                PipelineResult::Failure(Failure {
                    item: item.clone(),
                    reason: error.to_string(),
                })
            }
        }
    }

    async fn try_process(
        &self,
        item: &ItemRef,
        config: &PipelineConfig,
    ) -> Result<Success, ItemError> {
        let id = extract_video_id(item).ok_or(ItemError::InvalidReference)?;

        let metadata = self
            .provider
            .fetch_metadata(&id)
            .await
            .map_err(ItemError::Metadata)?;

        let filename = output_filename(&metadata.title, &id);
        let output_path = config.output_dir.join(&filename);

        // Not atomic with the write below: two items resolving to the same
        // filename in one chunk can both get past this check
        let exists = tokio::fs::try_exists(&output_path).await?;
        if !exists {
            let stream = self
                .provider
                .fetch_stream(&id, config.quality)
                .await
                .map_err(ItemError::Stream)?;
            self.transcoder
                .encode(stream, &output_path)
                .await
                .map_err(ItemError::Encode)?;
        }

        Ok(Success {
            item: item.clone(),
            output_filename: filename,
            output_path,
            metadata,
            skipped: exists,
        })
    }
}
