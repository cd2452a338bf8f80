// components/playlist_downloader/src/provider.rs
use crate::error::ToolError;
use crate::types::{AudioQuality, ItemRef, MediaStream, TrackMetadata, VideoId};
use async_trait::async_trait;
use std::path::Path;

/// Source of item metadata and raw media
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Check if the provider has all required dependencies
    async fn check_available(&self) -> Result<(), ToolError>;

    /// Fetch metadata about an item without downloading it
    async fn fetch_metadata(&self, id: &VideoId) -> Result<TrackMetadata, ToolError>;

    /// Fetch the raw media stream at the requested quality
    async fn fetch_stream(
        &self,
        id: &VideoId,
        quality: AudioQuality,
    ) -> Result<MediaStream, ToolError>;
}

/// Converts a raw media stream into the target audio format
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn check_available(&self) -> Result<(), ToolError>;

    /// Encode `stream` into `output`
    ///
    /// Must not leave a file at `output` unless encoding succeeded.
    async fn encode(&self, stream: MediaStream, output: &Path) -> Result<(), ToolError>;
}

/// Turns a playlist URL into its ordered item references
#[async_trait]
pub trait PlaylistResolver: Send + Sync {
    async fn resolve(&self, playlist_url: &str) -> Result<Vec<ItemRef>, ToolError>;
}
