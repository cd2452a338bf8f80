// bases/download_cli/src/config.rs
use crate::args::BatchArgs;
use playlist_downloader::{BatchOptions, PipelineConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Everything a batch run needs, converted from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pipeline: PipelineConfig,
    pub options: BatchOptions,

    /// First index to process (inclusive)
    pub start: Option<i64>,

    /// Last index to process (inclusive), `None` for the end of the list
    pub end: Option<i64>,

    /// Print the report as JSON instead of a summary
    pub json: bool,
}

impl RunConfig {
    pub fn from_args(args: &BatchArgs) -> Self {
        Self {
            pipeline: PipelineConfig::new(&args.output_dir).with_quality(args.quality),
            options: BatchOptions::new(args.concurrency, Duration::from_millis(args.delay_ms)),
            start: Some(args.start),
            end: args.end,
            json: args.json,
        }
    }

    /// Where yt-dlp stages streams before they are encoded
    pub fn scratch_dir(&self) -> PathBuf {
        self.pipeline.output_dir.join("temp")
    }
}
