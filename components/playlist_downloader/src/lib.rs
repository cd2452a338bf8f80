// components/playlist_downloader/src/lib.rs
//! Batch downloading of playlist items into audio files
//!
//! A run reads a work list ([`read_work_list`] or [`resolve_work_list`]),
//! selects an index window ([`select`]) and hands it to a [`BatchScheduler`],
//! which pushes every item through the [`ItemPipeline`] and returns a
//! [`BatchReport`]. Item failures never abort a run.
//!
//! ```no_run
//! use playlist_downloader::{
//!     read_work_list, BatchOptions, BatchScheduler, Ffmpeg, PipelineConfig, YtDlp,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::new("./downloads");
//! let scheduler = BatchScheduler::new(
//!     Arc::new(YtDlp::new(config.output_dir.join(".scratch"))),
//!     Arc::new(Ffmpeg::new()),
//! );
//!
//! let items = read_work_list("playlist.txt").await?;
//! let report = scheduler
//!     .run_range(&items, Some(0), Some(9), &config, &BatchOptions::default())
//!     .await?;
//! println!("{} downloaded, {} failed", report.downloaded_count(), report.failure_count());
//! # Ok(())
//! # }
//! ```

mod collections;
mod error;
mod ffmpeg;
mod pipeline;
mod provider;
mod range;
mod report;
mod scheduler;
mod source;
mod types;
mod utils;
mod ytdlp;

pub use collections::OrderedSet;
pub use error::{BatchError, ItemError, RangeError, SourceError, ToolError};
pub use ffmpeg::Ffmpeg;
pub use pipeline::{Failure, ItemPipeline, PipelineConfig, PipelineResult, Success};
pub use provider::{PlaylistResolver, StreamProvider, Transcoder};
pub use range::{select, Range, Selection};
pub use report::{aggregate, BatchReport};
pub use scheduler::{BatchOptions, BatchProgress, BatchScheduler, ExecutionMode};
pub use source::{parse_work_list, read_work_list, read_work_list_with, resolve_work_list, write_work_list};
pub use types::{AudioQuality, ItemRef, MediaStream, TrackMetadata, VideoId, WorkList};
pub use utils::{extract_video_id, is_item_url, output_filename, sanitize_title, TARGET_EXTENSION};
pub use ytdlp::YtDlp;
