// components/playlist_downloader/src/scheduler.rs
//! Batch scheduling over a selected range
//!
//! The selection is cut into consecutive chunks of `concurrency` items. All
//! items of a chunk run together and the scheduler waits for every one of them
//! before pausing for `delay` and moving on. With a concurrency of 1 this is
//! plain sequential processing with a pause between items. No pause follows
//! the last chunk.

use crate::error::{BatchError, ToolError};
use crate::pipeline::{ItemPipeline, PipelineConfig, PipelineResult};
use crate::provider::{StreamProvider, Transcoder};
use crate::range::{select, Selection};
use crate::report::{aggregate, BatchReport};
use crate::types::ItemRef;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

/// How many items run at once and how long to pause between units of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    pub concurrency: NonZeroUsize,
    pub delay: Duration,
}

impl BatchOptions {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(15_000);

    pub fn new(concurrency: NonZeroUsize, delay: Duration) -> Self {
        Self { concurrency, delay }
    }

    /// One item at a time
    pub fn sequential(delay: Duration) -> Self {
        Self::new(NonZeroUsize::MIN, delay)
    }

    pub fn mode(&self) -> ExecutionMode {
        match self.concurrency.get() {
            1 => ExecutionMode::Sequential,
            concurrency => ExecutionMode::Chunked { concurrency },
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::sequential(Self::DEFAULT_DELAY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    Chunked { concurrency: usize },
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Chunked { concurrency } => write!(f, "{concurrency} at a time"),
        }
    }
}

/// Progress feedback during a run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BatchProgress {
    RunStarted {
        selected_count: usize,
        total_count: usize,
        mode: ExecutionMode,
    },
    ChunkStarted {
        index: usize,
        chunk_count: usize,
        size: usize,
    },
    ItemFinished {
        completed: usize,
        selected_count: usize,
        result: PipelineResult,
    },
    Throttling {
        delay: Duration,
    },
    RunFinished {
        success_count: usize,
        failure_count: usize,
        elapsed: Duration,
    },
}

/// Drives the item pipeline over a selection
pub struct BatchScheduler {
    provider: Arc<dyn StreamProvider>,
    transcoder: Arc<dyn Transcoder>,
    progress: Option<mpsc::UnboundedSender<BatchProgress>>,
}

impl BatchScheduler {
    pub fn new(provider: Arc<dyn StreamProvider>, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            provider,
            transcoder,
            progress: None,
        }
    }

    /// Report progress events on `sender`
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<BatchProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Check that the provider and transcoder can run at all
    pub async fn check_available(&self) -> Result<(), ToolError> {
        self.provider.check_available().await?;
        self.transcoder.check_available().await
    }

    /// Select `[start, end]` from `work_list` and run it
    ///
    /// Range problems and an unusable output directory are returned before
    /// any item is processed; item failures end up in the report.
    pub async fn run_range(
        &self,
        work_list: &[ItemRef],
        start: Option<i64>,
        end: Option<i64>,
        config: &PipelineConfig,
        options: &BatchOptions,
    ) -> Result<BatchReport, BatchError> {
        let selection = select(work_list, start, end)?;

        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .map_err(|source| BatchError::OutputDir {
                path: config.output_dir.clone(),
                source,
            })?;

        Ok(self.run(&selection, config, options).await)
    }

    /// Run every item of `selection`; never fails as a whole
    pub async fn run(
        &self,
        selection: &Selection<'_>,
        config: &PipelineConfig,
        options: &BatchOptions,
    ) -> BatchReport {
        let started = Instant::now();
        let pipeline = ItemPipeline::new(self.provider.as_ref(), self.transcoder.as_ref());
        let selected_count = selection.selected_count();
        let chunks: Vec<&[ItemRef]> = selection.items.chunks(options.concurrency.get()).collect();

        info!(
            "Processing items {}..{} ({} of {}), {}, {:?} between {}",
            selection.range.start,
            selection.range.end_exclusive,
            selected_count,
            selection.total_count,
            options.mode(),
            options.delay,
            if options.mode() == ExecutionMode::Sequential { "items" } else { "chunks" },
        );
        self.emit(BatchProgress::RunStarted {
            selected_count,
            total_count: selection.total_count,
            mode: options.mode(),
        });

        let mut results = Vec::with_capacity(selected_count);
        for (index, chunk) in chunks.iter().enumerate() {
            debug!("Starting chunk {}/{} with {} items", index + 1, chunks.len(), chunk.len());
            self.emit(BatchProgress::ChunkStarted {
                index,
                chunk_count: chunks.len(),
                size: chunk.len(),
            });

            // Join barrier: the whole chunk finishes before anything else starts
            let mut in_flight: FuturesUnordered<_> = chunk
                .iter()
                .map(|item| pipeline.process(item, config))
                .collect();
            while let Some(result) = in_flight.next().await {
                if self.progress.is_some() {
                    self.emit(BatchProgress::ItemFinished {
                        completed: results.len() + 1,
                        selected_count,
                        result: result.clone(),
                    });
                }
                results.push(result);
            }

            let is_last = index + 1 == chunks.len();
            if !is_last && !options.delay.is_zero() {
                debug!("Waiting {:?} before continuing", options.delay);
                self.emit(BatchProgress::Throttling {
                    delay: options.delay,
                });
                tokio::time::sleep(options.delay).await;
            }
        }

        let report = aggregate(results)
            .with_total_count(selection.total_count)
            .with_elapsed(started.elapsed());

        info!(
            "Finished {} items in {:?}: {} succeeded, {} failed",
            report.selected_count,
            report.elapsed,
            report.success_count(),
            report.failure_count()
        );
        self.emit(BatchProgress::RunFinished {
            success_count: report.success_count(),
            failure_count: report.failure_count(),
            elapsed: report.elapsed,
        });
        report
    }

    fn emit(&self, event: BatchProgress) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is listening anymore
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RangeError;
    use crate::provider::stub::{StreamProviderStub, TranscoderStub};
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    const DELAY: Duration = Duration::from_secs(15);

    fn work_list(len: usize) -> Vec<ItemRef> {
        (0..len)
            .map(|i| ItemRef::new(format!("https://www.youtube.com/watch?v=item{i:07}")))
            .collect()
    }

    fn id(index: usize) -> String {
        format!("item{index:07}")
    }

    struct Harness {
        provider: Arc<StreamProviderStub>,
        transcoder: Arc<TranscoderStub>,
        temp_dir: TempDir,
        config: PipelineConfig,
    }

    impl Harness {
        fn new(provider: StreamProviderStub) -> Self {
            let temp_dir = TempDir::new().unwrap();
            let config = PipelineConfig::new(temp_dir.path());
            Self {
                provider: Arc::new(provider),
                transcoder: Arc::new(TranscoderStub::new()),
                temp_dir,
                config,
            }
        }

        fn scheduler(&self) -> BatchScheduler {
            BatchScheduler::new(self.provider.clone(), self.transcoder.clone())
        }
    }

    fn drain(mut receiver: mpsc::UnboundedReceiver<BatchProgress>) -> Vec<BatchProgress> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_run_continues_after_failure() {
        let harness = Harness::new(StreamProviderStub::new().failing_stream(&id(2)));
        let items = work_list(5);

        let report = harness
            .scheduler()
            .run(&Selection::all(&items), &harness.config, &BatchOptions::sequential(DELAY))
            .await;

        assert_eq!(report.selected_count, 5);
        assert_eq!(report.success_count(), 4);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].item, items[2]);
        assert!(report.failures[0].reason.starts_with("stream error:"));

        let fetched = harness.provider.stream_calls.lock().clone();
        assert_eq!(fetched, (0..5).map(id).collect::<Vec<_>>());

        let succeeded: Vec<&ItemRef> = report.successes.iter().map(|s| &s.item).collect();
        assert_eq!(succeeded, vec![&items[0], &items[1], &items[3], &items[4]]);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_run_pauses_between_items() {
        let harness = Harness::new(StreamProviderStub::new());
        let items = work_list(4);

        let report = harness
            .scheduler()
            .run(&Selection::all(&items), &harness.config, &BatchOptions::sequential(DELAY))
            .await;

        assert_eq!(report.success_count(), 4);
        assert!(report.elapsed >= DELAY * 3, "elapsed {:?}", report.elapsed);
        assert!(report.elapsed < DELAY * 4, "elapsed {:?}", report.elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn chunks_are_throttled_between_but_not_after() {
        let harness = Harness::new(StreamProviderStub::new());
        let (sender, receiver) = mpsc::unbounded_channel();
        let items = work_list(7);
        let options = BatchOptions::new(NonZeroUsize::new(3).unwrap(), DELAY);

        let report = harness
            .scheduler()
            .with_progress(sender)
            .run(&Selection::all(&items), &harness.config, &options)
            .await;

        let events = drain(receiver);
        let chunk_sizes: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                BatchProgress::ChunkStarted { size, .. } => Some(*size),
                _ => None,
            })
            .collect();
        let pauses = events
            .iter()
            .filter(|event| matches!(event, BatchProgress::Throttling { .. }))
            .count();

        assert_eq!(chunk_sizes, vec![3, 3, 1]);
        assert_eq!(pauses, 2);
        assert_eq!(report.success_count(), 7);
        assert!(report.elapsed >= DELAY * 2, "elapsed {:?}", report.elapsed);
        assert!(report.elapsed < DELAY * 3, "elapsed {:?}", report.elapsed);
        assert_matches!(events.last(), Some(BatchProgress::RunFinished { success_count: 7, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn chunk_items_run_concurrently() {
        let latency = Duration::from_secs(10);
        let harness = Harness::new(StreamProviderStub::new().with_latency(latency));
        let items = work_list(6);
        let options = BatchOptions::new(NonZeroUsize::new(3).unwrap(), Duration::ZERO);

        let report = harness
            .scheduler()
            .run(&Selection::all(&items), &harness.config, &options)
            .await;

        assert_eq!(report.success_count(), 6);
        // Two chunks of three items, each chunk waiting for one latency period
        assert!(report.elapsed >= latency * 2, "elapsed {:?}", report.elapsed);
        assert!(report.elapsed < latency * 3, "elapsed {:?}", report.elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn next_chunk_waits_for_whole_chunk() {
        let harness = Harness::new(StreamProviderStub::new().failing_stream(&id(1)));
        let (sender, receiver) = mpsc::unbounded_channel();
        let items = work_list(5);
        let options = BatchOptions::new(NonZeroUsize::new(2).unwrap(), DELAY);

        let report = harness
            .scheduler()
            .with_progress(sender)
            .run(&Selection::all(&items), &harness.config, &options)
            .await;

        // Every item of chunk N is finished before chunk N+1 starts
        let mut finished_in_chunk = 0;
        let mut expected_sizes = vec![2, 2, 1].into_iter();
        let mut current = 0;
        for event in drain(receiver) {
            match event {
                BatchProgress::ChunkStarted { size, .. } => {
                    assert_eq!(finished_in_chunk, current);
                    current = expected_sizes.next().unwrap();
                    assert_eq!(size, current);
                    finished_in_chunk = 0;
                }
                BatchProgress::ItemFinished { .. } => finished_in_chunk += 1,
                _ => {}
            }
        }
        assert_eq!(finished_in_chunk, current);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].item, items[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn run_range_processes_only_the_window() {
        let harness = Harness::new(StreamProviderStub::new());
        let items = work_list(6);

        let report = harness
            .scheduler()
            .run_range(&items, Some(1), Some(3), &harness.config, &BatchOptions::sequential(DELAY))
            .await
            .unwrap();

        assert_eq!(report.selected_count, 3);
        assert_eq!(report.total_count, 6);
        let fetched = harness.provider.stream_calls.lock().clone();
        assert_eq!(fetched, vec![id(1), id(2), id(3)]);
    }

    #[tokio::test]
    async fn inverted_range_fails_before_any_item() {
        let harness = Harness::new(StreamProviderStub::new());
        let items = work_list(6);

        let result = harness
            .scheduler()
            .run_range(&items, Some(2), Some(1), &harness.config, &BatchOptions::default())
            .await;

        assert_matches!(
            result,
            Err(BatchError::Range(RangeError::Inverted { start: 2, end: 1 }))
        );
        assert!(harness.provider.metadata_calls.lock().is_empty());
    }

    #[tokio::test]
    async fn negative_start_fails_before_any_item() {
        let harness = Harness::new(StreamProviderStub::new());
        let items = work_list(6);

        let result = harness
            .scheduler()
            .run_range(&items, Some(-1), None, &harness.config, &BatchOptions::default())
            .await;

        assert_matches!(result, Err(BatchError::Range(RangeError::NegativeStart(-1))));
        assert!(harness.provider.metadata_calls.lock().is_empty());
    }

    #[tokio::test]
    async fn unusable_output_dir_fails_before_any_item() {
        let mut harness = Harness::new(StreamProviderStub::new());
        let blocker = harness.temp_dir.path().join("not-a-directory");
        std::fs::write(&blocker, b"").unwrap();
        harness.config = PipelineConfig::new(&blocker);
        let items = work_list(3);

        let result = harness
            .scheduler()
            .run_range(&items, None, None, &harness.config, &BatchOptions::default())
            .await;

        assert_matches!(result, Err(BatchError::OutputDir { path, .. }) if path == blocker);
        assert!(harness.provider.metadata_calls.lock().is_empty());
        assert_eq!(harness.transcoder.encode_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn item_events_count_completed_items() {
        let harness = Harness::new(StreamProviderStub::new().failing_metadata(&id(1)));
        let (sender, receiver) = mpsc::unbounded_channel();
        let items = work_list(4);
        let options = BatchOptions::new(NonZeroUsize::new(2).unwrap(), DELAY);

        let report = harness
            .scheduler()
            .with_progress(sender)
            .run(&Selection::all(&items), &harness.config, &options)
            .await;

        let finished: Vec<(usize, bool)> = drain(receiver)
            .into_iter()
            .filter_map(|event| match event {
                BatchProgress::ItemFinished {
                    completed,
                    selected_count: 4,
                    result,
                } => Some((completed, result.is_success())),
                _ => None,
            })
            .collect();

        assert_eq!(
            finished.iter().map(|(completed, _)| *completed).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(finished.iter().filter(|(_, ok)| !ok).count(), 1);
        assert_eq!(report.selected_count, 4);
        assert_eq!(report.failure_count(), 1);
    }

    #[tokio::test]
    async fn start_beyond_list_runs_nothing() {
        let harness = Harness::new(StreamProviderStub::new());
        let items = work_list(3);

        let report = harness
            .scheduler()
            .run_range(&items, Some(10), None, &harness.config, &BatchOptions::default())
            .await
            .unwrap();

        assert_eq!(report.selected_count, 0);
        assert_eq!(report.total_count, 3);
        assert!(report.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn rerun_skips_everything_already_downloaded() {
        let harness = Harness::new(StreamProviderStub::new());
        let items = work_list(3);
        let scheduler = harness.scheduler();
        let options = BatchOptions::new(NonZeroUsize::new(3).unwrap(), DELAY);

        let first = scheduler.run(&Selection::all(&items), &harness.config, &options).await;
        let second = scheduler.run(&Selection::all(&items), &harness.config, &options).await;

        assert_eq!(first.downloaded_count(), 3);
        assert_eq!(second.skipped_count(), 3);
        assert_eq!(harness.provider.stream_call_count(), 3);
        assert_eq!(harness.transcoder.encode_count(), 3);
    }

    #[test]
    fn default_options() {
        let options = BatchOptions::default();
        assert_eq!(options.concurrency.get(), 1);
        assert_eq!(options.delay, Duration::from_millis(15_000));
        assert_eq!(options.mode(), ExecutionMode::Sequential);
        assert_eq!(
            BatchOptions::new(NonZeroUsize::new(4).unwrap(), DELAY).mode(),
            ExecutionMode::Chunked { concurrency: 4 }
        );
    }
}
