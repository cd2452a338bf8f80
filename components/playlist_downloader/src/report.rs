// components/playlist_downloader/src/report.rs
use crate::pipeline::{Failure, PipelineResult, Success};
use serde::Serialize;
use std::time::Duration;

/// Outcome of one batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub successes: Vec<Success>,
    pub failures: Vec<Failure>,

    /// Number of items in the selected range
    pub selected_count: usize,

    /// Number of items in the whole work list
    pub total_count: usize,

    pub elapsed: Duration,
}

/// Group results by outcome
///
/// Order within each group follows the order of `results`. The total count
/// defaults to the number of results until the caller says otherwise.
pub fn aggregate(results: impl IntoIterator<Item = PipelineResult>) -> BatchReport {
    let mut report = BatchReport::default();
    for result in results {
        report.selected_count += 1;
        match result {
            PipelineResult::Success(success) => report.successes.push(success),
            PipelineResult::Failure(failure) => report.failures.push(failure),
        }
    }
    report.total_count = report.selected_count;
    report
}

impl BatchReport {
    pub fn with_total_count(mut self, total_count: usize) -> Self {
        self.total_count = total_count;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Items fetched and encoded during this run
    pub fn downloaded_count(&self) -> usize {
        self.successes.iter().filter(|s| !s.skipped).count()
    }

    /// Items whose output already existed
    pub fn skipped_count(&self) -> usize {
        self.successes.iter().filter(|s| s.skipped).count()
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// True when no selected item failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
