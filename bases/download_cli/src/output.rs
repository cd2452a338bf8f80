// bases/download_cli/src/output.rs
use playlist_downloader::{BatchProgress, BatchReport, PipelineResult};
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_list_start(&self, list: &Path) {
        println!("Reading items from: {}", list.display());
    }

    pub fn print_playlist_start(&self, url: &str) {
        println!("Resolving playlist: {}", url);
    }

    pub fn print_list_saved(&self, list: &Path, count: usize) {
        println!("Saved {} items to {}", count, list.display());
    }

    pub fn print_progress(&self, event: &BatchProgress) {
        match event {
            BatchProgress::RunStarted {
                selected_count,
                total_count,
                mode,
            } => {
                println!("Processing {} of {} items ({})", selected_count, total_count, mode);
            }
            BatchProgress::ChunkStarted {
                index,
                chunk_count,
                size,
            } if self.verbose && *chunk_count > 1 => {
                println!("Batch {}/{} ({} items)", index + 1, chunk_count, size);
            }
            BatchProgress::ItemFinished {
                completed,
                selected_count,
                result,
            } => {
                let prefix = format!("[{}/{}]", completed, selected_count);
                match result {
                    PipelineResult::Success(success) if success.skipped => {
                        println!("{} Skipped (exists): {}", prefix, success.output_filename.display());
                    }
                    PipelineResult::Success(success) => {
                        println!("{} Downloaded: {}", prefix, success.output_filename.display());
                        if self.verbose {
                            if let Some(author) = &success.metadata.author {
                                println!("      Author: {}", author);
                            }
                            if let Some(duration) = success.metadata.duration_seconds {
                                println!("      Duration: {:.1} seconds", duration);
                            }
                            println!("      Source: {}", success.item);
                        }
                    }
                    PipelineResult::Failure(failure) => {
                        println!("{} Failed: {} ({})", prefix, failure.item, failure.reason);
                    }
                }
            }
            BatchProgress::Throttling { delay } if self.verbose => {
                println!("Waiting {:.1}s before continuing...", delay.as_secs_f64());
            }
            _ => {}
        }
    }

    pub fn print_summary(&self, report: &BatchReport) {
        println!("\n{}", "=".repeat(60));
        println!("DOWNLOAD SUMMARY");
        println!("{}", "=".repeat(60));
        println!("  Selected:    {} of {}", report.selected_count, report.total_count);
        println!("  Downloaded:  {}", report.downloaded_count());
        println!("  Skipped:     {}", report.skipped_count());
        println!("  Failed:      {}", report.failure_count());
        println!("  Elapsed:     {:.1}s", report.elapsed.as_secs_f64());

        if !report.failures.is_empty() {
            println!("\nFailures:");
            for failure in &report.failures {
                println!("  {}: {}", failure.item, failure.reason);
            }
        }
    }

    pub fn print_json(&self, report: &BatchReport) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(report)?);
        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}
