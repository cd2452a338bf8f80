// bases/download_cli/src/app.rs
use crate::args::{Args, Command};
use crate::config::RunConfig;
use crate::output::OutputHandler;
use color_eyre::Result;
use playlist_downloader::{
    read_work_list, resolve_work_list, select, write_work_list, BatchReport, BatchScheduler,
    Ffmpeg, ItemRef, YtDlp,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

pub struct App {
    args: Args,
    output: OutputHandler,
}

impl App {
    pub fn new(args: Args) -> Self {
        let output = OutputHandler::new(args.verbose);
        Self { args, output }
    }

    pub async fn run(&self) -> Result<()> {
        match &self.args.command {
            Command::Download { list, batch } => {
                let config = RunConfig::from_args(batch);
                if !config.json {
                    self.output.print_list_start(list);
                }

                let items = read_work_list(list).await?;
                self.run_batch(&items, &config).await
            }
            Command::Playlist { url, save, batch } => {
                let config = RunConfig::from_args(batch);
                if !config.json {
                    self.output.print_playlist_start(url);
                }

                let resolver = YtDlp::new(config.scratch_dir());
                let items = resolve_work_list(&resolver, url).await?;
                if let Some(list) = save {
                    write_work_list(list, &items, url).await?;
                    if !config.json {
                        self.output.print_list_saved(list, items.len());
                    }
                }

                // Download from the resolved list in memory, not from the saved file
                self.run_batch(&items, &config).await
            }
            Command::FetchList { url, list } => {
                self.output.print_playlist_start(url);

                let resolver = YtDlp::new(std::env::temp_dir());
                let items = resolve_work_list(&resolver, url).await?;
                write_work_list(list, &items, url).await?;

                self.output.print_list_saved(list, items.len());
                Ok(())
            }
        }
    }

    async fn run_batch(&self, items: &[ItemRef], config: &RunConfig) -> Result<()> {
        // Reject a bad window before looking for external tools
        select(items, config.start, config.end)?;
        debug!("Run configuration: {:?}", config);

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let scheduler = build_scheduler(config).with_progress(sender);
        scheduler.check_available().await?;

        let output = self.output;
        let quiet = config.json;
        let printer = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                if !quiet {
                    output.print_progress(&event);
                }
            }
        });

        let report = scheduler
            .run_range(items, config.start, config.end, &config.pipeline, &config.options)
            .await;
        // Closing the channel lets the printer finish
        drop(scheduler);
        printer.await?;

        self.print_report(&report?, config)
    }

    fn print_report(&self, report: &BatchReport, config: &RunConfig) -> Result<()> {
        if config.json {
            self.output.print_json(report)?;
        } else {
            self.output.print_summary(report);
        }
        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}

fn build_scheduler(config: &RunConfig) -> BatchScheduler {
    BatchScheduler::new(
        Arc::new(YtDlp::new(config.scratch_dir())),
        Arc::new(Ffmpeg::new()),
    )
}
