// bases/download_cli/src/args.rs
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};
use playlist_downloader::AudioQuality;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Download the audio of playlist items in throttled batches
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the items listed in a file (one URL per line, `#` comments)
    Download {
        /// Item list to read
        list: PathBuf,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Resolve a playlist and download its items
    Playlist {
        /// Playlist URL
        url: String,

        /// Also write the resolved items to this list file
        #[arg(long)]
        save: Option<PathBuf>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Resolve a playlist and write its items to a list file without downloading
    FetchList {
        /// Playlist URL
        url: String,

        /// List file to write
        list: PathBuf,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct BatchArgs {
    /// Directory to store downloaded files
    #[arg(short, long, default_value = "./downloads")]
    pub output_dir: PathBuf,

    /// Number of items downloaded at the same time
    #[arg(short, long, default_value_t = NonZeroUsize::MIN)]
    pub concurrency: NonZeroUsize,

    /// Pause between items (or between batches of concurrent items) in milliseconds
    #[arg(short, long, default_value_t = 15_000)]
    pub delay_ms: u64,

    /// First index to process (0-based, inclusive)
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub start: i64,

    /// Last index to process (inclusive); defaults to the end of the list
    #[arg(short, long, allow_negative_numbers = true)]
    pub end: Option<i64>,

    /// Audio quality to fetch
    #[arg(
        short,
        long,
        default_value_t = AudioQuality::Highest,
        ignore_case = true,
        value_parser = quality_parser()
    )]
    pub quality: AudioQuality,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

fn quality_parser() -> impl TypedValueParser<Value = AudioQuality> {
    PossibleValuesParser::new(["highest", "best", "lowest", "worst"])
        .try_map(|name| name.parse::<AudioQuality>())
}
