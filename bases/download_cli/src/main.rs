// bases/download_cli/src/main.rs
mod app;
mod args;
mod config;
mod output;

use app::App;
use args::Args;
use clap::Parser;
use color_eyre::Result;

/// Log filter used when `RUST_LOG` is not set; the library's per-item lines
/// would repeat the progress output, so it only reports warnings by default
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "download_cli=debug,playlist_downloader=debug"
    } else {
        "download_cli=info,playlist_downloader=warn"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(args.verbose).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::new(args);

    if let Err(error) = app.run().await {
        app.print_error(&error);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn default_filters_parse() {
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(default_filter(verbose)).is_ok());
        }
    }

    #[test]
    fn library_is_quiet_unless_verbose() {
        assert!(default_filter(false).contains("playlist_downloader=warn"));
        assert!(default_filter(true).contains("playlist_downloader=debug"));
    }
}
