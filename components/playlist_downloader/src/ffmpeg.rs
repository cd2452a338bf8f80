// components/playlist_downloader/src/ffmpeg.rs
use crate::error::ToolError;
use crate::provider::Transcoder;
use crate::types::MediaStream;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

const FFMPEG: &str = "ffmpeg";

/// `Transcoder` that pipes the stream through ffmpeg into mp3
///
/// ffmpeg writes into a temporary file next to the output, which is renamed
/// into place only after a clean exit.
pub struct Ffmpeg {
    bitrate: String,
}

impl Ffmpeg {
    pub fn new() -> Self {
        Self::with_bitrate("192k")
    }

    pub fn with_bitrate(bitrate: impl Into<String>) -> Self {
        Self {
            bitrate: bitrate.into(),
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcoder for Ffmpeg {
    async fn check_available(&self) -> Result<(), ToolError> {
        which::which(FFMPEG)
            .map(|_| ())
            .map_err(|_| ToolError::DependencyNotFound(FFMPEG))
    }

    async fn encode(&self, mut stream: MediaStream, output: &Path) -> Result<(), ToolError> {
        let output_dir = output.parent().unwrap_or_else(|| Path::new("."));
        // Dropping the temp file on any early return removes the partial output
        let staging = tempfile::Builder::new()
            .prefix(".encoding-")
            .suffix(".mp3")
            .tempfile_in(output_dir)?
            .into_temp_path();

        debug!("Encoding {} via {}", output.display(), staging.display());
        let mut child = Command::new(FFMPEG)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i", "pipe:0", "-vn"])
            .args(["-codec:a", "libmp3lame", "-b:a", self.bitrate.as_str(), "-f", "mp3"])
            .arg(staging.as_os_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child.stdin.take().ok_or_else(|| ToolError::CommandFailed {
            command: FFMPEG,
            stderr: "stdin was not captured".to_string(),
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| ToolError::CommandFailed {
            command: FFMPEG,
            stderr: "stderr was not captured".to_string(),
        })?;

        let feed = async move {
            let copied = tokio::io::copy(stream.reader(), &mut stdin).await;
            // Closing stdin signals end of input to ffmpeg
            drop(stdin);
            copied
        };
        let drain = async move {
            let mut buffer = String::new();
            stderr.read_to_string(&mut buffer).await.map(|_| buffer)
        };
        let (fed, diagnostics) = tokio::join!(feed, drain);
        let status = child.wait().await?;

        if !status.success() {
            return Err(ToolError::CommandFailed {
                command: FFMPEG,
                stderr: diagnostics.unwrap_or_default().trim().to_string(),
            });
        }
        // ffmpeg may exit cleanly after closing its input early; that still
        // means the stream was not fully encoded
        fed?;

        staging.persist(output).map_err(|e| ToolError::Io(e.error))?;
        Ok(())
    }
}
