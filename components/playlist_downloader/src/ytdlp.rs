// components/playlist_downloader/src/ytdlp.rs
use crate::collections::OrderedSet;
use crate::error::ToolError;
use crate::provider::{PlaylistResolver, StreamProvider};
use crate::types::{AudioQuality, ItemRef, MediaStream, TrackMetadata, VideoId};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

const YT_DLP: &str = "yt-dlp";

/// `StreamProvider` and `PlaylistResolver` backed by the yt-dlp binary
///
/// Streams are downloaded into `scratch_dir` and handed over as temporary
/// files that disappear once the transcoder has consumed them.
pub struct YtDlp {
    scratch_dir: PathBuf,
}

impl YtDlp {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Output, ToolError> {
        debug!("Running {} {}", YT_DLP, args.join(" "));
        let output = Command::new(YT_DLP)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ToolError::CommandFailed {
                command: YT_DLP,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

fn check_binary(name: &'static str) -> Result<(), ToolError> {
    which::which(name)
        .map(|_| ())
        .map_err(|_| ToolError::DependencyNotFound(name))
}

#[async_trait]
impl StreamProvider for YtDlp {
    async fn check_available(&self) -> Result<(), ToolError> {
        check_binary(YT_DLP)
    }

    async fn fetch_metadata(&self, id: &VideoId) -> Result<TrackMetadata, ToolError> {
        let url = id.watch_url();
        let output = self
            .run(&["--dump-json", "--no-download", "--no-playlist", url.as_str()])
            .await?;
        parse_metadata(&output.stdout)
    }

    async fn fetch_stream(
        &self,
        id: &VideoId,
        quality: AudioQuality,
    ) -> Result<MediaStream, ToolError> {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let temp_path = tempfile::Builder::new()
            .prefix(id.as_str())
            .suffix(".part")
            .tempfile_in(&self.scratch_dir)?
            .into_temp_path();
        let target = path_arg(&temp_path)?;
        let url = id.watch_url();

        self.run(&[
            "--format",
            quality.format_selector(),
            "--no-playlist",
            "--no-part",
            "--force-overwrites",
            "--quiet",
            "--output",
            target,
            url.as_str(),
        ])
        .await?;

        Ok(MediaStream::from_temp_file(temp_path).await?)
    }
}

#[async_trait]
impl PlaylistResolver for YtDlp {
    async fn resolve(&self, playlist_url: &str) -> Result<Vec<ItemRef>, ToolError> {
        let output = self
            .run(&["--flat-playlist", "--dump-single-json", playlist_url])
            .await?;
        parse_playlist(&output.stdout)
    }
}

fn path_arg(path: &Path) -> Result<&str, ToolError> {
    path.to_str().ok_or_else(|| {
        ToolError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("path is not valid UTF-8: {}", path.display()),
        ))
    })
}

#[derive(Debug, Deserialize)]
struct YtDlpMetadata {
    title: String,
    uploader: Option<String>,
    channel: Option<String>,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YtDlpPlaylist {
    #[serde(default)]
    entries: Vec<YtDlpPlaylistEntry>,
}

#[derive(Debug, Deserialize)]
struct YtDlpPlaylistEntry {
    id: Option<String>,
    url: Option<String>,
}

fn parse_metadata(json: &[u8]) -> Result<TrackMetadata, ToolError> {
    let meta: YtDlpMetadata = serde_json::from_slice(json).map_err(|source| {
        ToolError::InvalidResponse {
            command: YT_DLP,
            source,
        }
    })?;

    Ok(TrackMetadata {
        title: meta.title,
        author: meta.uploader.or(meta.channel),
        duration_seconds: meta.duration,
    })
}

/// Entries are reduced to watch URLs; repeated videos keep their first position
fn parse_playlist(json: &[u8]) -> Result<Vec<ItemRef>, ToolError> {
    let playlist: YtDlpPlaylist = serde_json::from_slice(json).map_err(|source| {
        ToolError::InvalidResponse {
            command: YT_DLP,
            source,
        }
    })?;

    let items: OrderedSet<ItemRef> = playlist
        .entries
        .into_iter()
        .filter_map(|entry| {
            let id = entry.id.as_deref().and_then(VideoId::parse).or_else(|| {
                entry
                    .url
                    .as_deref()
                    .and_then(|url| crate::utils::extract_video_id(&ItemRef::from(url)))
            })?;
            Some(ItemRef::new(id.watch_url()))
        })
        .collect();

    Ok(items.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_metadata_dump() {
        let json = br#"{
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "uploader": "Rick Astley",
            "duration": 212.0,
            "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        }"#;

        let metadata = parse_metadata(json).unwrap();

        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.author.as_deref(), Some("Rick Astley"));
        assert_eq!(metadata.duration_seconds, Some(212.0));
    }

    #[test]
    fn metadata_falls_back_to_channel() {
        let json = br#"{"title": "Live set", "channel": "Some Channel"}"#;

        let metadata = parse_metadata(json).unwrap();

        assert_eq!(metadata.author.as_deref(), Some("Some Channel"));
        assert_eq!(metadata.duration_seconds, None);
    }

    #[test]
    fn invalid_metadata_is_reported() {
        assert_matches!(
            parse_metadata(b"not json"),
            Err(ToolError::InvalidResponse { command: "yt-dlp", .. })
        );
    }

    #[test]
    fn playlist_entries_are_deduplicated_in_order() {
        let json = br#"{
            "_type": "playlist",
            "entries": [
                {"id": "BBBBBBBBBBB", "url": "https://www.youtube.com/watch?v=BBBBBBBBBBB"},
                {"id": null, "url": "https://youtu.be/AAAAAAAAAAA"},
                {"id": "BBBBBBBBBBB"},
                {"id": "bad", "url": "https://example.com/nothing"}
            ]
        }"#;

        let items = parse_playlist(json).unwrap();

        assert_eq!(
            items,
            vec![
                ItemRef::from("https://www.youtube.com/watch?v=BBBBBBBBBBB"),
                ItemRef::from("https://www.youtube.com/watch?v=AAAAAAAAAAA"),
            ]
        );
    }

    #[test]
    fn playlist_without_entries_is_empty() {
        assert!(parse_playlist(br#"{"_type": "playlist"}"#).unwrap().is_empty());
    }
}
