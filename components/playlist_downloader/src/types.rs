// components/playlist_downloader/src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tempfile::TempPath;
use tokio::io::AsyncRead;

/// A validated reference to one downloadable item (an item URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemRef(String);

impl ItemRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ItemRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Full ordered list of items for one run
pub type WorkList = Vec<ItemRef>;

/// Canonical 11 character video identifier extracted from an `ItemRef`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub const LEN: usize = 11;

    /// Accepts exactly `LEN` characters of `[A-Za-z0-9_-]`
    pub fn parse(candidate: &str) -> Option<Self> {
        let valid = candidate.len() == Self::LEN
            && candidate
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        valid.then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Watch URL handed to the external tools
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,

    /// Uploader or channel name, when the provider knows it
    pub author: Option<String>,

    /// Duration in seconds
    pub duration_seconds: Option<f64>,
}

/// Which audio rendition to fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    #[default]
    Highest,
    Lowest,
}

impl AudioQuality {
    /// yt-dlp format selector for this quality
    pub fn format_selector(&self) -> &'static str {
        match self {
            AudioQuality::Highest => "bestaudio",
            AudioQuality::Lowest => "worstaudio",
        }
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioQuality::Highest => write!(f, "highest"),
            AudioQuality::Lowest => write!(f, "lowest"),
        }
    }
}

impl FromStr for AudioQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "highest" | "best" => Ok(AudioQuality::Highest),
            "lowest" | "worst" => Ok(AudioQuality::Lowest),
            other => Err(format!("unknown quality '{other}', expected 'highest' or 'lowest'")),
        }
    }
}

/// Raw media bytes handed from a `StreamProvider` to a `Transcoder`
pub struct MediaStream {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    // Keeps a provider's scratch file alive until the stream is dropped
    _backing: Option<TempPath>,
}

impl MediaStream {
    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            _backing: None,
        }
    }

    /// Stream the contents of a temporary file, deleting it once consumed
    pub async fn from_temp_file(path: TempPath) -> std::io::Result<Self> {
        let file = tokio::fs::File::open(&path).await?;
        Ok(Self {
            reader: Box::new(file),
            _backing: Some(path),
        })
    }

    pub fn reader(&mut self) -> &mut (dyn AsyncRead + Send + Unpin) {
        self.reader.as_mut()
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("temp_backed", &self._backing.is_some())
            .finish()
    }
}
