// components/playlist_downloader/src/utils.rs
use crate::types::{ItemRef, VideoId};
use std::path::PathBuf;
use url::Url;

/// Extension of every file the pipeline produces
pub const TARGET_EXTENSION: &str = "mp3";

const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Path segments that are followed by the id, e.g. `/shorts/<id>`
const ID_PATH_PREFIXES: &[&str] = &["shorts", "embed", "v", "live"];

/// Host whose first path segment is the id
const SHORT_LINK_HOST: &str = "youtu.be";

/// Remove filesystem-unsafe characters and collapse runs of whitespace
pub fn sanitize_title(title: &str) -> String {
    title
        .replace(UNSAFE_CHARS, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Output filename for an item; falls back to the id when the title sanitizes to nothing
pub fn output_filename(title: &str, id: &VideoId) -> PathBuf {
    let stem = match sanitize_title(title) {
        stem if stem.is_empty() => id.to_string(),
        stem => stem,
    };
    PathBuf::from(format!("{stem}.{TARGET_EXTENSION}"))
}

/// Extract the canonical id from the recognized URL shapes:
/// `youtu.be/<id>`, `watch?v=<id>`, `/shorts/<id>`, `/embed/<id>`, `/v/<id>`, `/live/<id>`
///
/// An unusable `v` parameter does not hide an id carried in the path.
pub fn extract_video_id(item: &ItemRef) -> Option<VideoId> {
    let url = Url::parse(item.as_str()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if url.host_str().is_some_and(is_short_link_host) {
        return segments.first().and_then(|s| VideoId::parse(s));
    }

    let from_query = url
        .query_pairs()
        .filter(|(key, _)| key == "v")
        .find_map(|(_, v)| VideoId::parse(&v));
    if from_query.is_some() {
        return from_query;
    }

    segments
        .windows(2)
        .find(|pair| ID_PATH_PREFIXES.contains(&pair[0]))
        .and_then(|pair| VideoId::parse(pair[1]))
}

fn is_short_link_host(host: &str) -> bool {
    host == SHORT_LINK_HOST || host.ends_with(&format!(".{SHORT_LINK_HOST}"))
}

/// Default validity predicate for item lists: an http(s) URL with an extractable id
pub fn is_item_url(line: &str) -> bool {
    extract_video_id(&ItemRef::from(line)).is_some()
}
