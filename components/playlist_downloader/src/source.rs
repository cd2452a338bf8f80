// components/playlist_downloader/src/source.rs
//! Persisted item lists
//!
//! One item reference per line. Blank lines, `#` comments and lines the
//! validity predicate does not recognize are skipped. Order is preserved.

use crate::collections::OrderedSet;
use crate::error::SourceError;
use crate::provider::PlaylistResolver;
use crate::types::{ItemRef, WorkList};
use crate::utils::is_item_url;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

const COMMENT_MARKER: char = '#';

/// Read a work list, keeping lines recognized by [`is_item_url`]
pub async fn read_work_list(path: impl AsRef<Path>) -> Result<WorkList, SourceError> {
    read_work_list_with(path, is_item_url).await
}

/// Read a work list with a caller supplied validity predicate
pub async fn read_work_list_with<F>(
    path: impl AsRef<Path>,
    is_item: F,
) -> Result<WorkList, SourceError>
where
    F: Fn(&str) -> bool,
{
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => SourceError::NotFound {
            path: path.to_owned(),
        },
        _ => SourceError::io(path, e),
    })?;

    let items = parse_work_list(&content, is_item);
    if items.is_empty() {
        return Err(SourceError::Empty {
            path: path.to_owned(),
        });
    }

    info!("Read {} items from {}", items.len(), path.display());
    Ok(items)
}

/// Parse list content; never fails, an empty result is the caller's concern
pub fn parse_work_list<F>(content: &str, is_item: F) -> WorkList
where
    F: Fn(&str) -> bool,
{
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .filter(|line| {
            let keep = is_item(*line);
            if !keep {
                debug!("Ignoring unrecognized line: {}", line);
            }
            keep
        })
        .map(ItemRef::from)
        .collect()
}

/// Build a work list from a playlist, dropping repeated entries
pub async fn resolve_work_list(
    resolver: &dyn PlaylistResolver,
    playlist_url: &str,
) -> Result<WorkList, SourceError> {
    let resolved = resolver
        .resolve(playlist_url)
        .await
        .map_err(|source| SourceError::Resolve {
            url: playlist_url.to_string(),
            source,
        })?;

    let items: OrderedSet<ItemRef> = resolved
        .into_iter()
        .filter(|item| is_item_url(item.as_str()))
        .collect();
    if items.is_empty() {
        return Err(SourceError::EmptyPlaylist {
            url: playlist_url.to_string(),
        });
    }

    info!("Resolved {} items from {}", items.len(), playlist_url);
    Ok(items.into_vec())
}

/// Persist a work list so later runs can pick up from it
pub async fn write_work_list(
    path: impl AsRef<Path>,
    items: &[ItemRef],
    origin: &str,
) -> Result<(), SourceError> {
    let path = path.as_ref();
    let mut content = format!("{COMMENT_MARKER} {origin}\n");
    for item in items {
        content.push_str(item.as_str());
        content.push('\n');
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SourceError::io(parent, e))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| SourceError::io(path, e))?;

    info!("Wrote {} items to {}", items.len(), path.display());
    Ok(())
}
