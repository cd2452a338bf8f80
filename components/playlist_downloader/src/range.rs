// components/playlist_downloader/src/range.rs
//! Index-window selection over a work list
//!
//! Callers give an inclusive `[start, end]` window. The end defaults to
//! "to the end of the list" and is clamped to the list length; a start past
//! the end of the list selects nothing. Only a negative start or an end that
//! lies before the start is rejected.

use crate::error::RangeError;
use crate::types::ItemRef;
use serde::Serialize;

/// Half-open window `[start, end_exclusive)` that is valid for its work list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: usize,
    pub end_exclusive: usize,
}

impl Range {
    pub fn len(&self) -> usize {
        self.end_exclusive - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sublist chosen for one run, with the numbers needed for reporting
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub range: Range,
    pub items: &'a [ItemRef],
    pub total_count: usize,
}

impl Selection<'_> {
    pub fn selected_count(&self) -> usize {
        self.items.len()
    }

    /// Whole list, used when no window was requested
    pub fn all(items: &[ItemRef]) -> Selection<'_> {
        Selection {
            range: Range {
                start: 0,
                end_exclusive: items.len(),
            },
            items,
            total_count: items.len(),
        }
    }
}

/// Select `work_list[start..=end]`, clamping `end` to the list
///
/// `start` defaults to 0 and `end` (inclusive) to the last index.
pub fn select(
    work_list: &[ItemRef],
    start: Option<i64>,
    end: Option<i64>,
) -> Result<Selection<'_>, RangeError> {
    let total_count = work_list.len();
    let start = start.unwrap_or(0);

    if start < 0 {
        return Err(RangeError::NegativeStart(start));
    }
    if let Some(end) = end {
        if end < start {
            return Err(RangeError::Inverted { start, end });
        }
    }

    // Non-negative and not beyond the list after this point
    let start = usize::try_from(start).unwrap_or(usize::MAX).min(total_count);
    let end_exclusive = match end {
        Some(end) => usize::try_from(end)
            .map(|end| end.saturating_add(1))
            .unwrap_or(usize::MAX)
            .min(total_count),
        None => total_count,
    }
    .max(start);

    let range = Range {
        start,
        end_exclusive,
    };
    Ok(Selection {
        range,
        items: &work_list[range.start..range.end_exclusive],
        total_count,
    })
}
