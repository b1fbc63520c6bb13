// crates/dataset-registry-core/src/runtime/pagination.rs
// ============================================================================
// Module: Pagination
// Description: Offset/limit slicing with resumable cursors.
// Purpose: Page through the global id space and per-owner id sequences.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Two stateless pagination strategies share one cursor rule. The global
//! identifier space is contiguous (`1..=counter`), so its pages are derived
//! arithmetically with no lookup. Owner sequences are sliced directly. Limits
//! above the configured maximum page size are clamped silently rather than
//! rejected. The cursor is the offset of the next unread element, present
//! only while elements remain.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::DatasetId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum page size.
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 50;
/// Upper bound accepted for a configured maximum page size.
pub const MAX_PAGE_SIZE_LIMIT: u64 = 1_000;

// ============================================================================
// SECTION: Page
// ============================================================================

/// One page of results plus the cursor to resume from.
///
/// # Invariants
/// - `next_offset` is `None` once the final element has been returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in source order.
    pub items: Vec<T>,
    /// Offset to pass to the next call, if any elements remain.
    pub next_offset: Option<u64>,
}

impl<T> Page<T> {
    /// Returns an empty page with no cursor.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_offset: None,
        }
    }
}

// ============================================================================
// SECTION: Algorithms
// ============================================================================

/// Returns up to `limit` elements of `sequence` starting at `offset`.
#[must_use]
pub fn slice<T: Clone>(sequence: &[T], offset: u64, limit: u64) -> Vec<T> {
    let start = usize::try_from(offset).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    sequence.iter().skip(start).take(take).cloned().collect()
}

/// Returns the cursor following a page of `returned` items at `offset`.
#[must_use]
pub const fn next_cursor(offset: u64, returned: u64, total: u64) -> Option<u64> {
    let next = offset.saturating_add(returned);
    if next < total { Some(next) } else { None }
}

/// Pages the contiguous identifier space `1..=counter`.
#[must_use]
pub fn page_id_range(counter: u64, offset: u64, limit: u64, max_page_size: u64) -> Page<DatasetId> {
    if counter == 0 || offset >= counter {
        return Page::empty();
    }
    let effective_limit = limit.min(max_page_size);
    let end = offset.saturating_add(effective_limit).min(counter);
    let items: Vec<DatasetId> =
        (offset.saturating_add(1) ..= end).filter_map(DatasetId::from_raw).collect();
    Page {
        next_offset: next_cursor(offset, end - offset, counter),
        items,
    }
}

/// Pages an arbitrary bounded sequence.
#[must_use]
pub fn page_sequence<T: Clone>(
    sequence: &[T],
    offset: u64,
    limit: u64,
    max_page_size: u64,
) -> Page<T> {
    let total = u64::try_from(sequence.len()).unwrap_or(u64::MAX);
    if offset >= total {
        return Page::empty();
    }
    let items = slice(sequence, offset, limit.min(max_page_size));
    let returned = u64::try_from(items.len()).unwrap_or(u64::MAX);
    Page {
        next_offset: next_cursor(offset, returned, total),
        items,
    }
}
