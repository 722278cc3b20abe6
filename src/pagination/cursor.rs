//! Cursor strategy implementations
//!
//! Each strategy is a pure policy: given the page that was just fetched, it
//! rewrites the query parameters so the next fetch returns the following
//! page. No strategy performs I/O.

use super::pager::Params;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Computes the query parameters for the next page from the current one
pub trait Cursor<T>: Send + Sync {
    /// Update `params` in place so the next fetch returns the page after
    /// `page`. Called only with a non-empty `page`.
    fn advance(&self, params: &mut Params, page: &[T]);
}

/// Entities that can anchor an identifier cursor
pub trait IdAnchor {
    /// The opaque identifier the next-page parameter is set to
    fn anchor_id(&self) -> &str;
}

/// Entities that can anchor a timestamp cursor
pub trait TimeAnchor {
    /// The creation instant the next-page parameter is derived from
    fn anchor_time(&self) -> DateTime<Utc>;
}

// ============================================================================
// Page Number Cursor
// ============================================================================

/// Page-number pagination (`?page=2&per_page=10`)
///
/// Advances by exactly one page regardless of how many items the server
/// actually returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageCursor;

impl<T> Cursor<T> for PageCursor {
    fn advance(&self, params: &mut Params, _page: &[T]) {
        let page = params
            .get("page")
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(1);
        params.insert("page".to_string(), (page + 1).to_string());
    }
}

// ============================================================================
// Identifier Cursor
// ============================================================================

/// Listing direction for an identifier cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMode {
    /// Page backward through older items (`before_id`)
    Before,
    /// Page forward through newer items without gaps (`after_id`)
    After,
    /// Jump to the most recent items newer than a reference (`since_id`)
    Since,
}

impl IdMode {
    const PARAMS: [(&'static str, IdMode); 3] = [
        ("before_id", IdMode::Before),
        ("after_id", IdMode::After),
        ("since_id", IdMode::Since),
    ];

    /// Detect the mode from whichever cursor parameter was supplied.
    ///
    /// At most one of `before_id`, `after_id`, `since_id` may be present;
    /// none defaults to [`IdMode::Before`], matching the resource's natural
    /// newest-first ordering.
    pub fn detect(params: &Params) -> Result<Self> {
        detect_mode(params, &Self::PARAMS, IdMode::Before)
    }

    /// The wire name of this mode's query parameter
    pub fn param(self) -> &'static str {
        match self {
            IdMode::Before => "before_id",
            IdMode::After => "after_id",
            IdMode::Since => "since_id",
        }
    }

    /// Whether pages arrive newest-first in this mode.
    ///
    /// Only `after` paging is chronological; everything else returns the
    /// most recent item at index 0.
    pub fn newest_first(self) -> bool {
        !matches!(self, IdMode::After)
    }
}

/// Identifier-cursor pagination (`?before_id=...`)
#[derive(Debug, Clone, Copy)]
pub struct IdCursor {
    mode: IdMode,
}

impl IdCursor {
    /// Create a cursor with an explicit mode
    pub fn new(mode: IdMode) -> Self {
        Self { mode }
    }

    /// Detect the mode from the initial parameters
    pub fn detect(params: &Params) -> Result<Self> {
        Ok(Self {
            mode: IdMode::detect(params)?,
        })
    }

    /// The detected mode
    pub fn mode(&self) -> IdMode {
        self.mode
    }
}

impl<T: IdAnchor> Cursor<T> for IdCursor {
    fn advance(&self, params: &mut Params, page: &[T]) {
        let anchor = match self.mode {
            // `since` fetches items strictly newer than the reference, so
            // the anchor must be the newest item fetched; anchoring on the
            // trailing item would skip or loop.
            IdMode::Since => newest(page, self.mode.newest_first()),
            IdMode::Before | IdMode::After => page.last(),
        };
        if let Some(item) = anchor {
            params.insert(self.mode.param().to_string(), item.anchor_id().to_string());
        }
    }
}

// ============================================================================
// Timestamp Cursor
// ============================================================================

/// Listing direction for a timestamp cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeMode {
    /// Page backward through older items (`before`)
    Before,
    /// Page forward through newer items without gaps (`after`)
    After,
    /// Jump to the most recent items newer than a reference (`since`)
    Since,
}

impl TimeMode {
    const PARAMS: [(&'static str, TimeMode); 3] = [
        ("before", TimeMode::Before),
        ("after", TimeMode::After),
        ("since", TimeMode::Since),
    ];

    /// Detect the mode from whichever cursor parameter was supplied
    pub fn detect(params: &Params) -> Result<Self> {
        detect_mode(params, &Self::PARAMS, TimeMode::Before)
    }

    /// The wire name of this mode's query parameter
    pub fn param(self) -> &'static str {
        match self {
            TimeMode::Before => "before",
            TimeMode::After => "after",
            TimeMode::Since => "since",
        }
    }

    /// Whether pages arrive newest-first in this mode
    pub fn newest_first(self) -> bool {
        !matches!(self, TimeMode::After)
    }
}

/// Timestamp-cursor pagination (`?before=2021-01-02T03:04:05.006Z`)
#[derive(Debug, Clone, Copy)]
pub struct TimeCursor {
    mode: TimeMode,
}

impl TimeCursor {
    /// Create a cursor with an explicit mode
    pub fn new(mode: TimeMode) -> Self {
        Self { mode }
    }

    /// Detect the mode from the initial parameters
    pub fn detect(params: &Params) -> Result<Self> {
        Ok(Self {
            mode: TimeMode::detect(params)?,
        })
    }

    /// The detected mode
    pub fn mode(&self) -> TimeMode {
        self.mode
    }
}

impl<T: TimeAnchor> Cursor<T> for TimeCursor {
    fn advance(&self, params: &mut Params, page: &[T]) {
        let anchor = match self.mode {
            TimeMode::Since => newest(page, self.mode.newest_first()),
            TimeMode::Before | TimeMode::After => page.last(),
        };
        if let Some(item) = anchor {
            params.insert(
                self.mode.param().to_string(),
                format_timestamp(item.anchor_time()),
            );
        }
    }
}

/// Encode an instant in the API's wire format: RFC3339 with millisecond
/// precision and a literal `Z` suffix.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

// ============================================================================
// Helpers
// ============================================================================

/// Pick the newest item of a page given its ordering direction
fn newest<T>(page: &[T], newest_first: bool) -> Option<&T> {
    if newest_first {
        page.first()
    } else {
        page.last()
    }
}

fn detect_mode<M: Copy>(params: &Params, names: &[(&'static str, M)], default: M) -> Result<M> {
    let supplied: Vec<(&'static str, M)> = names
        .iter()
        .filter(|(name, _)| params.contains_key(*name))
        .copied()
        .collect();

    match supplied.as_slice() {
        [] => Ok(default),
        [(_, mode)] => Ok(*mode),
        many => Err(Error::ambiguous_cursor(
            &many.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
        )),
    }
}
