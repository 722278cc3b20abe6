//! Pagination module
//!
//! Supports: page-number, message-ID, and timestamp cursors
//!
//! # Overview
//!
//! List endpoints return one page per fetch and an **empty page is the only
//! end-of-data signal**; a non-empty page says nothing about whether the
//! next one is empty. [`Pager`] drives repeated fetches through an injected
//! fetch callable, while a [`Cursor`] strategy computes the parameters that
//! request the page after the current one.

mod cursor;
mod pager;

pub use cursor::{
    format_timestamp, Cursor, IdAnchor, IdCursor, IdMode, PageCursor, TimeAnchor, TimeCursor,
    TimeMode,
};
pub use pager::{FetchFn, Pager, Params};
