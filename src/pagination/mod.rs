//! Pagination module
//!
//! Supports: Single page, Linked (`links.next`), Marker (`?marker=`)
//!
//! # Overview
//!
//! Every fetched response is captured in a [`ResponseSnapshot`] and wrapped in
//! a [`Page`] variant that knows how to reach the next page. A [`Pager`] drives
//! the traversal and hands each non-empty page to a caller-supplied handler,
//! so callers walk a collection without knowing which strategy backs it.

mod pager;
mod pages;
mod snapshot;
mod strategies;
mod types;

pub use pager::Pager;
pub use pages::{with_query_param, LinkedPage, MarkerPage, SinglePage, MARKER_PARAM};
pub use snapshot::{Body, ResponseSnapshot};
pub use strategies::{LinkedFetcher, MarkerFetcher, SingleFetcher};
pub use types::{
    count_array, last_field, LastMark, Page, PageCounter, PageFetcher, PageFuture,
};

#[cfg(test)]
mod tests;
