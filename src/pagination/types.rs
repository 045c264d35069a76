//! Pagination types and traits
//!
//! Defines the page capability and the collaborator shapes a [`Pager`]
//! is wired from.
//!
//! [`Pager`]: super::Pager

use super::snapshot::{json_kind, Body, ResponseSnapshot};
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

/// One fetched unit of a paginated collection
pub trait Page: Send + Sync {
    /// The response this page was built from
    fn snapshot(&self) -> &ResponseSnapshot;

    /// URL of the page that follows this one, or `None` when exhausted
    fn next_page_url(&self) -> Result<Option<String>>;
}

/// Counts the elements of a page; zero ends iteration
pub type PageCounter = Arc<dyn Fn(&dyn Page) -> Result<usize> + Send + Sync>;

/// Extracts the marker (cursor) value from a page
pub type LastMark = Arc<dyn Fn(&dyn Page) -> Result<String> + Send + Sync>;

/// Boxed future returned by closure-based fetchers
pub type PageFuture = BoxFuture<'static, Result<Box<dyn Page>>>;

/// Fetches the page at a URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch and wrap the page at `url`
    async fn fetch(&self, url: String) -> Result<Box<dyn Page>>;
}

/// Adapts a closure into a [`PageFetcher`]
pub(crate) struct FnFetcher<F>(pub(crate) F);

#[async_trait]
impl<F> PageFetcher for FnFetcher<F>
where
    F: Fn(String) -> PageFuture + Send + Sync,
{
    async fn fetch(&self, url: String) -> Result<Box<dyn Page>> {
        (self.0)(url).await
    }
}

// ============================================================================
// Common collaborators
// ============================================================================

/// Counter for bodies shaped like `{"<key>": [...]}`
///
/// An empty non-JSON body (e.g. `204 No Content`) counts as zero.
pub fn count_array(
    key: impl Into<String>,
) -> impl Fn(&dyn Page) -> Result<usize> + Send + Sync + 'static {
    let key = key.into();
    move |page: &dyn Page| {
        if let Body::Raw(raw) = page.snapshot().body() {
            if raw.is_empty() {
                return Ok(0);
            }
        }
        Ok(results_array(page, &key)?.len())
    }
}

/// Marker extractor returning `field` of the last element of `key`
pub fn last_field(
    key: impl Into<String>,
    field: impl Into<String>,
) -> impl Fn(&dyn Page) -> Result<String> + Send + Sync + 'static {
    let key = key.into();
    let field = field.into();
    move |page: &dyn Page| {
        let items = results_array(page, &key)?;
        let last = items
            .last()
            .ok_or_else(|| Error::extraction(format!("'{key}' has no elements")))?;

        match last.get(&field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(Error::extraction(format!(
                "'{field}' of last element is a {}",
                json_kind(other)
            ))),
            None => Err(Error::extraction(format!(
                "last element of '{key}' has no '{field}'"
            ))),
        }
    }
}

fn results_array<'a>(page: &'a dyn Page, key: &str) -> Result<&'a Vec<Value>> {
    let body = page.snapshot().json_object()?;
    match body.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(Error::decode(format!(
            "'{key}' is a {}, expected an array",
            json_kind(other)
        ))),
        None => Err(Error::decode(format!("missing '{key}' in response"))),
    }
}
