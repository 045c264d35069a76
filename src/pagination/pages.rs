//! Page variants
//!
//! Each variant wraps one [`ResponseSnapshot`] and knows how to find the page
//! after it:
//! - [`SinglePage`]: the whole collection in one response
//! - [`LinkedPage`]: next URL in the body under `links.next`
//! - [`MarkerPage`]: next URL built by setting `?marker=` from the last element

use super::snapshot::{json_kind, ResponseSnapshot};
use super::types::{LastMark, Page};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::trace;
use url::Url;

/// Query parameter carrying the cursor for marker pagination
pub const MARKER_PARAM: &str = "marker";

// ============================================================================
// Single Page
// ============================================================================

/// A page that holds every result of an operation
#[derive(Debug, Clone)]
pub struct SinglePage {
    snapshot: ResponseSnapshot,
}

impl SinglePage {
    /// Wrap a snapshot
    pub fn new(snapshot: ResponseSnapshot) -> Self {
        Self { snapshot }
    }
}

impl Page for SinglePage {
    fn snapshot(&self) -> &ResponseSnapshot {
        &self.snapshot
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

// ============================================================================
// Linked Page
// ============================================================================

/// A page whose body links to the next one
///
/// Expected shape: `{"links": {"next": "https://..."}}`. `next` may be absent
/// or `null` on the last page; `links` itself must always be present. A
/// relative `next` is resolved against the URL this page was fetched from.
#[derive(Debug, Clone)]
pub struct LinkedPage {
    snapshot: ResponseSnapshot,
}

impl LinkedPage {
    /// Wrap a snapshot
    pub fn new(snapshot: ResponseSnapshot) -> Self {
        Self { snapshot }
    }
}

#[derive(Debug, Deserialize)]
struct Links {
    #[serde(default)]
    next: Option<String>,
}

impl Page for LinkedPage {
    fn snapshot(&self) -> &ResponseSnapshot {
        &self.snapshot
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        let body = self.snapshot.json_object()?;

        let links = body
            .get("links")
            .ok_or_else(|| Error::decode("missing 'links' in response"))?;
        if !links.is_object() {
            return Err(Error::decode(format!(
                "'links' is a {}, expected an object",
                json_kind(links)
            )));
        }

        let links = Links::deserialize(links)?;
        match links.next {
            Some(next) if !next.is_empty() => {
                let resolved = self.snapshot.request_url().join(&next).map_err(|e| {
                    Error::decode(format!("invalid 'links.next' '{next}': {e}"))
                })?;
                Ok(Some(resolved.into()))
            }
            other => Ok(other),
        }
    }
}

// ============================================================================
// Marker Page
// ============================================================================

/// A page in a collection paginated by `limit` and `marker` query parameters
#[derive(Clone)]
pub struct MarkerPage {
    snapshot: ResponseSnapshot,
    last_mark: LastMark,
}

impl MarkerPage {
    /// Wrap a snapshot with the extractor that finds its last marker
    pub fn new(snapshot: ResponseSnapshot, last_mark: LastMark) -> Self {
        Self {
            snapshot,
            last_mark,
        }
    }
}

impl Page for MarkerPage {
    fn snapshot(&self) -> &ResponseSnapshot {
        &self.snapshot
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        let mark = (self.last_mark)(self as &dyn Page)?;
        let next = with_query_param(self.snapshot.request_url(), MARKER_PARAM, &mark);
        trace!("Marker '{}' -> {}", mark, next);
        Ok(Some(next.into()))
    }
}

impl std::fmt::Debug for MarkerPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerPage")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

/// Copy of `url` with `key` set to `value`
///
/// Existing values for `key` are replaced. The query is re-encoded with keys
/// sorted; repeated values of other keys keep their order.
///
/// Values are `application/x-www-form-urlencoded`: spaces become `+`, and
/// only `*-._` and alphanumerics are left unescaped (`~` is written as `%7E`).
pub fn with_query_param(url: &Url, key: &str, value: &str) -> Url {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in url.query_pairs() {
        params.entry(k.into_owned()).or_default().push(v.into_owned());
    }
    params.insert(key.to_string(), vec![value.to_string()]);

    let mut next = url.clone();
    {
        let mut pairs = next.query_pairs_mut();
        pairs.clear();
        for (k, values) in &params {
            for v in values {
                pairs.append_pair(k, v);
            }
        }
    }
    next
}
