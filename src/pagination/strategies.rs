//! Pager constructors for the built-in strategies
//!
//! Each strategy is a [`PageFetcher`] that GETs through a [`ServiceClient`]
//! and wraps the response in the matching page variant. Nothing is fetched
//! until the pager is first driven.

use super::pager::Pager;
use super::pages::{LinkedPage, MarkerPage, SinglePage};
use super::types::{LastMark, Page, PageFetcher};
use crate::error::{Error, Result};
use crate::http::ServiceClient;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Single Page
// ============================================================================

/// Fetches one URL exactly once
///
/// Any fetch after the first returns [`Error::PageUnavailable`]. The flag is
/// never reset, so a single-page pager yields its page once in its lifetime.
pub struct SingleFetcher {
    client: ServiceClient,
    only_url: String,
    consumed: AtomicBool,
}

impl SingleFetcher {
    /// Create a fetcher for `only_url`
    pub fn new(client: ServiceClient, only_url: impl Into<String>) -> Self {
        Self {
            client,
            only_url: only_url.into(),
            consumed: AtomicBool::new(false),
        }
    }

    /// Whether the page has been requested
    pub fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for SingleFetcher {
    async fn fetch(&self, _url: String) -> Result<Box<dyn Page>> {
        if self.consumed.swap(true, Ordering::SeqCst) {
            return Err(Error::PageUnavailable);
        }

        let snapshot = self.client.fetch_snapshot(&self.only_url).await?;
        Ok(Box::new(SinglePage::new(snapshot)))
    }
}

// ============================================================================
// Linked Pages
// ============================================================================

/// Fetches pages that link to their successor
pub struct LinkedFetcher {
    client: ServiceClient,
}

impl LinkedFetcher {
    /// Create a linked-page fetcher
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for LinkedFetcher {
    async fn fetch(&self, url: String) -> Result<Box<dyn Page>> {
        let snapshot = self.client.fetch_snapshot(&url).await?;
        Ok(Box::new(LinkedPage::new(snapshot)))
    }
}

// ============================================================================
// Marker Pages
// ============================================================================

/// Fetches marker-paginated pages, handing each the shared extractor
pub struct MarkerFetcher {
    client: ServiceClient,
    last_mark: LastMark,
}

impl MarkerFetcher {
    /// Create a marker-page fetcher
    pub fn new(client: ServiceClient, last_mark: LastMark) -> Self {
        Self { client, last_mark }
    }
}

#[async_trait]
impl PageFetcher for MarkerFetcher {
    async fn fetch(&self, url: String) -> Result<Box<dyn Page>> {
        let snapshot = self.client.fetch_snapshot(&url).await?;
        Ok(Box::new(MarkerPage::new(
            snapshot,
            Arc::clone(&self.last_mark),
        )))
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Pager {
    /// Pager that "iterates" over a single page fetched from `only_url`
    pub fn single<C>(client: ServiceClient, only_url: impl Into<String>, count: C) -> Self
    where
        C: Fn(&dyn Page) -> Result<usize> + Send + Sync + 'static,
    {
        Self::with_fetcher(String::new(), SingleFetcher::new(client, only_url), count)
    }

    /// Pager following the `links.next` element of each JSON response
    pub fn linked<C>(client: ServiceClient, initial_url: impl Into<String>, count: C) -> Self
    where
        C: Fn(&dyn Page) -> Result<usize> + Send + Sync + 'static,
    {
        Self::with_fetcher(initial_url, LinkedFetcher::new(client), count)
    }

    /// Pager issuing each request with `marker` set to the last element of
    /// the previous page
    pub fn marker<M, C>(
        client: ServiceClient,
        initial_url: impl Into<String>,
        last_mark: M,
        count: C,
    ) -> Self
    where
        M: Fn(&dyn Page) -> Result<String> + Send + Sync + 'static,
        C: Fn(&dyn Page) -> Result<usize> + Send + Sync + 'static,
    {
        Self::with_fetcher(
            initial_url,
            MarkerFetcher::new(client, Arc::new(last_mark)),
            count,
        )
    }
}
