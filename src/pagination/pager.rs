//! The iteration driver
//!
//! A [`Pager`] repeatedly fetches pages starting from its initial URL:
//!
//! ```text
//! fetch(url) -> count(page) -> handler(page) -> page.next_page_url() -> fetch(...)
//! ```
//!
//! Iteration stops on the first error, a page counted as empty, a handler
//! returning `false`, or a page with no successor.

use super::snapshot::ResponseSnapshot;
use super::types::{FnFetcher, Page, PageCounter, PageFetcher, PageFuture};
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use std::sync::Arc;
use tracing::debug;

/// Knows how to advance through one resource collection, a page at a time
#[derive(Clone)]
pub struct Pager {
    initial_url: String,
    fetcher: Arc<dyn PageFetcher>,
    counter: PageCounter,
    max_pages: Option<usize>,
}

impl Pager {
    /// Create a manually configured pager
    ///
    /// `fetch` requests the page at a URL and `count` reports how many
    /// elements a page holds.
    pub fn new<F, C>(initial_url: impl Into<String>, fetch: F, count: C) -> Self
    where
        F: Fn(String) -> PageFuture + Send + Sync + 'static,
        C: Fn(&dyn Page) -> Result<usize> + Send + Sync + 'static,
    {
        Self::with_fetcher(initial_url, FnFetcher(fetch), count)
    }

    /// Create a pager around any [`PageFetcher`]
    pub fn with_fetcher<C>(
        initial_url: impl Into<String>,
        fetcher: impl PageFetcher + 'static,
        count: C,
    ) -> Self
    where
        C: Fn(&dyn Page) -> Result<usize> + Send + Sync + 'static,
    {
        Self {
            initial_url: initial_url.into(),
            fetcher: Arc::new(fetcher),
            counter: Arc::new(count),
            max_pages: None,
        }
    }

    /// Fail with [`Error::PageLimitExceeded`] instead of fetching more than `limit` pages
    ///
    /// Pagers are unbounded unless this is set.
    #[must_use]
    pub fn with_max_pages(mut self, limit: usize) -> Self {
        self.max_pages = Some(limit);
        self
    }

    /// URL of the first page
    pub fn initial_url(&self) -> &str {
        &self.initial_url
    }

    /// Page limit, if one was set
    pub fn max_pages(&self) -> Option<usize> {
        self.max_pages
    }

    /// Yield each page to `handler`, one at a time
    ///
    /// Return `Ok(false)` from the handler to stop early. Every error, from a
    /// collaborator or the handler, ends iteration and is returned unchanged.
    pub async fn each_page<F>(&self, mut handler: F) -> Result<()>
    where
        F: FnMut(&dyn Page) -> Result<bool>,
    {
        let mut current_url = self.initial_url.clone();
        let mut fetched = 0usize;

        loop {
            if let Some(limit) = self.max_pages {
                if fetched >= limit {
                    return Err(Error::PageLimitExceeded { limit });
                }
            }

            debug!("Fetching page {} from '{}'", fetched + 1, current_url);
            let page = self.fetcher.fetch(current_url).await?;
            fetched += 1;

            let count = (self.counter)(page.as_ref())?;
            if count == 0 {
                debug!("Page {} is empty, stopping", fetched);
                return Ok(());
            }

            if !handler(page.as_ref())? {
                debug!("Handler stopped iteration after page {}", fetched);
                return Ok(());
            }

            match page.next_page_url()?.none_if_empty() {
                Some(next) => current_url = next,
                None => {
                    debug!("No page after page {}, done", fetched);
                    return Ok(());
                }
            }
        }
    }

    /// Collect the snapshot of every page in the collection
    pub async fn all_pages(&self) -> Result<Vec<ResponseSnapshot>> {
        let mut pages = Vec::new();
        self.each_page(|page| {
            pages.push(page.snapshot().clone());
            Ok(true)
        })
        .await?;
        Ok(pages)
    }
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("initial_url", &self.initial_url)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}
