//! Authenticated service client
//!
//! Pairs a [`Transport`] with an [`AuthProvider`] so every page fetch is a
//! single authenticated GET.

use crate::auth::{AuthProvider, NoAuth};
use crate::error::Result;
use crate::pagination::ResponseSnapshot;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Response;
use std::sync::Arc;
use url::Url;

/// Performs one GET per call
///
/// Status handling belongs to the implementation: a response is only returned
/// when its status was accepted as success.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Turn a page URL (absolute or relative) into the URL that will be requested
    fn resolve(&self, url: &str) -> Result<Url>;

    /// Send a GET with the given headers
    async fn get(&self, url: &Url, headers: HeaderMap) -> Result<Response>;
}

/// Transport plus credentials for one remote service
#[derive(Clone)]
pub struct ServiceClient {
    transport: Arc<dyn Transport>,
    provider: Arc<dyn AuthProvider>,
}

impl ServiceClient {
    /// Create a client from a transport and an auth provider
    pub fn new(transport: impl Transport + 'static, provider: impl AuthProvider + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            provider: Arc::new(provider),
        }
    }

    /// Create a client that sends no auth headers
    pub fn unauthenticated(transport: impl Transport + 'static) -> Self {
        Self::new(transport, NoAuth)
    }

    /// Perform an authenticated GET, returning the requested URL with the response
    pub async fn request(&self, url: &str) -> Result<(Url, Response)> {
        let resolved = self.transport.resolve(url)?;
        let headers = self.provider.authenticated_headers().await?;
        let response = self.transport.get(&resolved, headers).await?;
        Ok((resolved, response))
    }

    /// Perform an authenticated GET and capture the response
    pub async fn fetch_snapshot(&self, url: &str) -> Result<ResponseSnapshot> {
        let (requested, response) = self.request(url).await?;
        ResponseSnapshot::from_response(requested, response).await
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient").finish_non_exhaustive()
    }
}
