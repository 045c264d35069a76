//! Authenticator implementation
//!
//! Turns an [`AuthConfig`] into the headers attached to every page request,
//! caching OAuth2 tokens until they expire.

use super::types::{AuthConfig, CachedToken};
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Supplies the auth headers injected into each page fetch
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Headers to send with the next request
    async fn authenticated_headers(&self) -> Result<HeaderMap>;
}

/// Provider for endpoints that need no credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl AuthProvider for NoAuth {
    async fn authenticated_headers(&self) -> Result<HeaderMap> {
        Ok(HeaderMap::new())
    }
}

/// Authenticator builds auth headers from an [`AuthConfig`]
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached token for OAuth2 auth
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Build the headers for the configured auth type
    pub async fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        match &self.config {
            AuthConfig::None => {}

            AuthConfig::ApiKey {
                header_name,
                prefix,
                value,
            } => {
                let name = header_name.as_deref().unwrap_or("Authorization");
                let value = format!("{}{}", prefix.as_deref().unwrap_or(""), value);
                insert_header(&mut headers, name, &value)?;
            }

            AuthConfig::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                headers.insert(AUTHORIZATION, header_value(&format!("Basic {encoded}"))?);
            }

            AuthConfig::Bearer { token } => {
                headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
            }

            AuthConfig::Oauth2ClientCredentials { .. } => {
                let token = self.get_or_refresh_token().await?;
                headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
            }

            AuthConfig::CustomHeaders { headers: custom } => {
                for (name, value) in custom {
                    insert_header(&mut headers, name, value)?;
                }
            }
        }

        Ok(headers)
    }

    /// Get a valid token, refreshing if necessary
    async fn get_or_refresh_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_client_credentials_token().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Fetch OAuth2 token using client credentials flow
    async fn fetch_client_credentials_token(&self) -> Result<CachedToken> {
        let AuthConfig::Oauth2ClientCredentials {
            token_url,
            client_id,
            client_secret,
            scopes,
        } = &self.config
        else {
            return Err(Error::auth(
                "Token refresh not supported for this auth type",
            ));
        };

        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", client_id.clone()),
            ("client_secret", client_secret.clone()),
        ];
        if !scopes.is_empty() {
            form.push(("scope", scopes.join(" ")));
        }

        debug!("Requesting OAuth2 token from {}", token_url);
        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::OAuth2 {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        Ok(token_response.into_cached_token())
    }

    /// Clear the cached token (forces a refresh on the next request)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

#[async_trait]
impl AuthProvider for Authenticator {
    async fn authenticated_headers(&self) -> Result<HeaderMap> {
        self.headers().await
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::auth(format!("Invalid header value: {e}")))
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::auth(format!("Invalid header name '{name}': {e}")))?;
    headers.insert(name, header_value(value)?);
    Ok(())
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        match self.expires_in {
            Some(secs) => CachedToken::expires_in(self.access_token, secs),
            None => CachedToken::new(self.access_token, None),
        }
    }
}
