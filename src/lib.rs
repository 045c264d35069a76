// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]

//! # pagekit
//!
//! A generic pagination engine for paged HTTP/JSON collection APIs.
//! Callers walk an arbitrarily large remote collection one page at a time
//! without knowing which pagination strategy the backend uses.
//!
//! ## Features
//!
//! - **Single page**: the whole collection in one response
//! - **Linked pages**: follow `links.next` in each JSON body
//! - **Marker pages**: `?limit=&marker=` cursors derived from the last element
//! - **Early stop**: handlers return `false` to end iteration
//! - **Pluggable transport and auth**: retrying reqwest client, OAuth2, API keys
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagekit::auth::{AuthConfig, Authenticator};
//! use pagekit::http::{HttpClient, HttpClientConfig, ServiceClient};
//! use pagekit::pagination::{count_array, last_field, Pager};
//!
//! #[tokio::main]
//! async fn main() -> pagekit::Result<()> {
//!     let transport = HttpClient::with_config(
//!         HttpClientConfig::builder()
//!             .base_url("https://compute.example.com/v2")
//!             .build(),
//!     )?;
//!     let client = ServiceClient::new(transport, Authenticator::new(AuthConfig::bearer("token")));
//!
//!     let pager = Pager::marker(
//!         client,
//!         "/servers?limit=100",
//!         last_field("servers", "id"),
//!         count_array("servers"),
//!     );
//!
//!     pager
//!         .each_page(|page| {
//!             println!("{}", page.snapshot().request_url());
//!             Ok(true)
//!         })
//!         .await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Pager::each_page(handler)                                   │
//! │  fetch → count → handler → next_page_url → fetch ...         │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴───────────┬────────────────────┐
//! │   Pages      │   Snapshot               │   Transport        │
//! ├──────────────┼──────────────────────────┼────────────────────┤
//! │ Single       │ request URL              │ ServiceClient      │
//! │ Linked       │ headers                  │ HttpClient (retry) │
//! │ Marker       │ JSON / raw body          │ Authenticator      │
//! └──────────────┴──────────────────────────┴────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication providers
pub mod auth;

/// HTTP transport with retry
pub mod http;

/// Pages, pagers and response snapshots
pub mod pagination;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use pagination::{Body, LinkedPage, MarkerPage, Page, Pager, ResponseSnapshot, SinglePage};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
