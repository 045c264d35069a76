//! Authentication module
//!
//! Supports: API Key, Basic, Bearer, OAuth2 client credentials, Custom Headers
//!
//! Auth is applied as a header map handed to the transport on every page
//! fetch. OAuth2 tokens are cached until they expire.

mod authenticator;
mod types;

pub use authenticator::{AuthProvider, Authenticator, NoAuth};
pub use types::{AuthConfig, CachedToken};
