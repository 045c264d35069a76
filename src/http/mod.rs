//! HTTP transport module
//!
//! The collaborator the pagers fetch pages through.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **OK codes**: Only accepted statuses (200/204 by default) reach a pager
//! - **Authentication**: Auth headers injected per request via `ServiceClient`

mod client;
mod service;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use service::{ServiceClient, Transport};
