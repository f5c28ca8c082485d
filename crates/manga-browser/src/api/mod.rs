//! Jikan API v4 access.
//!
//! A transport seam over the HTTP client, the response types, and the
//! rate-limit retry policy applied to every page request.

pub mod client;
pub mod retry;
pub mod types;

pub use client::{get_page, CatalogTransport, JikanClient, RawResponse};
pub use retry::RetryPolicy;
pub use types::*;
