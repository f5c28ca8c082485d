//! Manga catalog browser built on the Jikan API v4.
//!
//! Two feeds (the top-ranked listing and a filtered search) share one
//! controller that builds the request URL from filter state, fetches a page
//! with rate-limit retries, and renders result cards through a
//! [`RenderSink`].

pub mod api;
pub mod error;
pub mod feed;
pub mod filter;
pub mod query;
pub mod render;
pub mod shell;

pub use api::{CatalogTransport, JikanClient, RetryPolicy};
pub use error::{FetchError, FilterError, FETCH_FAILED_MESSAGE};
pub use feed::{FeedConfig, FeedController};
pub use filter::{FilterInput, FilterState};
pub use query::FeedKind;
pub use render::{MangaCard, RenderSink, TerminalSink};
