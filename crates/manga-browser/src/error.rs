use thiserror::Error;

/// Message shown in place of the result grid when a fetch cycle fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load manga. Please try again later.";

/// Errors from one fetch cycle against the catalog API.
///
/// All variants collapse to [`FETCH_FAILED_MESSAGE`] on screen; the variant
/// only matters for logs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API responded with status: {status}")]
    Status { status: u16, message: Option<String> },

    #[error("still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    Malformed(&'static str),
}

/// Errors from turning raw filter input into filter state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid year filter: {0:?}")]
    InvalidYear(String),

    #[error("unknown filter key: {0:?}")]
    UnknownKey(String),
}
