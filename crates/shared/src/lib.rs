//! Shared library for the manga browser workspace.
//!
//! This crate provides the ambient pieces used by the browser binary:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::{BackoffKind, Config, JIKAN_API_BASE, MANGA_PER_PAGE};
pub use logging::LogConfig;
