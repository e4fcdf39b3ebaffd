//! Typed errors for the incidents feed.
//!
//! Only document-level failures surface here. Per-entry data problems
//! (missing properties, bad timestamps) degrade to absent fields instead.

use thiserror::Error;

/// Errors that can occur while ingesting a feed document.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Document is not valid JSON or does not match the GeoJSON shape
    #[error("failed to decode feed document: {0}")]
    Decode(#[from] serde_json::Error),

    /// Document decoded but is not a usable feature collection
    #[error("invalid feed document: {reason}")]
    InvalidDocument { reason: String },
}

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
