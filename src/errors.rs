//! Error types for quakemap.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur while fetching, validating, or writing a map.
#[derive(Error, Debug)]
pub enum QuakemapError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Feed endpoint returned an error status
    #[error("USGS API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A feed record could not be turned into a marker
    #[error("Invalid event data: {0}")]
    Validation(String),

    /// Reading a saved feed or writing the artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which pipeline stage failed.
///
/// Fetch failures are subject to the fetch error policy; build failures
/// are always surfaced.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to fetch earthquake feed")]
    Fetch(#[source] QuakemapError),

    #[error("failed to build map")]
    Build(#[source] QuakemapError),
}
