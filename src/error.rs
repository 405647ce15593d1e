//! Typed errors for boundary resolution and nearby search.

use thiserror::Error;

/// Errors that stop a sweep before any search is issued.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The service answered, but had nothing usable for the region
    #[error("Region boundary not found: {region}")]
    NotFound { region: String },

    /// Request could not be sent or the body could not be read
    #[error("boundary query failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the boundary service
    #[error("boundary service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the expected JSON
    #[error("malformed boundary response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Endpoint or client setup problem
    #[error("boundary client configuration error: {0}")]
    Config(String),
}

/// Errors from one nearby-search call. These only ever skip a probe.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("nearby search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("nearby search returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Provider-level status such as OVER_QUERY_LIMIT or REQUEST_DENIED
    #[error("nearby search provider status {status}: {message}")]
    Provider { status: String, message: String },

    #[error("malformed nearby search response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("nearby search client configuration error: {0}")]
    Config(String),
}
