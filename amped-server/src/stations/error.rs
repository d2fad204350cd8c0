//! Station feed error types.

/// Errors that can occur when fetching station availability.
///
/// All variants are non-fatal to the refresh cycle: the coordinator logs
/// them and keeps the previously published snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// HTTP request failed (connectivity, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the feed
    #[error("rate limited by station feed")]
    RateLimited,

    /// Feed returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Mock data could not be loaded, or a mock failure was injected
    #[error("mock feed error: {message}")]
    Mock { message: String },
}
