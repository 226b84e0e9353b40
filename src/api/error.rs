use thiserror::Error;

/// Failures the fetch pipeline can surface. The cache layer itself never
/// fails; everything here originates at or below the transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The network call itself failed (offline, DNS, connection reset)
    #[error("network request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status
    #[error("API responded with HTTP {status}")]
    Http { status: u16 },

    /// The response body could not be parsed as JSON
    #[error("failed to decode API response: {0}")]
    Decode(String),

    /// The request URL could not be constructed
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}
