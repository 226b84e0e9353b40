//! Transport seam between the fetch pipeline and the network.
//!
//! The pipeline only needs "GET this URL, give me status + body"; keeping
//! that behind a trait lets tests drive the pipeline with scripted
//! responses and count outbound calls without touching the network.

use async_trait::async_trait;

use crate::api::error::ApiError;

/// Raw transport-level response before any decoding
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET request. Errors here are connectivity failures only;
    /// non-success statuses come back as a normal response.
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError>;
}

/// Production transport backed by a shared reqwest client
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}
