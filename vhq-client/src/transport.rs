use async_trait::async_trait;

/// Status and body of an HTTP exchange, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request could not be sent, or its answer could not be read.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// HTTP seam of the client. Paths are absolute paths of the server, e.g. `/api/analyze`.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait(?Send)]
pub trait Transport {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError>;

    /// Sends `body`, an already encoded JSON document, with a JSON content type.
    async fn post_json(&self, path: &str, body: String) -> Result<RawResponse, TransportError>;
}
