use async_trait::async_trait;
use gloo_net::http::{Request, Response};

use vhq_client::{RawResponse, Transport, TransportError};

/// Sends the requests of the client with the fetch API of the browser.
#[derive(Debug, Clone, Default)]
pub struct GlooTransport {
    /// Prefix of every request path. Empty for the origin serving the site.
    base_url: String,
}

impl GlooTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

async fn read(response: Response) -> Result<RawResponse, TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError(e.to_string()))?;
    Ok(RawResponse { status, body })
}

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        let response = Request::get(&self.url(path))
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        read(response).await
    }

    async fn post_json(&self, path: &str, body: String) -> Result<RawResponse, TransportError> {
        let response = Request::post(&self.url(path))
            .header("Content-Type", "application/json")
            .body(body)
            .map_err(|e| TransportError(e.to_string()))?
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        read(response).await
    }
}
