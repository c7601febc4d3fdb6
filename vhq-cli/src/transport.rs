use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use http::Uri;
use reqwest::header::CONTENT_TYPE;

use vhq_client::{RawResponse, Ticker, Transport, TransportError};

/// URL of `path` on the server at `base_url`. URLs that already carry a scheme are kept as they
/// are.
pub fn join_url(base_url: &Uri, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base_url.to_string();
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Sends the requests of the client with reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Uri,
}

impl ReqwestTransport {
    pub fn new(base_url: &Uri, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Building the HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.clone(),
        })
    }

    /// Absolute URL of a server path
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

async fn read(response: reqwest::Response) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError(e.to_string()))?;
    Ok(RawResponse { status, body })
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        tracing::debug!(path, "GET");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        read(response).await
    }

    async fn post_json(&self, path: &str, body: String) -> Result<RawResponse, TransportError> {
        tracing::debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        read(response).await
    }
}

/// Waits on the tokio timer between two ticks
#[derive(Debug, Clone, Copy)]
pub struct TokioTicker {
    interval: Duration,
}

impl TokioTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait(?Send)]
impl Ticker for TokioTicker {
    async fn tick(&mut self) {
        tokio::time::sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[googletest::test]
    fn joins_paths_without_double_slash() -> googletest::Result<()> {
        let transport = ReqwestTransport::new(
            &Uri::from_static("http://127.0.0.1:5000/"),
            Duration::from_secs(1),
        )
        .or_fail()?;

        expect_that!(
            transport.url("/api/analyze"),
            eq("http://127.0.0.1:5000/api/analyze")
        );
        Ok(())
    }

    #[googletest::test]
    fn keeps_absolute_urls() {
        let base = Uri::from_static("http://127.0.0.1:5000");

        expect_that!(
            join_url(&base, "https://cdn.example.com/rick.mp3"),
            eq("https://cdn.example.com/rick.mp3")
        );
        expect_that!(
            join_url(&base, "downloads/rick.mp3"),
            eq("http://127.0.0.1:5000/downloads/rick.mp3")
        );
    }

    #[tokio::test]
    #[googletest::test]
    async fn ticker_sleeps_for_its_interval() {
        let start = tokio::time::Instant::now();
        let mut ticker = TokioTicker::new(Duration::from_millis(10));
        ticker.tick().await;
        ticker.tick().await;

        expect_that!(start.elapsed(), ge(Duration::from_millis(20)));
    }
}
