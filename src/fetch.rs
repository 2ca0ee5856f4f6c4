//! Content fetching.
//!
//! A thin reqwest wrapper enforcing the configured timeout, a 2xx status,
//! an accepted content type, and the maximum download size. Transport
//! failure detail (DNS, connect, timeout) is preserved verbatim inside
//! [`Error::Download`] so it reaches the final error text.
//!
//! Nothing is cached across requests and nothing is retried.

use bytes::Bytes;
use reqwest::{Client, Url};
use veriframe_core::{Config, Error, Result};

/// HTTP content fetcher with fixed timeout and size limits.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_bytes: u64,
}

impl Fetcher {
    /// Build a fetcher from the process configuration.
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            max_bytes: config.max_download_bytes,
        }
    }

    /// Fetch the raw bytes behind a URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] when the connection fails, the timeout
    /// elapses, the status is not 2xx, the declared content type is not an
    /// accepted media type, or the body exceeds the size limit.
    pub async fn fetch(&self, url: &Url) -> Result<Bytes> {
        tracing::debug!(%url, "fetching content");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::download(url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::download(
                url.as_str(),
                format!("HTTP status {status}"),
            ));
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !content_type_accepted(content_type) {
                return Err(Error::download(
                    url.as_str(),
                    format!("unsupported content type: {content_type}"),
                ));
            }
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(Error::download(
                    url.as_str(),
                    format!("file too large: {length} bytes (max: {})", self.max_bytes),
                ));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::download(url.as_str(), &e))?;

        if body.len() as u64 > self.max_bytes {
            return Err(Error::download(
                url.as_str(),
                format!(
                    "file too large: {} bytes (max: {})",
                    body.len(),
                    self.max_bytes
                ),
            ));
        }

        tracing::debug!(%url, bytes = body.len(), "fetched content");
        Ok(body)
    }
}

/// The classifier never trusts this header, but a declared type that is
/// clearly not media gets rejected before buffering the whole body.
fn content_type_accepted(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("image/")
        || essence.starts_with("video/")
        || essence == "application/octet-stream"
}
