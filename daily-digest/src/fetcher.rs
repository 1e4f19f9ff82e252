use crate::config::FetchConfig;
use crate::types::{DigestError, Result};
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info};

const FEED_ACCEPT: &str = "application/rss+xml, application/xml, text/xml, application/atom+xml";

/// One HTTP GET per call, bounded by the configured timeout. No retries.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch a feed document and return its raw body.
    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<u8>> {
        self.fetch_with_accept(url, FEED_ACCEPT).await
    }

    /// Fetch any URL and return its raw body.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetch_with_accept(url, "*/*").await
    }

    async fn fetch_with_accept(&self, url: &str, accept: &str) -> Result<Vec<u8>> {
        let start_time = Instant::now();
        debug!("Fetching: {}", url);

        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let max_bytes = (self.config.max_feed_size_mb * 1024 * 1024) as u64;
        if let Some(content_length) = response.content_length() {
            if content_length > max_bytes {
                return Err(DigestError::FeedTooLarge { size: content_length });
            }
        }

        // Servers may omit or understate Content-Length.
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            bytes.extend_from_slice(&chunk);
            if bytes.len() as u64 > max_bytes {
                return Err(DigestError::FeedTooLarge {
                    size: bytes.len() as u64,
                });
            }
        }

        info!(
            "Fetched {} ({} bytes in {} ms)",
            url,
            bytes.len(),
            start_time.elapsed().as_millis()
        );
        Ok(bytes)
    }
}
