//! Fetching a single binary resource
//!
//! The engine talks to the network through the [`Fetcher`] trait so that the
//! transport can be swapped (tests use an in-memory implementation).
//! [`HttpFetcher`] is the production implementation on top of `reqwest`.

use async_trait::async_trait;

use crate::config::TransferConfig;
use crate::error::{Error, Result};

/// Retrieves the bytes behind a URL
///
/// Implementations make a single attempt. Any error is treated by the engine
/// as "this task produced nothing".
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the resource at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Name of this implementation, for logging
    fn name(&self) -> &'static str;
}

/// HTTP GET fetcher backed by a shared `reqwest::Client`
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher using the timeout and user agent from `config`
    pub fn new(config: &TransferConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.trim().is_empty() {
            return Err(Error::Other("empty URL".to_string()));
        }

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(url.to_string())
            } else {
                Error::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(url.to_string())
            } else {
                Error::Network(e)
            }
        })?;
        Ok(body.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
