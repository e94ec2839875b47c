//! HTTP fetcher implementation
//!
//! One GET per document id. A non-2xx status is an expected failure (the
//! document is gone or hidden); transport errors are unexpected. There is no
//! retry or backoff here: the client's own timeout is the only bound.

use crate::config::FetchConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Reasons a document could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("HTTP {status} for document {id}")]
    Status { id: u64, status: u16 },

    /// Request never produced a usable response
    #[error("Transport error for document {id}: {source}")]
    Transport {
        id: u64,
        #[source]
        source: reqwest::Error,
    },

    #[error("Cannot build URL for document {id}: {source}")]
    Url {
        id: u64,
        #[source]
        source: url::ParseError,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use quire::config::FetchConfig;
/// use quire::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves raw document pages by id
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: Client,
    base_url: Url,
}

impl DocumentFetcher {
    /// Creates a fetcher addressing documents as `base_url` + id
    ///
    /// `base_url` should end with `/`; configuration validation enforces it.
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Builds a fetcher from configuration
    pub fn from_config(config: &FetchConfig) -> crate::Result<Self> {
        let client = build_http_client(config)?;
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self::new(client, base_url))
    }

    /// The address of document `id`
    pub fn document_url(&self, id: u64) -> Result<Url, FetchError> {
        self.base_url
            .join(&id.to_string())
            .map_err(|source| FetchError::Url { id, source })
    }

    /// Fetches the page for document `id`
    pub async fn fetch(&self, id: u64) -> Result<String, FetchError> {
        let url = self.document_url(id)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { id, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                id,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| FetchError::Transport { id, source })
    }
}
