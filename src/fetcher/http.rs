//! HTTP fetcher backed by reqwest

use super::traits::Fetcher;
use crate::config::DownloadConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Fetches images over HTTP(S) with a shared connection pool
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Build a fetcher from the download settings (user agent, per-fetch deadline)
    pub fn new(config: &DownloadConfig) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.fetch_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            crate::Error::Io(std::io::Error::other(format!(
                "Failed to create HTTP client: {}",
                e
            )))
        })?;

        Ok(Self {
            client,
            timeout: config.fetch_timeout,
        })
    }

    fn map_error(&self, url: &Url, e: reqwest::Error) -> FetchError {
        match self.timeout {
            Some(timeout) if e.is_timeout() => FetchError::Timeout {
                url: url.to_string(),
                timeout,
            },
            _ => FetchError::Request {
                url: url.to_string(),
                source: e,
            },
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.map_error(url, e))?;
        Ok(body.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
