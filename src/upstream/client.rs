//! The single outbound request made per proxied resource.

use std::time::Duration;

use axum::http::header::{HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use url::Url;

use crate::config::UpstreamConfig;

/// Error building the upstream client from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid header value in upstream config: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Failure to obtain response headers from the upstream.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no response within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Request(e) => e.is_timeout(),
        }
    }
}

/// Fetches target resources while presenting as a desktop browser.
///
/// Only the header phase has a deadline. Once headers arrive the body may
/// take as long as it needs, provided no single read stalls for longer
/// than `read_timeout_secs`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    header_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientBuildError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)?,
        );

        let client = reqwest::Client::builder()
            .user_agent(HeaderValue::from_str(&config.user_agent)?)
            .default_headers(headers)
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            header_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// GET `target`, forwarding the caller's `Accept` header (default `*/*`).
    ///
    /// Transport failures and a missed header deadline come back as `Err`;
    /// any HTTP status from the upstream is a successful fetch.
    pub async fn fetch(
        &self,
        target: &Url,
        accept: Option<&HeaderValue>,
    ) -> Result<reqwest::Response, FetchError> {
        let accept = accept
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*/*"));

        let request = self.client.get(target.clone()).header(ACCEPT, accept).send();

        match tokio::time::timeout(self.header_timeout, request).await {
            Ok(response) => Ok(response?),
            Err(_) => Err(FetchError::Timeout(self.header_timeout)),
        }
    }
}
