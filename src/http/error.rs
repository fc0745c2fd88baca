//! Request-level failures and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::headers::apply_cors;
use crate::upstream::FetchError;

/// Everything that can go wrong while serving one proxied request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Missing url parameter")]
    MissingUrl,

    #[error("invalid target url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("target url has no host")]
    MissingHost,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("upstream request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("upstream body failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrl => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the upstream missed a deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            ProxyError::Fetch(e) => e.is_timeout(),
            ProxyError::Upstream(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Plain-text body sent to the caller.
    pub fn body(&self) -> String {
        match self {
            ProxyError::MissingUrl => self.to_string(),
            other => format!("Proxy error: {}", other),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.body()).into_response();
        apply_cors(response.headers_mut());
        response
    }
}
