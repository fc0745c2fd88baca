//! Configuration validation.
//!
//! Semantic checks that serde cannot express. All violations are
//! collected and returned together.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("timeouts.request_secs ({request}) must exceed upstream.timeout_secs ({upstream})")]
    TimeoutOrder { request: u64, upstream: u64 },

    #[error("proxy.public_url must be an absolute http(s) URL, got {0:?}")]
    InvalidPublicUrl(String),

    #[error("{field}: not a valid header value")]
    InvalidHeader { field: &'static str },
}

/// Validate a configuration, returning every violation found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_connections" });
    }

    if let Some(public_url) = &config.proxy.public_url {
        let valid = Url::parse(public_url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidPublicUrl(public_url.clone()));
        }
    }

    let upstream = &config.upstream;
    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "upstream.timeout_secs" });
    }
    if upstream.read_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "upstream.read_timeout_secs" });
    }
    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "upstream.connect_timeout_secs" });
    }
    if HeaderValue::from_str(&upstream.user_agent).is_err() || upstream.user_agent.is_empty() {
        errors.push(ValidationError::InvalidHeader { field: "upstream.user_agent" });
    }
    if HeaderValue::from_str(&upstream.accept_language).is_err() {
        errors.push(ValidationError::InvalidHeader { field: "upstream.accept_language" });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    } else if config.timeouts.request_secs <= upstream.timeout_secs {
        errors.push(ValidationError::TimeoutOrder {
            request: config.timeouts.request_secs,
            upstream: upstream.timeout_secs,
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
