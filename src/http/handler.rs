//! The single proxy endpoint.
//!
//! ```text
//! OPTIONS /            → 204 + CORS preflight headers, no fetch
//! GET     /?url=<abs>  → fetch, sanitize headers, dispatch body
//! GET     /            → 400 "Missing url parameter"
//! bad url / fetch fail → 500 "Proxy error: <message>"
//! ```

use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    http::{
        header::{HeaderMap, HeaderValue, ACCEPT, ALLOW, HOST},
        Method, StatusCode,
    },
    response::{IntoResponse, Response},
};
use url::Url;

use crate::http::dispatch::{self, ContentKind};
use crate::http::error::ProxyError;
use crate::http::headers::{apply_cors, preflight_headers};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::rewrite::{BaseOrigin, ProxyBase, RewriteContext};

/// Entry point for every request routed to `/`.
pub async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();

    match method {
        Method::OPTIONS => {
            metrics::record_request("preflight", StatusCode::NO_CONTENT.as_u16(), start);
            return (StatusCode::NO_CONTENT, preflight_headers()).into_response();
        }
        Method::GET | Method::HEAD => {}
        _ => {
            let mut response =
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
            apply_cors(response.headers_mut());
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD, OPTIONS"));
            return response;
        }
    }

    let request_id = request_id(&headers).to_string();

    match proxy(&state, query.as_deref(), &headers).await {
        Ok((target, kind, response)) => {
            tracing::debug!(
                request_id = %request_id,
                target = %target,
                kind = kind.as_str(),
                status = response.status().as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Proxied request"
            );
            metrics::record_request(kind.as_str(), response.status().as_u16(), start);
            response
        }
        Err(err) => {
            match &err {
                ProxyError::MissingUrl => {
                    tracing::debug!(request_id = %request_id, "Request without url parameter");
                }
                ProxyError::Fetch(_) | ProxyError::Upstream(_) => {
                    tracing::warn!(
                        request_id = %request_id,
                        error = %err,
                        timeout = err.is_timeout(),
                        "Upstream fetch failed"
                    );
                    metrics::record_upstream_error();
                }
                other => {
                    tracing::warn!(request_id = %request_id, error = %other, "Rejected target url");
                }
            }
            metrics::record_request("error", err.status().as_u16(), start);
            err.into_response()
        }
    }
}

async fn proxy(
    state: &AppState,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Result<(Url, ContentKind, Response), ProxyError> {
    let target = parse_target(query)?;

    let ctx = RewriteContext::new(BaseOrigin::from_url(&target), proxy_base(state, headers));
    let upstream = state.upstream.fetch(&target, headers.get(ACCEPT)).await?;
    let (kind, response) = dispatch::into_response(upstream, &ctx).await?;

    Ok((target, kind, response))
}

/// Extract and validate the `url` query parameter.
pub fn parse_target(query: Option<&str>) -> Result<Url, ProxyError> {
    let raw = query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
        .ok_or(ProxyError::MissingUrl)?;

    let target = Url::parse(&raw)?;
    match target.scheme() {
        "http" | "https" => {}
        other => return Err(ProxyError::UnsupportedScheme(other.to_string())),
    }
    if target.host_str().map_or(true, str::is_empty) {
        return Err(ProxyError::MissingHost);
    }

    Ok(target)
}

/// The proxy's own externally visible base for this request.
///
/// A configured public URL wins; otherwise it is derived from `Host`
/// and `X-Forwarded-Proto`.
fn proxy_base(state: &AppState, headers: &HeaderMap) -> ProxyBase {
    if let Some(base) = &state.public_url {
        return base.clone();
    }

    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    ProxyBase::new(format!("{}://{}", proto, host))
}
