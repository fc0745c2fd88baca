//! Response header manipulation.
//!
//! # Responsibilities
//! - Strip headers that stop a page from being framed
//! - Force permissive CORS on every response
//! - Drop hop-by-hop headers that belong to the upstream connection
//!
//! # Design Decisions
//! - `http::HeaderName` is always lowercase, so matching is case-insensitive
//!   by construction
//! - Everything not listed here is copied through untouched, including
//!   caching and content-encoding headers

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONNECTION, CONTENT_LENGTH,
    CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY_REPORT_ONLY, PROXY_AUTHENTICATE, TE,
    TRAILER, TRANSFER_ENCODING, UPGRADE, X_FRAME_OPTIONS,
};

/// Headers that block framing or restrict embedded content.
pub const FRAMING_HEADERS: [HeaderName; 3] = [
    X_FRAME_OPTIONS,
    CONTENT_SECURITY_POLICY,
    CONTENT_SECURITY_POLICY_REPORT_ONLY,
];

/// Connection-scoped headers never forwarded to the caller.
const HOP_BY_HOP_HEADERS: [HeaderName; 6] = [
    CONNECTION,
    TRANSFER_ENCODING,
    TE,
    TRAILER,
    UPGRADE,
    PROXY_AUTHENTICATE,
];

/// Build the outbound header set from the upstream one.
pub fn sanitize(upstream: &HeaderMap) -> HeaderMap {
    let mut outbound = upstream.clone();
    for name in FRAMING_HEADERS.iter() {
        outbound.remove(name);
    }
    apply_cors(&mut outbound);
    outbound
}

/// Set `Access-Control-Allow-Origin: *`, replacing any existing value.
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
}

/// Headers answered to a CORS preflight.
pub fn preflight_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    apply_cors(&mut headers);
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers
}

pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
}

/// A rewritten body no longer matches the upstream length.
pub fn strip_length(headers: &mut HeaderMap) {
    headers.remove(CONTENT_LENGTH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CACHE_CONTROL, CONTENT_ENCODING, CONTENT_TYPE};

    fn upstream() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-Frame-Options").unwrap(),
            HeaderValue::from_static("DENY"),
        );
        headers.insert(
            HeaderName::from_bytes(b"Content-Security-Policy").unwrap(),
            HeaderValue::from_static("frame-ancestors 'none'"),
        );
        headers.insert(
            HeaderName::from_bytes(b"CONTENT-SECURITY-POLICY-REPORT-ONLY").unwrap(),
            HeaderValue::from_static("default-src 'self'"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=60"));
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://only-me.example"),
        );
        headers
    }

    #[test]
    fn test_sanitize_removes_framing_headers() {
        let out = sanitize(&upstream());

        assert!(out.get("x-frame-options").is_none());
        assert!(out.get("content-security-policy").is_none());
        assert!(out.get("content-security-policy-report-only").is_none());
    }

    #[test]
    fn test_sanitize_overrides_cors_and_keeps_the_rest() {
        let out = sanitize(&upstream());

        assert_eq!(out.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(out.get(CONTENT_TYPE).unwrap(), "text/html");
        assert_eq!(out.get(CACHE_CONTROL).unwrap(), "max-age=60");
        assert_eq!(out.get(CONTENT_ENCODING).unwrap(), "gzip");
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_sanitize_empty_still_sets_cors() {
        let out = sanitize(&HeaderMap::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }

    #[test]
    fn test_preflight_headers() {
        let headers = preflight_headers();
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(), "GET, OPTIONS");
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_HEADERS).unwrap(), "*");
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("42"));

        strip_hop_by_hop(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(CONTENT_LENGTH));

        strip_length(&mut headers);
        assert!(headers.is_empty());
    }
}
