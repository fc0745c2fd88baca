//! Content dispatch: route an upstream response to the right rewriter.
//!
//! HTML and CSS are buffered, decoded and rewritten. Every other type is
//! streamed back byte-for-byte. The upstream status is kept in all cases.

use axum::{
    body::Body,
    http::header::{HeaderMap, CONTENT_TYPE},
    response::Response,
};

use crate::http::error::ProxyError;
use crate::http::headers::{sanitize, strip_hop_by_hop, strip_length};
use crate::rewrite::{rewrite_css, rewrite_html, RewriteContext};

/// How an upstream body is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Css,
    Passthrough,
}

impl ContentKind {
    /// Classify by substring match on the lower-cased `Content-Type`.
    pub fn classify(content_type: Option<&str>) -> Self {
        let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
        if content_type.contains("text/html") {
            ContentKind::Html
        } else if content_type.contains("text/css") {
            ContentKind::Css
        } else {
            ContentKind::Passthrough
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::classify(headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Html => "html",
            ContentKind::Css => "css",
            ContentKind::Passthrough => "passthrough",
        }
    }
}

/// Rewrite a buffered body. Returns `None` for passthrough content.
pub fn rewrite_body(kind: ContentKind, body: &[u8], ctx: &RewriteContext) -> Option<String> {
    let text = || String::from_utf8_lossy(body);
    match kind {
        ContentKind::Html => Some(rewrite_html(&text(), ctx)),
        ContentKind::Css => Some(rewrite_css(&text(), ctx)),
        ContentKind::Passthrough => None,
    }
}

/// Build the outbound response for a fetched upstream resource.
pub async fn into_response(
    upstream: reqwest::Response,
    ctx: &RewriteContext,
) -> Result<(ContentKind, Response), ProxyError> {
    let status = upstream.status();
    let kind = ContentKind::from_headers(upstream.headers());

    let mut headers = sanitize(upstream.headers());
    strip_hop_by_hop(&mut headers);

    let body = match kind {
        ContentKind::Passthrough => Body::from_stream(upstream.bytes_stream()),
        ContentKind::Html | ContentKind::Css => {
            let raw = upstream.bytes().await?;
            strip_length(&mut headers);
            Body::from(rewrite_body(kind, &raw, ctx).unwrap_or_default())
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok((kind, response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{BaseOrigin, ProxyBase};

    fn ctx() -> RewriteContext {
        RewriteContext::new(
            BaseOrigin::new("https://e.com"),
            ProxyBase::new("http://proxy.local"),
        )
    }

    #[test]
    fn test_classify() {
        assert_eq!(ContentKind::classify(Some("text/html; charset=utf-8")), ContentKind::Html);
        assert_eq!(ContentKind::classify(Some("TEXT/HTML")), ContentKind::Html);
        assert_eq!(ContentKind::classify(Some("text/css")), ContentKind::Css);
        assert_eq!(ContentKind::classify(Some("image/png")), ContentKind::Passthrough);
        assert_eq!(
            ContentKind::classify(Some("application/javascript")),
            ContentKind::Passthrough
        );
        assert_eq!(ContentKind::classify(Some("application/json")), ContentKind::Passthrough);
        assert_eq!(ContentKind::classify(None), ContentKind::Passthrough);
    }

    #[test]
    fn test_rewrite_body_by_kind() {
        let html = rewrite_body(ContentKind::Html, br#"<img src="/a.png">"#, &ctx()).unwrap();
        assert!(html.contains("http://proxy.local/?url=https%3A%2F%2Fe.com%2Fa.png"));

        let css = rewrite_body(ContentKind::Css, b"a{background:url(/bg.png)}", &ctx()).unwrap();
        assert_eq!(
            css,
            r#"a{background:url("http://proxy.local/?url=https%3A%2F%2Fe.com%2Fbg.png")}"#
        );

        assert!(rewrite_body(ContentKind::Passthrough, b"\x89PNG", &ctx()).is_none());
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let out = rewrite_body(ContentKind::Css, b"a{}\xff", &ctx()).unwrap();
        assert_eq!(out, "a{}\u{FFFD}");
    }
}
