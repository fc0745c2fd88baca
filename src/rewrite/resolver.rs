//! URL resolution and ProxiedURL construction.
//!
//! # Resolution order
//! 1. `//host/path` → `https://host/path`
//! 2. `/path` → base origin + `/path`
//! 3. `http://...` / `https://...` → unchanged
//! 4. anything else → base origin + `/` + reference
//!
//! The absolute URL is then percent-encoded into the `url` query
//! parameter of the proxy endpoint.

use std::fmt;

use url::Url;

/// The externally visible base address of this proxy, e.g. `https://proxy.example`.
///
/// Stored without a trailing slash; the endpoint path `/` is appended
/// when building ProxiedURLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyBase(String);

impl ProxyBase {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let trimmed = base.trim().trim_end_matches('/');
        Self(trimmed.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix shared by every ProxiedURL: `<base>/?url=`.
    pub fn endpoint_prefix(&self) -> String {
        format!("{}/?url=", self.0)
    }

    /// Wrap an absolute URL as a ProxiedURL.
    pub fn endpoint(&self, absolute: &str) -> String {
        format!("{}{}", self.endpoint_prefix(), urlencoding::encode(absolute))
    }

    /// Whether `value` is already a ProxiedURL produced by this proxy.
    pub fn is_proxied(&self, value: &str) -> bool {
        value.starts_with(&self.endpoint_prefix())
    }
}

impl fmt::Display for ProxyBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `scheme://host[:port]` of the page being proxied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseOrigin(String);

impl BaseOrigin {
    /// Derive the origin of an absolute target URL. Default ports are omitted.
    pub fn from_url(target: &Url) -> Self {
        let mut origin = format!("{}://{}", target.scheme(), target.host_str().unwrap_or_default());
        if let Some(port) = target.port() {
            origin.push_str(&format!(":{}", port));
        }
        Self(origin)
    }

    /// Use a pre-computed origin string verbatim (trailing slashes removed).
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self(origin.trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn has_http_scheme(reference: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        reference
            .get(..scheme.len())
            .map(|head| head.eq_ignore_ascii_case(scheme))
            .unwrap_or(false)
    })
}

/// Turn a possibly relative reference into an absolute URL string.
///
/// Never fails: anything that is not protocol-relative, site-absolute or
/// already absolute is joined onto the base origin.
pub fn absolutize(reference: &str, base: &BaseOrigin) -> String {
    let reference = reference.trim();

    if reference.starts_with("//") {
        format!("https:{}", reference)
    } else if reference.starts_with('/') {
        format!("{}{}", base.as_str(), reference)
    } else if has_http_scheme(reference) {
        reference.to_string()
    } else {
        format!("{}/{}", base.as_str(), reference)
    }
}

/// Resolve a reference against `base` and wrap it as a ProxiedURL.
pub fn resolve(reference: &str, base: &BaseOrigin, proxy: &ProxyBase) -> String {
    proxy.endpoint(&absolutize(reference, base))
}
