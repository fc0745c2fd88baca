//! Text rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! upstream body (HTML or CSS, decoded as UTF-8)
//!     → html.rs (src/href attributes, srcset lists, history shim)
//!     → css.rs  (url(...) tokens)
//!     → resolver.rs (reference + base origin → ProxiedURL)
//!     → rewritten text returned to the dispatcher
//! ```
//!
//! # Design Decisions
//! - Pattern-based rewriting, not a DOM or CSSOM parse
//! - Resolution never fails; malformed references degrade to string joins
//! - References already pointing at this proxy are left alone, so a
//!   second pass over rewritten text is a no-op

pub mod css;
pub mod html;
pub mod resolver;

pub use css::rewrite_css;
pub use html::rewrite_html;
pub use resolver::{absolutize, resolve, BaseOrigin, ProxyBase};

/// Everything a rewriter needs to turn a reference into a ProxiedURL.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    pub base: BaseOrigin,
    pub proxy: ProxyBase,
}

impl RewriteContext {
    pub fn new(base: BaseOrigin, proxy: ProxyBase) -> Self {
        Self { base, proxy }
    }

    /// Resolve a reference against this context's base origin.
    pub fn resolve(&self, reference: &str) -> String {
        resolve(reference, &self.base, &self.proxy)
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

/// True for `data:` URIs, which carry their content inline.
pub(crate) fn is_data_uri(value: &str) -> bool {
    starts_with_ignore_case(value.trim_start(), "data:")
}

/// True for references that must never be resolved inside markup:
/// inline data, script URLs, in-page fragments, and ProxiedURLs of this proxy.
pub(crate) fn is_markup_passthrough(value: &str, proxy: &ProxyBase) -> bool {
    let value = value.trim_start();
    is_data_uri(value)
        || starts_with_ignore_case(value, "javascript:")
        || value.starts_with('#')
        || proxy.is_proxied(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_passthrough() {
        let proxy = ProxyBase::new("http://proxy.local");

        assert!(is_markup_passthrough("data:image/png;base64,AAAA", &proxy));
        assert!(is_markup_passthrough("DATA:text/plain,hi", &proxy));
        assert!(is_markup_passthrough("javascript:void(0)", &proxy));
        assert!(is_markup_passthrough("JavaScript:alert(1)", &proxy));
        assert!(is_markup_passthrough("#top", &proxy));
        assert!(is_markup_passthrough(
            "http://proxy.local/?url=https%3A%2F%2Fe.com",
            &proxy
        ));

        assert!(!is_markup_passthrough("/img.png", &proxy));
        assert!(!is_markup_passthrough("https://e.com/#x", &proxy));
        assert!(!is_markup_passthrough("", &proxy));
    }
}
