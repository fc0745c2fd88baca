//! Stylesheet rewriting: every `url(...)` token is routed through the proxy.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{is_markup_passthrough, RewriteContext};

static URL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^"')]*?))\s*\)"#).unwrap()
});

/// Rewrite stylesheet text.
///
/// Arguments are always re-emitted double-quoted: `url(/bg.png)` becomes
/// `url("<proxy>/?url=https%3A%2F%2Fe.com%2Fbg.png")`. Empty arguments,
/// `data:`, `javascript:` and `#fragment` references are left as written.
pub fn rewrite_css(css: &str, ctx: &RewriteContext) -> String {
    URL_TOKEN
        .replace_all(css, |caps: &Captures<'_>| {
            let argument = (1..=3)
                .find_map(|i| caps.get(i))
                .map(|m| m.as_str())
                .unwrap_or_default();

            if argument.trim().is_empty() || is_markup_passthrough(argument, &ctx.proxy) {
                return caps[0].to_string();
            }

            format!("url(\"{}\")", ctx.resolve(argument))
        })
        .into_owned()
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
    fn test_unquoted_url() {
        assert_eq!(
            rewrite_css("background:url(/bg.png)", &ctx()),
            r#"background:url("http://proxy.local/?url=https%3A%2F%2Fe.com%2Fbg.png")"#
        );
    }

    #[test]
    fn test_quoted_urls_are_requoted() {
        let css = r#"a{background:url('img/a.png')} b{src:URL( "https://f.io/font.woff2" )}"#;
        let out = rewrite_css(css, &ctx());

        assert_eq!(
            out,
            format!(
                r#"a{{background:url("{}")}} b{{src:url("{}")}}"#,
                ctx().proxy.endpoint("https://e.com/img/a.png"),
                ctx().proxy.endpoint("https://f.io/font.woff2")
            )
        );
    }

    #[test]
    fn test_data_uri_untouched() {
        let css = r#".i{background:url("data:image/svg+xml;utf8,<svg></svg>")}"#;
        assert_eq!(rewrite_css(css, &ctx()), css);

        let css = ".i{background:url(data:image/png;base64,AAAA)}";
        assert_eq!(rewrite_css(css, &ctx()), css);
    }

    #[test]
    fn test_fragment_and_script_references_untouched() {
        for css in [
            ".a{filter:url(#blur)}",
            ".a{mask:url('#m')}",
            r##".a{clip-path:url("#clip")}"##,
            ".a{background:url(javascript:void(0))}",
        ] {
            assert_eq!(rewrite_css(css, &ctx()), css);
        }
    }

    #[test]
    fn test_empty_argument_untouched() {
        for css in [
            ".a{background:url()}",
            r#".a{background:url("")}"#,
            ".a{background:url( '' )}",
        ] {
            assert_eq!(rewrite_css(css, &ctx()), css);
        }
    }

    #[test]
    fn test_multiple_tokens_and_idempotence() {
        let css = "@font-face{src:url(//cdn.x/f.woff) format('woff'), url(f.ttf)}";
        let once = rewrite_css(css, &ctx());

        assert!(once.contains(&ctx().proxy.endpoint("https://cdn.x/f.woff")));
        assert!(once.contains(&ctx().proxy.endpoint("https://e.com/f.ttf")));
        assert!(once.contains("format('woff')"));
        assert_eq!(rewrite_css(&once, &ctx()), once);
    }

    #[test]
    fn test_text_without_urls_unchanged() {
        let css = "body{color:red;margin:0}";
        assert_eq!(rewrite_css(css, &ctx()), css);
    }
}
