//! HTML rewriting.
//!
//! Rewrites `src`/`href` attribute values and `srcset` candidate lists so
//! that every referenced resource is fetched through the proxy, then
//! injects a small script neutralizing the History API.
//!
//! Inline `<style>` blocks, `style="..."` attributes and script bodies are
//! not touched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{is_data_uri, is_markup_passthrough, RewriteContext};

/// Replaces `history.pushState`/`replaceState` with no-ops inside the frame.
pub const HISTORY_SHIM: &str = "<script>(function(){try{var noop=function(){};\
history.pushState=noop;history.replaceState=noop;}catch(e){}})();</script>";

static URL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(src|href)(\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

static SRCSET_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(srcset)(\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// Rewrite a full HTML document.
pub fn rewrite_html(html: &str, ctx: &RewriteContext) -> String {
    let out = rewrite_url_attributes(html, ctx);
    let out = rewrite_srcset_attributes(&out, ctx);
    inject_history_shim(&out)
}

/// Quote character and value of a `name="value"` / `name='value'` match.
fn quoted_value<'a>(caps: &'a Captures<'_>) -> (char, &'a str) {
    match caps.get(3) {
        Some(m) => ('"', m.as_str()),
        None => ('\'', caps.get(4).map(|m| m.as_str()).unwrap_or_default()),
    }
}

fn rewrite_url_attributes(html: &str, ctx: &RewriteContext) -> String {
    URL_ATTR
        .replace_all(html, |caps: &Captures<'_>| {
            let (quote, value) = quoted_value(caps);
            if is_markup_passthrough(value, &ctx.proxy) {
                return caps[0].to_string();
            }
            let proxied = ctx.resolve(&value.replace("&amp;", "&"));
            format!("{}{}{quote}{proxied}{quote}", &caps[1], &caps[2])
        })
        .into_owned()
}

fn rewrite_srcset_attributes(html: &str, ctx: &RewriteContext) -> String {
    SRCSET_ATTR
        .replace_all(html, |caps: &Captures<'_>| {
            let (quote, value) = quoted_value(caps);
            let rewritten = rewrite_srcset(value, ctx);
            format!("{}{}{quote}{rewritten}{quote}", &caps[1], &caps[2])
        })
        .into_owned()
}

/// Rewrite a `srcset` value, keeping each candidate's descriptor.
///
/// `"a.png 1x, b.png 2x"` becomes `"<proxied a.png> 1x, <proxied b.png> 2x"`.
/// The comma count is kept for every non-empty candidate; empty slots
/// (`"a.png,,b.png"`, a trailing comma) carry no URL and are normalised
/// away, since browsers skip them when parsing the list.
pub fn rewrite_srcset(value: &str, ctx: &RewriteContext) -> String {
    // A data: candidate contains commas of its own, so leave the list alone.
    if value.split(',').any(is_data_uri) {
        return value.to_string();
    }

    value
        .split(',')
        .filter_map(|candidate| {
            let mut parts = candidate.split_whitespace();
            let url = parts.next()?;
            let descriptor = parts.collect::<Vec<_>>().join(" ");

            let url = if is_markup_passthrough(url, &ctx.proxy) {
                url.to_string()
            } else {
                ctx.resolve(&url.replace("&amp;", "&"))
            };

            if descriptor.is_empty() {
                Some(url)
            } else {
                Some(format!("{} {}", url, descriptor))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Insert [`HISTORY_SHIM`] right after the first `<head>` (or `<HEAD>`) tag.
///
/// Documents with neither tag are returned unchanged.
pub fn inject_history_shim(html: &str) -> String {
    let position = ["<head>", "<HEAD>"]
        .iter()
        .find_map(|tag| html.find(tag).map(|idx| idx + tag.len()));

    match position {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + HISTORY_SHIM.len());
            out.push_str(&html[..idx]);
            out.push_str(HISTORY_SHIM);
            out.push_str(&html[idx..]);
            out
        }
        None => html.to_string(),
    }
}
