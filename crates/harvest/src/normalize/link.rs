// ABOUTME: Link rewriting and URL cleanup for hrefs, image sources and video sources.
// ABOUTME: Pure string transforms: rewrite rule chains, css url() and onclick extraction, scheme coercion.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// One step of a link rewrite chain.
///
/// `split` truncates the link at its first occurrence, keeping the left part.
/// `to_replace`/`replacement` substitute text, but only while the replacement
/// is not already present in the link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRewrite {
    #[serde(default)]
    pub split: Option<String>,
    #[serde(default)]
    pub to_replace: Option<String>,
    #[serde(default)]
    pub replacement: Option<String>,
}

impl LinkRewrite {
    /// Applies this single rule to a link.
    pub fn apply(&self, link: &str) -> String {
        let mut out = link.to_string();
        if let Some(split) = self.split.as_deref().filter(|s| !s.is_empty()) {
            if let Some(pos) = out.find(split) {
                out.truncate(pos);
            }
        }
        if let (Some(from), Some(to)) = (self.to_replace.as_deref(), self.replacement.as_deref()) {
            if !from.is_empty() && !out.contains(to) {
                out = out.replace(from, to);
            }
        }
        out
    }
}

/// Applies rewrite rules in configured order.
pub fn apply_rewrites(link: &str, rules: &[LinkRewrite]) -> String {
    rules
        .iter()
        .fold(link.to_string(), |acc, rule| rule.apply(&acc))
}

static CSS_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"url\((.+?)\)").unwrap());

/// Call patterns used by onclick handlers to start a trailer, tried in order.
static ONCLICK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"tload\('(.+?)'\);",
        r"tload\('(.+?)'\)",
        r#"play[A-Za-z]*\(\s*['"](.+?)['"]"#,
        r#"\(\s*['"]((?:https?:)?//[^'"]+)['"]"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Pulls the URL out of a `url(...)` CSS function, dropping surrounding quotes.
pub fn extract_css_url(style: &str) -> Option<String> {
    let caps = CSS_URL_RE.captures(style)?;
    let inner = caps.get(1)?.as_str().trim();
    let unquoted = inner.trim_matches(|c| c == '"' || c == '\'').trim();
    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}

/// Pulls a URL out of an onclick handler. The first matching call pattern wins.
pub fn extract_onclick_url(handler: &str) -> Option<String> {
    ONCLICK_PATTERNS
        .iter()
        .find_map(|re| re.captures(handler))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Returns true for browser-internal object URLs, which cannot be fetched.
pub fn is_blob(link: &str) -> bool {
    link.trim_start().starts_with("blob:")
}

fn has_scheme(link: &str) -> bool {
    if link.starts_with("data:") || link.starts_with("blob:") {
        return true;
    }
    match link.find("://") {
        Some(pos) => {
            pos > 0
                && link[..pos]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}

/// Coerces a scheme-less link to https by stripping leading slashes.
pub fn coerce_https(link: &str) -> String {
    let link = link.trim();
    if link.is_empty() || has_scheme(link) {
        return link.to_string();
    }
    format!("https://{}", link.trim_start_matches('/'))
}

/// Makes a link absolute.
///
/// Root-relative and document-relative paths are joined onto `base`;
/// protocol-relative and bare-host links are coerced to https.
pub fn absolutize(link: &str, base: Option<&Url>) -> String {
    let link = link.trim();
    if link.is_empty() || has_scheme(link) || link.starts_with("//") {
        return coerce_https(link);
    }
    let looks_like_host = link.contains('/')
        && link
            .split('/')
            .next()
            .map(|first| first.contains('.') && !first.starts_with('.'))
            .unwrap_or(false);
    if !looks_like_host {
        if let Some(joined) = base.and_then(|b| b.join(link).ok()) {
            return joined.to_string();
        }
    }
    coerce_https(link)
}

/// Drops the query string.
pub fn strip_query(href: &str) -> &str {
    match href.find('?') {
        Some(pos) => &href[..pos],
        None => href,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(split: Option<&str>, from: Option<&str>, to: Option<&str>) -> LinkRewrite {
        LinkRewrite {
            split: split.map(String::from),
            to_replace: from.map(String::from),
            replacement: to.map(String::from),
        }
    }

    #[test]
    fn split_keeps_left_segment() {
        let rules = vec![rule(Some("?"), None, None)];
        assert_eq!(
            apply_rewrites("https://cdn.x.com/a.jpg?w=300", &rules),
            "https://cdn.x.com/a.jpg"
        );
    }

    #[test]
    fn empty_split_is_ignored() {
        let rules = vec![rule(Some(""), None, None)];
        assert_eq!(apply_rewrites("https://a/b?c", &rules), "https://a/b?c");
    }

    #[test]
    fn replacement_is_guarded_for_idempotence() {
        let rules = vec![rule(None, Some("/thumbs/"), Some("/thumbs/large/"))];
        let once = apply_rewrites("https://x.com/thumbs/1.jpg", &rules);
        assert_eq!(once, "https://x.com/thumbs/large/1.jpg");
        let twice = apply_rewrites(&once, &rules);
        assert_eq!(twice, once);
    }

    #[test]
    fn rules_apply_in_order() {
        let rules = vec![
            rule(Some("#"), None, None),
            rule(None, Some("_small"), Some("_big")),
        ];
        assert_eq!(
            apply_rewrites("https://x.com/p_small.jpg#frag", &rules),
            "https://x.com/p_big.jpg"
        );
    }

    #[test]
    fn replacement_requires_both_halves() {
        let rules = vec![rule(None, Some("a"), None)];
        assert_eq!(apply_rewrites("banana", &rules), "banana");
    }

    #[test]
    fn css_url_with_single_quotes() {
        let style = "background-image:url('https://cdn.x.com/a.jpg')";
        assert_eq!(
            extract_css_url(style),
            Some("https://cdn.x.com/a.jpg".to_string())
        );
    }

    #[test]
    fn css_url_with_double_quotes_and_bare() {
        assert_eq!(
            extract_css_url(r#"background: url("//cdn.x.com/b.png") no-repeat"#),
            Some("//cdn.x.com/b.png".to_string())
        );
        assert_eq!(
            extract_css_url("background:url(/c.webp)"),
            Some("/c.webp".to_string())
        );
        assert_eq!(extract_css_url("color: red"), None);
    }

    #[test]
    fn onclick_patterns_first_match_wins() {
        assert_eq!(
            extract_onclick_url("tload('/trailers/a.mp4'); return false;"),
            Some("/trailers/a.mp4".to_string())
        );
        assert_eq!(
            extract_onclick_url("playTrailer(\"https://v.x.com/b.mp4\", 1)"),
            Some("https://v.x.com/b.mp4".to_string())
        );
        assert_eq!(
            extract_onclick_url("openVideo('//v.x.com/c.mp4')"),
            Some("//v.x.com/c.mp4".to_string())
        );
        assert_eq!(extract_onclick_url("doNothing()"), None);
    }

    #[test]
    fn coerce_https_strips_leading_slashes() {
        assert_eq!(coerce_https("//cdn.x.com/a.jpg"), "https://cdn.x.com/a.jpg");
        assert_eq!(coerce_https("cdn.x.com/a.jpg"), "https://cdn.x.com/a.jpg");
        assert_eq!(coerce_https("https://cdn.x.com/a.jpg"), "https://cdn.x.com/a.jpg");
        assert_eq!(coerce_https("http://cdn.x.com/a.jpg"), "http://cdn.x.com/a.jpg");
        assert_eq!(coerce_https("blob:https://x.com/123"), "blob:https://x.com/123");
    }

    #[test]
    fn absolutize_joins_relative_paths_on_base() {
        let base = Url::parse("https://www.site.com/videos/page/2").unwrap();
        assert_eq!(
            absolutize("/scenes/abc", Some(&base)),
            "https://www.site.com/scenes/abc"
        );
        assert_eq!(
            absolutize("//cdn.site.com/x.jpg", Some(&base)),
            "https://cdn.site.com/x.jpg"
        );
        assert_eq!(
            absolutize("cdn.site.com/x.jpg", Some(&base)),
            "https://cdn.site.com/x.jpg"
        );
        assert_eq!(
            absolutize("poster.jpg", Some(&base)),
            "https://www.site.com/videos/page/poster.jpg"
        );
        assert_eq!(absolutize("/scenes/abc", None), "https://scenes/abc");
    }

    #[test]
    fn strip_query_cuts_at_question_mark() {
        assert_eq!(strip_query("https://x.com/join?ref=1"), "https://x.com/join");
        assert_eq!(strip_query("https://x.com/v/1"), "https://x.com/v/1");
    }

    #[test]
    fn blob_detection() {
        assert!(is_blob("blob:https://x.com/5f2"));
        assert!(!is_blob("https://x.com/blob.mp4"));
    }

    #[test]
    fn host_named_blob_is_an_ordinary_link() {
        assert!(!is_blob("blobcdn.example.com/v.mp4"));
        assert!(!is_blob("blob"));
        assert_eq!(
            absolutize("blobcdn.example.com/v.mp4", None),
            "https://blobcdn.example.com/v.mp4"
        );
    }
}
