// ABOUTME: Derives the display site name used in records and table file names.
// ABOUTME: Takes the main label of the listing host, drops dashes and "tour." and title-cases it.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::text::title_case;

static SITE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?(?:.*?\.)?(?P<site_name>.+?)\.").unwrap()
});

/// Returns the display name for a listing URL, e.g. `https://tour.my-site.com/videos` -> `Mysite`.
///
/// Falls back to the whole host when it has no dot.
pub fn site_name(listing_url: &str) -> String {
    let host = Url::parse(listing_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| listing_url.to_string());

    let raw = SITE_NAME_RE
        .captures(&host)
        .and_then(|caps| caps.name("site_name"))
        .map(|m| m.as_str().to_string())
        .unwrap_or(host);

    title_case(&raw.replace('-', "").replace("tour.", ""))
}
