// ABOUTME: Per-field extractors: href, title, date, models, image, video, description and tags.
// ABOUTME: Each takes located nodes plus the field's location group and returns a normalized value or None.

use crate::config::LocationGroup;
use crate::normalize::link::{
    absolutize, apply_rewrites, extract_css_url, extract_onclick_url, is_blob,
};
use crate::normalize::text::{clean_description, clean_model, clean_tag, clean_title, strip_newlines};
use crate::normalize::date::normalize_date;
use crate::page::PageAccess;

use super::select::sub_nodes;

const DEFAULT_HREF_ATTRIBUTE: &str = "href";
const DEFAULT_SOURCE_ATTRIBUTE: &str = "src";

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads the entry link, resolved against the page URL.
pub fn extract_href<P: PageAccess>(page: &P, node: P::Node, group: &LocationGroup) -> Option<String> {
    let attr = group.attribute.as_deref().unwrap_or(DEFAULT_HREF_ATTRIBUTE);
    let raw = non_empty(page.node_attribute(node, attr)?)?;
    Some(absolutize(&raw, page.page_url()))
}

/// Node text with newlines removed and trimmed; includes hidden text.
pub fn extract_text<P: PageAccess>(page: &P, node: P::Node) -> Option<String> {
    non_empty(strip_newlines(&page.node_text_content(node)))
}

pub fn extract_title<P: PageAccess>(page: &P, node: P::Node) -> Option<String> {
    clean_title(&page.node_text_content(node))
}

/// Reads the date text (or the configured attribute) and normalizes it.
pub fn extract_date<P: PageAccess>(page: &P, node: P::Node, group: &LocationGroup) -> Option<String> {
    let raw = match group.attribute.as_deref() {
        Some(attr) => page.node_attribute(node, attr)?,
        None => page.node_text_content(node),
    };
    normalize_date(&raw, group.date_format.as_deref())
}

pub fn extract_description<P: PageAccess>(page: &P, node: P::Node) -> Option<String> {
    clean_description(&page.node_text_content(node))
}

/// One cleaned model name per sub-node, in document order, duplicates kept.
pub fn extract_models<P: PageAccess>(
    page: &P,
    nodes: &[P::Node],
    group: &LocationGroup,
) -> Vec<String> {
    nodes
        .iter()
        .flat_map(|&node| sub_nodes(page, node, group))
        .filter_map(|n| clean_model(&page.node_text_content(n)))
        .collect()
}

/// One cleaned tag per sub-node, in document order.
pub fn extract_tags<P: PageAccess>(page: &P, nodes: &[P::Node], group: &LocationGroup) -> Vec<String> {
    nodes
        .iter()
        .flat_map(|&node| sub_nodes(page, node, group))
        .filter_map(|n| clean_tag(&page.node_text_content(n)))
        .collect()
}

/// Reads an image link: attribute, css `url()` for style attributes,
/// rewrites, then absolutize.
pub fn extract_image<P: PageAccess>(page: &P, node: P::Node, group: &LocationGroup) -> Option<String> {
    let attr = group.attribute.as_deref().unwrap_or(DEFAULT_SOURCE_ATTRIBUTE);
    let mut link = non_empty(page.node_attribute(node, attr)?)?;
    if attr.eq_ignore_ascii_case("style") {
        link = extract_css_url(&link)?;
    }
    let link = apply_rewrites(&link, &group.rewrites);
    non_empty(absolutize(&link, page.page_url()))
}

/// Reads a video link: optional sub-target, attribute, onclick pattern
/// extraction, rewrites, then absolutize. Blob links are returned as-is.
pub fn extract_video<P: PageAccess>(page: &P, node: P::Node, group: &LocationGroup) -> Option<String> {
    let target = sub_nodes(page, node, group).into_iter().next()?;
    let attr = group.attribute.as_deref().unwrap_or(DEFAULT_SOURCE_ATTRIBUTE);
    let mut link = non_empty(page.node_attribute(target, attr)?)?;
    if attr.eq_ignore_ascii_case("onclick") {
        link = extract_onclick_url(&link)?;
    }
    let link = apply_rewrites(&link, &group.rewrites);
    if is_blob(&link) {
        return Some(link.trim().to_string());
    }
    non_empty(absolutize(&link, page.page_url()))
}
