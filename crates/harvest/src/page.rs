// ABOUTME: Page access abstraction: query nodes, read attributes and text content.
// ABOUTME: HtmlPage implements it over a parsed scraper snapshot for both static and rendered pages.

use ego_tree::NodeId;
use scraper::{ElementRef, Html};
use url::Url;

use crate::extractors::compiled::get_or_compile;

/// Where a query runs: the whole document or beneath one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<N> {
    Document,
    Within(N),
}

/// Read-only access to a loaded document.
///
/// Queries never fail: an unmatched or invalid query yields an empty
/// sequence. Nodes are returned in document order.
pub trait PageAccess {
    type Node: Copy;

    fn query_nodes(&self, scope: Scope<Self::Node>, query: &str) -> Vec<Self::Node>;

    fn node_attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Full text content of the node, hidden text included.
    fn node_text_content(&self, node: Self::Node) -> String;

    /// The URL the document was loaded from, used to resolve relative links.
    fn page_url(&self) -> Option<&Url>;
}

/// A parsed HTML document and the URL it came from.
pub struct HtmlPage {
    url: Option<Url>,
    html: Html,
}

impl HtmlPage {
    pub fn parse(url: Option<Url>, body: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(body),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }
}

impl std::fmt::Debug for HtmlPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlPage")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

impl PageAccess for HtmlPage {
    type Node = NodeId;

    fn query_nodes(&self, scope: Scope<NodeId>, query: &str) -> Vec<NodeId> {
        let Some(selector) = get_or_compile(query) else {
            return Vec::new();
        };
        match scope {
            Scope::Document => self.html.select(&selector).map(|el| el.id()).collect(),
            Scope::Within(node) => match self.element(node) {
                Some(el) => el.select(&selector).map(|child| child.id()).collect(),
                None => Vec::new(),
            },
        }
    }

    fn node_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)
            .and_then(|el| el.value().attr(name))
            .map(str::to_string)
    }

    fn node_text_content(&self, node: NodeId) -> String {
        self.element(node)
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
    }

    fn page_url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}
