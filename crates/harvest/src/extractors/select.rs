// ABOUTME: Query-list evaluation with first-match-wins precedence.
// ABOUTME: Resolves a location group to the node sequence of its winning query.

//! Query selection.
//!
//! Queries in a list are tried in order and the first one that matches at
//! least one node wins; later queries are never run. Unset lists (empty or
//! placeholder) short-circuit to no nodes without querying.

use tracing::debug;

use crate::config::{LocationGroup, QueryList};
use crate::page::{PageAccess, Scope};

/// Runs queries in order and returns the nodes of the first one with a match.
pub fn first_match<P: PageAccess>(
    page: &P,
    scope: Scope<P::Node>,
    queries: &QueryList,
) -> Vec<P::Node> {
    for query in queries.queries() {
        let nodes = page.query_nodes(scope, query);
        if !nodes.is_empty() {
            debug!(query = %query, matches = nodes.len(), "query matched");
            return nodes;
        }
    }
    Vec::new()
}

/// Nodes for a location group in the whole document; empty when the group is absent.
pub fn select_group<P: PageAccess>(page: &P, group: Option<&LocationGroup>) -> Vec<P::Node> {
    match group {
        Some(group) => first_match(page, Scope::Document, &group.queries),
        None => Vec::new(),
    }
}

/// Nodes matching the group's sub-query beneath `node`, or the node itself
/// when no sub-query is configured.
pub fn sub_nodes<P: PageAccess>(page: &P, node: P::Node, group: &LocationGroup) -> Vec<P::Node> {
    match group.sub_query.as_deref().filter(|q| !q.trim().is_empty()) {
        Some(query) => page.query_nodes(Scope::Within(node), query),
        None => vec![node],
    }
}
