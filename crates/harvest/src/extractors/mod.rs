// ABOUTME: Field extraction over page access: selector cache, query precedence and per-field extractors.
// ABOUTME: Extractors never fail; a missing node or attribute yields None.

pub mod compiled;
pub mod fields;
pub mod select;

pub use select::{first_match, select_group, sub_nodes};
