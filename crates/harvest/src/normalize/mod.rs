// ABOUTME: Pure normalizers applied to extracted field values.
// ABOUTME: Dates, text, link rewriting and site name derivation; no DOM or network access.

pub mod date;
pub mod link;
pub mod site;
pub mod text;

pub use date::{normalize_date, CANONICAL_DATE_FORMAT};
pub use link::{apply_rewrites, LinkRewrite};
pub use site::site_name;
