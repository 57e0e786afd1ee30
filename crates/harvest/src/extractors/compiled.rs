// ABOUTME: Pre-compiled CSS selector cache for repeated lookups of configured query expressions.
// ABOUTME: Eliminates re-parsing the same selector for every listing row and detail page.

//! Selector caching for efficient repeated DOM queries.
//!
//! Every listing row re-runs the same handful of configured selectors, so
//! parsing is done once per thread and the compiled form is cloned out.

use std::cell::RefCell;
use std::collections::HashMap;

use scraper::Selector;

thread_local! {
    static SELECTOR_CACHE: RefCell<HashMap<String, Option<Selector>>> =
        RefCell::new(HashMap::new());
}

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `Some(Selector)` if the selector is valid, `None` if invalid.
/// Invalid selectors are cached too, so a bad expression is parsed only once.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    SELECTOR_CACHE.with(|cache| {
        if let Some(cached) = cache.borrow().get(css) {
            return cached.clone();
        }
        let compiled = Selector::parse(css).ok();
        cache
            .borrow_mut()
            .insert(css.to_string(), compiled.clone());
        compiled
    })
}

/// Returns true if the selector string parses.
pub fn is_valid(css: &str) -> bool {
    get_or_compile(css).is_some()
}

/// Precompiles a batch of selectors into the cache, returning the ones that failed.
pub fn precompile_selectors<I, S>(selectors: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    selectors
        .into_iter()
        .filter(|css| !is_valid(css.as_ref()))
        .map(|css| css.as_ref().to_string())
        .collect()
}
