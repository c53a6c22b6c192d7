//! Thread-local cache of compiled queries.
//!
//! Compiling a query is far more expensive than running it, so repeated
//! pattern strings share one compiled [`Query`] through an `Arc`.
//! Cache is capped at 256 entries; it is cleared when full.

use crate::lang::Language;
use crate::ts::{BridgeError, Query};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    // Key is "<language>:<pattern>" so the same pattern compiled for two
    // grammars never collides.
    static QUERY_CACHE: RefCell<HashMap<String, Arc<Query>>> =
        RefCell::new(HashMap::new());
}

/// Get a compiled query from cache, or compile and cache it.
///
/// Failed compilations are not cached.
pub fn get_or_compile(language: Language, pattern: &str) -> Result<Arc<Query>, BridgeError> {
    let cache_key = format!("{language}:{pattern}");

    QUERY_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();

        if let Some(query) = cache.get(&cache_key) {
            return Ok(Arc::clone(query));
        }

        if cache.len() >= MAX_CACHE_ENTRIES {
            tracing::trace!(entries = cache.len(), "query cache full, clearing");
            cache.clear();
        }

        let compiled = Arc::new(Query::new(language, pattern)?);
        cache.insert(cache_key, Arc::clone(&compiled));
        Ok(compiled)
    })
}

/// Clear the query cache (mainly for testing).
pub fn clear_cache() {
    QUERY_CACHE.with(|cache| {
        cache.borrow_mut().clear();
    });
}

pub fn cache_size() -> usize {
    QUERY_CACHE.with(|cache| cache.borrow().len())
}
