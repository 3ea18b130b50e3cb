//! Case-insensitive interned string storage
//!
//! Attribute string values are deduplicated here so repeated literals
//! across a large source share one allocation. Lookup is
//! case-insensitive but the casing of the first insertion is what
//! callers get back, and what `save` emits.

use std::collections::HashMap;
use std::sync::Arc;

/// Deduplicated string storage, keyed by ASCII-lowercased text
#[derive(Debug, Default)]
pub struct StringPool {
    map: HashMap<String, Arc<str>>,
}

impl StringPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the canonical copy of `s`, inserting it if absent.
    /// Matching is case-insensitive; the stored casing is the first
    /// one seen.
    pub fn intern(&mut self, s: &str) -> Arc<str> {
        let key = s.to_ascii_lowercase();
        self.map
            .entry(key)
            .or_insert_with(|| Arc::from(s))
            .clone()
    }

    /// Number of distinct strings held
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedups() {
        let mut pool = StringPool::new();
        let a = pool.intern("Pistol");
        let b = pool.intern("Pistol");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_intern_case_insensitive_keeps_first_casing() {
        let mut pool = StringPool::new();
        let a = pool.intern("Pistol");
        let b = pool.intern("PISTOL");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(&*b, "Pistol");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_distinct_strings_stay_distinct() {
        let mut pool = StringPool::new();
        let a = pool.intern("Pistol");
        let b = pool.intern("Rifle");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 2);
    }
}
