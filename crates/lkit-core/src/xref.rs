#![forbid(unsafe_code)]

//! Incoming-reference index.
//!
//! Tracks which addresses reference a target address. The listing view
//! only needs the *count* of distinct referrers, so storage is a set of
//! sources per target and duplicates collapse.

use ahash::{AHashMap, AHashSet};

use crate::address::Address;

/// Incoming references, keyed by target address.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    incoming: AHashMap<Address, AHashSet<Address>>,
}

impl ReferenceIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `from` references `to`. Idempotent per pair.
    pub fn add(&mut self, from: Address, to: Address) {
        self.incoming.entry(to).or_default().insert(from);
    }

    /// Forget a single reference pair.
    pub fn remove(&mut self, from: Address, to: Address) {
        if let Some(sources) = self.incoming.get_mut(&to) {
            sources.remove(&from);
            if sources.is_empty() {
                self.incoming.remove(&to);
            }
        }
    }

    /// Number of distinct addresses referencing `to`; 0 when unknown.
    #[must_use]
    pub fn count(&self, to: Address) -> usize {
        self.incoming.get(&to).map_or(0, |s| s.len())
    }
}
