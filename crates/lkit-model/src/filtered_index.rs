#![forbid(unsafe_code)]

//! Ordered filtered index: the visible subset of the listing, sorted by
//! address and addressable by row.
//!
//! The index holds `(address, item id)` entries only — never item data,
//! never references into document storage. Row `i` always identifies
//! the entry with the `i`-th smallest address among visible items; row
//! numbers are positions, not identities, and shift on every mutation.
//!
//! # Invariants
//!
//! 1. Entries are sorted ascending by address; equal addresses keep
//!    arrival order.
//! 2. `at(row)` for `row >= len()` is an error, never a clamp or an
//!    empty value.
//! 3. `insert`/`remove` trust the row computed by
//!    [`insertion_position`](FilteredIndex::insertion_position) /
//!    [`position_of`](FilteredIndex::position_of); handing them any
//!    other row is a caller bug and panics.

use lkit_core::{Address, ItemFilter, ItemId, ListingItem};

use crate::error::IndexError;

/// One visible entry: the sort key and the item it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexEntry {
    /// Sort key.
    pub address: Address,
    /// The item's stable handle.
    pub item: ItemId,
}

impl From<ListingItem> for IndexEntry {
    fn from(item: ListingItem) -> Self {
        Self {
            address: item.address,
            item: item.id,
        }
    }
}

/// Address-ordered index over the items admitted by a filter.
#[derive(Debug)]
pub struct FilteredIndex {
    filter: ItemFilter,
    entries: Vec<IndexEntry>,
}

impl FilteredIndex {
    /// Empty index with the given filter.
    #[must_use]
    pub fn new(filter: ItemFilter) -> Self {
        Self {
            filter,
            entries: Vec::new(),
        }
    }

    /// Build from a full enumeration of the document.
    ///
    /// `items` must already be in address order (the document
    /// enumerates that way), making this a single O(n) pass.
    #[must_use]
    pub fn build(items: &[ListingItem], filter: ItemFilter) -> Self {
        debug_assert!(
            items.windows(2).all(|w| w[0].address <= w[1].address),
            "document enumeration must be address-ordered"
        );
        let entries = items
            .iter()
            .filter(|item| filter.allows(item.kind))
            .map(|item| IndexEntry::from(*item))
            .collect();
        Self { filter, entries }
    }

    /// The filter this index was built with.
    #[must_use]
    pub fn filter(&self) -> ItemFilter {
        self.filter
    }

    /// Number of visible entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `row`.
    ///
    /// # Errors
    ///
    /// [`IndexError::OutOfRange`] when `row >= len()`.
    pub fn at(&self, row: usize) -> Result<IndexEntry, IndexError> {
        self.entries
            .get(row)
            .copied()
            .ok_or(IndexError::OutOfRange {
                row,
                len: self.entries.len(),
            })
    }

    /// Current row of `entry`, or `None` when it is not indexed.
    ///
    /// Binary search to the run of equal addresses, then a scan of that
    /// run comparing ids: O(log n + k) where k is the run length.
    #[must_use]
    pub fn position_of(&self, entry: IndexEntry) -> Option<usize> {
        let start = self
            .entries
            .partition_point(|e| e.address < entry.address);
        self.entries[start..]
            .iter()
            .take_while(|e| e.address == entry.address)
            .position(|e| e.item == entry.item)
            .map(|offset| start + offset)
    }

    /// Row at which an entry with `address` would be inserted to keep
    /// the order.
    ///
    /// Equal addresses place the new entry *after* the existing run, so
    /// arrival order is preserved among duplicates.
    #[must_use]
    pub fn insertion_position(&self, address: Address) -> usize {
        self.entries.partition_point(|e| e.address <= address)
    }

    /// First row whose address is `>= address`, or `None` when every
    /// entry is below it. This is the jump-to-address lookup.
    #[must_use]
    pub fn row_at_address(&self, address: Address) -> Option<usize> {
        let row = self.entries.partition_point(|e| e.address < address);
        (row < self.entries.len()).then_some(row)
    }

    /// Insert `entry` at `row`.
    ///
    /// # Panics
    ///
    /// Panics when `row` is not the position computed by
    /// [`insertion_position`](Self::insertion_position) for this entry
    /// (which would break the ordering invariant).
    pub fn insert(&mut self, row: usize, entry: IndexEntry) {
        assert!(row <= self.entries.len(), "insert row out of range");
        if row > 0 {
            assert!(
                self.entries[row - 1].address <= entry.address,
                "insert would break address order"
            );
        }
        if let Some(next) = self.entries.get(row) {
            assert!(
                entry.address <= next.address,
                "insert would break address order"
            );
        }
        self.entries.insert(row, entry);
    }

    /// Remove and return the entry at `row`.
    ///
    /// # Panics
    ///
    /// Panics when `row >= len()`.
    pub fn remove(&mut self, row: usize) -> IndexEntry {
        assert!(row < self.entries.len(), "remove row out of range");
        self.entries.remove(row)
    }

    /// Entries in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }
}
