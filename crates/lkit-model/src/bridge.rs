#![forbid(unsafe_code)]

//! Change event bridge: keeps the filtered index consistent with the
//! document's mutation stream and narrates every structural change as a
//! row range.
//!
//! The bridge is the only writer of its index. It drains the change
//! stream on the consumer thread ([`pump`](ChangeEventBridge::pump)),
//! applies each event, and brackets every mutation with a
//! before/after notification pair so a row-addressable consumer can
//! update incrementally instead of rebuilding.
//!
//! # Lifecycle
//!
//! ```text
//! Unattached ──attach──▶ Attached ──detach──▶ Detached
//! ```
//!
//! Transitions are forward-only. After detach the index stays
//! queryable, frozen at its last state.
//!
//! # Invariants
//!
//! 1. Notifications are emitted in event order; the row number in each
//!    is correct at the instant of emission, not retroactively.
//! 2. Filtered-out items never touch the index and never notify.
//! 3. A `Removed` event for an unindexed item is fatal: the bridge
//!    detaches itself and reports
//!    [`BridgeError::Consistency`](crate::BridgeError::Consistency)
//!    instead of guessing at a row.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `attach` twice | `BridgeError::AlreadyAttached` |
//! | `pump`/`apply_event` before attach or after detach | `BridgeError::NotAttached` |
//! | Removal of unindexed item | `BridgeError::Consistency`, bridge detached |
//! | `detach` repeated | No-op |

use lkit_core::{ChangeEvent, ChangeKind, ChangeStream, ItemFilter, ListingDocument};
use tracing::{debug, error, trace};

use crate::error::BridgeError;
use crate::filtered_index::{FilteredIndex, IndexEntry};

/// Inclusive row range `[first, last]`.
///
/// Single events always produce single-row ranges; the range form
/// exists so consumers handle both ends of the protocol uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowRange {
    /// First affected row.
    pub first: usize,
    /// Last affected row (inclusive).
    pub last: usize,
}

impl RowRange {
    /// Range covering exactly one row.
    #[must_use]
    pub fn single(row: usize) -> Self {
        Self {
            first: row,
            last: row,
        }
    }

    /// Number of rows covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }
}

/// Consumer of structural row notifications.
///
/// The presentation seam: a table widget (or a test double) implements
/// this to mirror index mutations into its own row addressing. The
/// `about_to` half of each pair fires *before* the index mutates, the
/// completion half after; consumers must apply them strictly in order
/// and must not cache row numbers across a pair.
pub trait RowObserver {
    /// The whole index was rebuilt (initial attach).
    fn rows_reset(&mut self);

    /// `range` will be inserted; the index still has its old contents.
    fn rows_about_to_insert(&mut self, range: RowRange);

    /// The insertion announced by the previous call completed.
    fn rows_inserted(&mut self, range: RowRange);

    /// `range` will be removed; the index still has its old contents.
    fn rows_about_to_remove(&mut self, range: RowRange);

    /// The removal announced by the previous call completed.
    fn rows_removed(&mut self, range: RowRange);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RowObserver for NullObserver {
    fn rows_reset(&mut self) {}
    fn rows_about_to_insert(&mut self, _range: RowRange) {}
    fn rows_inserted(&mut self, _range: RowRange) {}
    fn rows_about_to_remove(&mut self, _range: RowRange) {}
    fn rows_removed(&mut self, _range: RowRange) {}
}

/// Bridge lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Created, not yet attached to a document.
    Unattached,
    /// Attached and following the change stream.
    Attached,
    /// Terminal: unsubscribed, index frozen.
    Detached,
}

/// What applying one event did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The item's kind is filtered out; nothing happened.
    Ignored,
    /// An entry was inserted at `row`.
    Inserted {
        /// Row of the new entry at emission time.
        row: usize,
    },
    /// The entry at `row` was removed.
    Removed {
        /// Row the entry occupied at emission time.
        row: usize,
    },
}

/// Keeps a [`FilteredIndex`] consistent with a document's change stream.
#[derive(Debug)]
pub struct ChangeEventBridge {
    filter: ItemFilter,
    index: FilteredIndex,
    stream: Option<ChangeStream>,
    state: BridgeState,
}

impl ChangeEventBridge {
    /// New bridge in `Unattached` state with an empty index.
    #[must_use]
    pub fn new(filter: ItemFilter) -> Self {
        Self {
            filter,
            index: FilteredIndex::new(filter),
            stream: None,
            state: BridgeState::Unattached,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Read access to the index; valid in every state.
    #[must_use]
    pub fn index(&self) -> &FilteredIndex {
        &self.index
    }

    /// Bulk-build the index from `document` and subscribe to its
    /// changes, then tell the observer the rows were reset.
    ///
    /// Snapshot and subscription are one atomic document operation, so
    /// no event can fall between the scan and the stream.
    ///
    /// # Errors
    ///
    /// [`BridgeError::AlreadyAttached`] unless the bridge is
    /// `Unattached`.
    pub fn attach(
        &mut self,
        document: &ListingDocument,
        observer: &mut dyn RowObserver,
    ) -> Result<(), BridgeError> {
        if self.state != BridgeState::Unattached {
            return Err(BridgeError::AlreadyAttached);
        }
        let (snapshot, stream) = document.snapshot_and_subscribe();
        self.index = FilteredIndex::build(&snapshot, self.filter);
        self.stream = Some(stream);
        self.state = BridgeState::Attached;
        debug!(
            rows = self.index.len(),
            scanned = snapshot.len(),
            "bridge attached"
        );
        observer.rows_reset();
        Ok(())
    }

    /// Drain all queued events, applying each in arrival order.
    ///
    /// Call from the consumer thread whenever it is ready to process
    /// updates. Returns the number of events applied (ignored ones
    /// included).
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotAttached`] outside `Attached`;
    /// [`BridgeError::Consistency`] aborts the drain and detaches.
    pub fn pump(&mut self, observer: &mut dyn RowObserver) -> Result<usize, BridgeError> {
        if self.state != BridgeState::Attached {
            return Err(BridgeError::NotAttached { state: self.state });
        }
        let mut processed = 0;
        loop {
            let Some(event) = self.stream.as_ref().and_then(ChangeStream::try_next) else {
                break;
            };
            self.apply_event(event, observer)?;
            processed += 1;
        }
        Ok(processed)
    }

    /// Apply a single change event.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotAttached`] outside `Attached`;
    /// [`BridgeError::Consistency`] for a removal the index cannot
    /// locate (the bridge detaches itself before returning it).
    pub fn apply_event(
        &mut self,
        event: ChangeEvent,
        observer: &mut dyn RowObserver,
    ) -> Result<Applied, BridgeError> {
        if self.state != BridgeState::Attached {
            return Err(BridgeError::NotAttached { state: self.state });
        }
        if !self.filter.allows(event.item.kind) {
            trace!(
                id = event.item.id.raw(),
                kind = ?event.item.kind,
                "event ignored by filter"
            );
            return Ok(Applied::Ignored);
        }

        let entry = IndexEntry::from(event.item);
        match event.kind {
            ChangeKind::Inserted => {
                let row = self.index.insertion_position(entry.address);
                trace!(row, address = %entry.address, "inserting row");
                observer.rows_about_to_insert(RowRange::single(row));
                self.index.insert(row, entry);
                observer.rows_inserted(RowRange::single(row));
                Ok(Applied::Inserted { row })
            }
            ChangeKind::Removed => {
                let Some(row) = self.index.position_of(entry) else {
                    error!(
                        id = entry.item.raw(),
                        address = %entry.address,
                        "removal of unindexed item; detaching bridge"
                    );
                    self.stream = None;
                    self.state = BridgeState::Detached;
                    return Err(BridgeError::Consistency {
                        item: entry.item,
                        address: entry.address,
                    });
                };
                trace!(row, address = %entry.address, "removing row");
                observer.rows_about_to_remove(RowRange::single(row));
                self.index.remove(row);
                observer.rows_removed(RowRange::single(row));
                Ok(Applied::Removed { row })
            }
        }
    }

    /// Unsubscribe and freeze the index. Idempotent; the index remains
    /// queryable afterwards.
    pub fn detach(&mut self) {
        if self.state == BridgeState::Detached {
            return;
        }
        self.stream = None;
        self.state = BridgeState::Detached;
        debug!(rows = self.index.len(), "bridge detached");
    }
}
