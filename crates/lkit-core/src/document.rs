#![forbid(unsafe_code)]

//! The listing document: an address-ordered, mutable item store with a
//! synchronous change stream.
//!
//! The document is the shared resource of the system. The disassembly
//! pipeline inserts and removes items from its own thread; views
//! snapshot and then follow the change stream from theirs. All methods
//! take `&self` — interior locking keeps the item store consistent.
//!
//! # Invariants
//!
//! 1. Items are stored in ascending address order; equal addresses keep
//!    arrival order.
//! 2. One [`ChangeEvent`] is emitted per structural mutation, to every
//!    live subscriber, in mutation order, before the mutating call
//!    returns.
//! 3. [`snapshot_and_subscribe`](Self::snapshot_and_subscribe) is
//!    atomic: no mutation can fall between the returned snapshot and
//!    the first event the returned stream observes.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `remove` with unknown id | Returns `false`, no event |
//! | Subscriber dropped its stream | Sender pruned on next emit |
//! | Writer thread panicked mid-lock | Lock recovered, state valid |

use std::sync::{Mutex, mpsc};

use tracing::{debug, trace};

use crate::address::Address;
use crate::event::{ChangeEvent, ChangeKind, ChangeStream};
use crate::item::{ItemId, ItemKind, ListingItem};
use crate::tables::{SharedTables, TablesReadGuard, TablesWriteGuard};

#[derive(Debug, Default)]
struct DocState {
    // Ascending address; ties in arrival order.
    items: Vec<ListingItem>,
    next_id: u32,
    subscribers: Vec<mpsc::Sender<ChangeEvent>>,
}

impl DocState {
    fn emit(&mut self, event: ChangeEvent) {
        // Deliver in subscriber registration order; prune closed channels.
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

/// Address-ordered mutable listing with change notification.
#[derive(Debug)]
pub struct ListingDocument {
    state: Mutex<DocState>,
    tables: SharedTables,
    bits: u8,
}

impl ListingDocument {
    /// Create an empty document for an architecture of `bits` word size.
    #[must_use]
    pub fn new(bits: u8) -> Self {
        Self {
            state: Mutex::new(DocState::default()),
            tables: SharedTables::default(),
            bits,
        }
    }

    /// Architecture word size in bits, fixed at construction.
    #[must_use]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DocState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert an item, keeping address order, and notify subscribers.
    ///
    /// Equal addresses append after existing entries (arrival order).
    /// Returns the new item's id; ids are never reused.
    pub fn insert(&self, address: Address, kind: ItemKind) -> ItemId {
        let mut state = self.lock_state();
        let id = ItemId(state.next_id);
        state.next_id += 1;

        let item = ListingItem { id, address, kind };
        let pos = state.items.partition_point(|i| i.address <= address);
        state.items.insert(pos, item);
        trace!(id = id.raw(), %address, ?kind, "listing item inserted");

        state.emit(ChangeEvent {
            item,
            kind: ChangeKind::Inserted,
        });
        id
    }

    /// Remove the item with `id`, notifying subscribers.
    ///
    /// Returns `false` when no such item exists (already removed or
    /// never inserted); nothing is emitted in that case.
    pub fn remove(&self, id: ItemId) -> bool {
        let mut state = self.lock_state();
        let Some(pos) = state.items.iter().position(|i| i.id == id) else {
            return false;
        };
        let item = state.items.remove(pos);
        trace!(id = id.raw(), address = %item.address, "listing item removed");

        state.emit(ChangeEvent {
            item,
            kind: ChangeKind::Removed,
        });
        true
    }

    /// Copy of the current items, in address order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ListingItem> {
        self.lock_state().items.clone()
    }

    /// Snapshot the document and subscribe to subsequent changes, as
    /// one atomic step.
    ///
    /// The returned stream observes exactly the mutations that happen
    /// after the returned snapshot: both are taken under a single
    /// acquisition of the document lock, so no event is lost or
    /// duplicated in between.
    pub fn snapshot_and_subscribe(&self) -> (Vec<ListingItem>, ChangeStream) {
        let mut state = self.lock_state();
        let snapshot = state.items.clone();
        let (tx, rx) = mpsc::channel();
        state.subscribers.push(tx);
        debug!(items = snapshot.len(), "snapshot taken, subscriber added");
        (snapshot, ChangeStream::new(rx))
    }

    /// Current number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_state().items.len()
    }

    /// Whether the document has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_state().items.is_empty()
    }

    /// Scoped read access to the symbol/segment/reference tables.
    ///
    /// Hold for one row projection at most; the analysis pipeline
    /// blocks on writes while the guard is alive.
    #[must_use]
    pub fn tables(&self) -> TablesReadGuard<'_> {
        self.tables.read()
    }

    /// Scoped write access to the tables, for the analysis pipeline.
    #[must_use]
    pub fn tables_mut(&self) -> TablesWriteGuard<'_> {
        self.tables.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn insert_keeps_address_order() {
        let doc = ListingDocument::new(32);
        doc.insert(Address(0x30), ItemKind::Instruction);
        doc.insert(Address(0x10), ItemKind::Instruction);
        doc.insert(Address(0x20), ItemKind::Instruction);

        let addrs: Vec<_> = doc.snapshot().iter().map(|i| i.address.0).collect();
        assert_eq!(addrs, [0x10, 0x20, 0x30]);
    }

    #[test]
    fn equal_addresses_keep_arrival_order() {
        let doc = ListingDocument::new(32);
        let a = doc.insert(Address(0x10), ItemKind::Symbol);
        let b = doc.insert(Address(0x10), ItemKind::Instruction);

        let ids: Vec<_> = doc.snapshot().iter().map(|i| i.id).collect();
        assert_eq!(ids, [a, b]);
    }

    #[test]
    fn ids_are_monotonic_and_not_reused() {
        let doc = ListingDocument::new(32);
        let a = doc.insert(Address(0x10), ItemKind::Data);
        doc.remove(a);
        let b = doc.insert(Address(0x10), ItemKind::Data);
        assert!(b > a);
    }

    #[test]
    fn events_arrive_in_mutation_order() {
        let doc = ListingDocument::new(32);
        let (snapshot, stream) = doc.snapshot_and_subscribe();
        assert!(snapshot.is_empty());

        let id = doc.insert(Address(0x10), ItemKind::Instruction);
        doc.remove(id);

        let first = stream.try_next().unwrap();
        assert_eq!(first.kind, ChangeKind::Inserted);
        assert_eq!(first.item.id, id);
        let second = stream.try_next().unwrap();
        assert_eq!(second.kind, ChangeKind::Removed);
        assert_eq!(second.item.id, id);
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn remove_unknown_id_is_false_and_silent() {
        let doc = ListingDocument::new(32);
        let (_, stream) = doc.snapshot_and_subscribe();
        assert!(!doc.remove(ItemId(99)));
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn dropped_stream_is_pruned() {
        let doc = ListingDocument::new(32);
        let (_, stream) = doc.snapshot_and_subscribe();
        drop(stream);
        // Emitting after the drop must not fail or leak the sender.
        doc.insert(Address(0x10), ItemKind::Data);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn snapshot_plus_stream_misses_nothing_under_racing_producer() {
        let doc = Arc::new(ListingDocument::new(64));
        let producer = {
            let doc = Arc::clone(&doc);
            thread::spawn(move || {
                for i in 0..200u64 {
                    doc.insert(Address(i * 4), ItemKind::Instruction);
                }
            })
        };

        // Subscribe somewhere in the middle of the producer's run.
        let (snapshot, stream) = doc.snapshot_and_subscribe();
        producer.join().unwrap();

        let mut seen = snapshot.len();
        while let Some(event) = stream.try_next() {
            assert_eq!(event.kind, ChangeKind::Inserted);
            seen += 1;
        }
        assert_eq!(seen, 200);
    }
}
