#![forbid(unsafe_code)]

//! Change events and the consumer-side change stream.
//!
//! The document emits one [`ChangeEvent`] per structural mutation,
//! synchronously and in mutation order. Events are value messages: they
//! carry a snapshot of the affected item so a consumer never has to
//! re-query the document while handling them.
//!
//! Delivery is through an [`mpsc`] channel per subscriber. The producer
//! sends from whatever thread mutates the document; the consumer drains
//! its [`ChangeStream`] on its own thread. Dropping the stream
//! unsubscribes — the document prunes closed channels on the next emit.
//!
//! # Invariants
//!
//! 1. Events arrive in mutation order within one stream.
//! 2. An event's item snapshot reflects the item at mutation time.
//! 3. A stream created by
//!    [`snapshot_and_subscribe`](crate::ListingDocument::snapshot_and_subscribe)
//!    observes exactly the mutations after its paired snapshot.

use std::sync::mpsc;

use crate::item::ListingItem;

/// Which structural mutation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeKind {
    /// The item was inserted into the document.
    Inserted,
    /// The item was removed from the document.
    Removed,
}

/// One structural change to the listing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeEvent {
    /// Snapshot of the affected item at mutation time.
    pub item: ListingItem,
    /// Insert or remove.
    pub kind: ChangeKind,
}

/// Receiving end of a document subscription.
///
/// Drain with [`try_next`](Self::try_next) on the consumer thread; the
/// call never blocks. Drop to unsubscribe.
#[derive(Debug)]
pub struct ChangeStream {
    rx: mpsc::Receiver<ChangeEvent>,
}

impl ChangeStream {
    pub(crate) fn new(rx: mpsc::Receiver<ChangeEvent>) -> Self {
        Self { rx }
    }

    /// Next pending event, or `None` when the queue is currently empty
    /// or the document side has gone away.
    pub fn try_next(&self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::item::{ItemId, ItemKind};

    fn item(id: u32, address: u64) -> ListingItem {
        ListingItem {
            id: ItemId(id),
            address: Address(address),
            kind: ItemKind::Instruction,
        }
    }

    #[test]
    fn stream_drains_in_send_order() {
        let (tx, rx) = mpsc::channel();
        let stream = ChangeStream::new(rx);

        for i in 0..3 {
            tx.send(ChangeEvent {
                item: item(i, u64::from(i) * 0x10),
                kind: ChangeKind::Inserted,
            })
            .unwrap();
        }

        assert_eq!(stream.try_next().unwrap().item.id, ItemId(0));
        assert_eq!(stream.try_next().unwrap().item.id, ItemId(1));
        assert_eq!(stream.try_next().unwrap().item.id, ItemId(2));
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn empty_stream_yields_none_without_blocking() {
        let (_tx, rx) = mpsc::channel::<ChangeEvent>();
        let stream = ChangeStream::new(rx);
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn disconnected_stream_yields_none() {
        let (tx, rx) = mpsc::channel::<ChangeEvent>();
        drop(tx);
        let stream = ChangeStream::new(rx);
        assert!(stream.try_next().is_none());
    }
}
