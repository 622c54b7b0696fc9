#![forbid(unsafe_code)]

//! Error taxonomy for the listing model.
//!
//! Two of the kinds defined by the system are real errors and surface
//! here: out-of-range row access ([`IndexError`], [`TableError`]) and
//! producer/consumer protocol violations ([`BridgeError`]). Transient
//! lookup misses and decode failures are *not* errors — they degrade to
//! absent cells or raw names inside the projector.

use lkit_core::{Address, ItemId};

use crate::bridge::BridgeState;

/// Errors from positional index access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// `row` is outside `[0, len)`.
    OutOfRange {
        /// The requested row.
        row: usize,
        /// Index size at the time of the call.
        len: usize,
    },
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { row, len } => {
                write!(f, "row {row} out of range (index holds {len} rows)")
            }
        }
    }
}

impl std::error::Error for IndexError {}

/// Errors from the change event bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    /// An operation that requires an attached bridge was called in
    /// another state.
    NotAttached {
        /// The state the bridge was actually in.
        state: BridgeState,
    },
    /// `attach` was called on a bridge that already left `Unattached`.
    AlreadyAttached,
    /// A `Removed` event arrived for an item the index does not hold.
    ///
    /// This means the producer/consumer protocol was broken (events
    /// reordered, or the initial scan missed an item). Continuing would
    /// corrupt row numbering, so the bridge detaches itself before
    /// returning this.
    Consistency {
        /// The item the event referred to.
        item: ItemId,
        /// Its address at event time.
        address: Address,
    },
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAttached { state } => {
                write!(f, "bridge is not attached (state: {state:?})")
            }
            Self::AlreadyAttached => write!(f, "bridge was already attached"),
            Self::Consistency { item, address } => write!(
                f,
                "removal of unindexed item {} at {address} breaks the event protocol",
                item.raw()
            ),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Errors from the table facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// `row` is outside `[0, row_count())`.
    RowOutOfRange {
        /// The requested row.
        row: usize,
        /// Row count at the time of the call.
        len: usize,
    },
    /// The underlying bridge rejected the operation.
    Bridge(BridgeError),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowOutOfRange { row, len } => {
                write!(f, "row {row} out of range (table holds {len} rows)")
            }
            Self::Bridge(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bridge(err) => Some(err),
            Self::RowOutOfRange { .. } => None,
        }
    }
}

impl From<BridgeError> for TableError {
    fn from(err: BridgeError) -> Self {
        Self::Bridge(err)
    }
}

impl From<IndexError> for TableError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::OutOfRange { row, len } => Self::RowOutOfRange { row, len },
        }
    }
}
