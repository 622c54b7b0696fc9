#![forbid(unsafe_code)]

//! Live filtered listing model for ListingKit.
//!
//! A listing view shows a filtered, address-ordered slice of the
//! listing document as a four-column table that stays correct while the
//! disassembly pipeline keeps mutating the document. Three pieces
//! compose into that view:
//!
//! - [`FilteredIndex`]: the ordered set of visible entries, with
//!   O(log n) positional lookup.
//! - [`ChangeEventBridge`]: turns the document's change stream into
//!   index mutations plus row-range notifications for a row-addressable
//!   consumer.
//! - [`RowProjector`]: formats one row into a [`DisplayRecord`] at read
//!   time by cross-referencing the symbol/segment/reference tables
//!   under a scoped lock.
//!
//! [`ListingTable`] wires the three together behind the surface a table
//! widget expects: `row_count` / `column_count` / `header` / `cell`
//! plus structural notifications.

pub mod bridge;
pub mod error;
pub mod filtered_index;
pub mod projector;
pub mod table;

pub use bridge::{Applied, BridgeState, ChangeEventBridge, NullObserver, RowObserver, RowRange};
pub use error::{BridgeError, IndexError, TableError};
pub use filtered_index::{FilteredIndex, IndexEntry};
pub use projector::{CellTint, CellValue, Column, DisplayRecord, RowProjector, RowTint};
pub use table::ListingTable;
