#![forbid(unsafe_code)]

//! Listing items and the filter predicate over them.
//!
//! An item is one entry of the listing document: a segment header, an
//! instruction, a data location, or a symbol definition. Identity is by
//! [`ItemId`] — two items at the same address are distinct entities, and
//! consumers hold ids, never references into document storage.

use crate::address::Address;

/// Opaque handle to a listing item.
///
/// Ids are allocated monotonically by the owning
/// [`ListingDocument`](crate::ListingDocument) and are never reused
/// within a document's lifetime, so a stale id can miss but can never
/// alias a different item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub(crate) u32);

impl ItemId {
    /// Raw id value, for logging and diagnostics.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Rebuild a handle from a raw value previously obtained via
    /// [`raw`](Self::raw). Only meaningful against the document that
    /// allocated it.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

/// The closed set of listing item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    /// Segment header marker.
    Segment,
    /// A disassembled instruction.
    Instruction,
    /// A data location.
    Data,
    /// A symbol definition.
    Symbol,
}

/// A value snapshot of one listing item.
///
/// Copied out of the document at enumeration or event-emission time;
/// never a borrow into document storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListingItem {
    /// Stable identity handle.
    pub id: ItemId,
    /// Address of the item in the binary.
    pub address: Address,
    /// Item category.
    pub kind: ItemKind,
}

/// Predicate deciding which items are visible to a filtered view.
///
/// Fixed at index construction; an `All` filter admits every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemFilter {
    /// Admit every item.
    #[default]
    All,
    /// Admit only items of one kind.
    Only(ItemKind),
}

impl ItemFilter {
    /// Whether an item of `kind` passes the filter.
    #[must_use]
    pub fn allows(self, kind: ItemKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == kind,
        }
    }
}
