#![forbid(unsafe_code)]

//! The auxiliary table bundle and its scoped lock guards.
//!
//! Symbols, segments, and references are written by the analysis
//! pipeline on its own thread and read by the listing view at row
//! projection time. The bundle lives behind one `RwLock`; a read guard
//! spans exactly one row's worth of lookups so all four columns of a
//! row come from a single consistent snapshot, and the RAII guard
//! releases on every exit path.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::address::Address;
use crate::segment::{Segment, SegmentTable};
use crate::symbol::{Symbol, SymbolTable};
use crate::xref::ReferenceIndex;

/// Symbols + segments + references, locked as one unit.
#[derive(Debug, Default)]
pub struct Tables {
    /// Address-keyed symbol table.
    pub symbols: SymbolTable,
    /// Start-ordered segment table.
    pub segments: SegmentTable,
    /// Incoming-reference index.
    pub references: ReferenceIndex,
}

/// Shared handle around [`Tables`]; owned by the document.
#[derive(Debug, Default)]
pub(crate) struct SharedTables {
    inner: RwLock<Tables>,
}

impl SharedTables {
    pub(crate) fn read(&self) -> TablesReadGuard<'_> {
        // A panicked writer leaves the tables readable; recover the guard.
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        TablesReadGuard { guard }
    }

    pub(crate) fn write(&self) -> TablesWriteGuard<'_> {
        let guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        TablesWriteGuard { guard }
    }
}

/// Scoped read access to the table bundle.
///
/// Hold for the duration of one row projection, no longer: the writer
/// side (the analysis pipeline) blocks while any read guard is alive.
#[derive(Debug)]
pub struct TablesReadGuard<'a> {
    guard: RwLockReadGuard<'a, Tables>,
}

impl TablesReadGuard<'_> {
    /// Symbol at `address`, if registered.
    #[must_use]
    pub fn symbol(&self, address: Address) -> Option<&Symbol> {
        self.guard.symbols.get(address)
    }

    /// Segment containing `address`, if mapped.
    #[must_use]
    pub fn segment(&self, address: Address) -> Option<&Segment> {
        self.guard.segments.containing(address)
    }

    /// Distinct incoming references to `address`; 0 when unknown.
    #[must_use]
    pub fn ref_count(&self, address: Address) -> usize {
        self.guard.references.count(address)
    }
}

/// Scoped write access to the table bundle, for the analysis pipeline.
#[derive(Debug)]
pub struct TablesWriteGuard<'a> {
    guard: RwLockWriteGuard<'a, Tables>,
}

impl TablesWriteGuard<'_> {
    /// Mutable symbol table.
    pub fn symbols(&mut self) -> &mut SymbolTable {
        &mut self.guard.symbols
    }

    /// Mutable segment table.
    pub fn segments(&mut self) -> &mut SegmentTable {
        &mut self.guard.segments
    }

    /// Mutable reference index.
    pub fn references(&mut self) -> &mut ReferenceIndex {
        &mut self.guard.references
    }
}
