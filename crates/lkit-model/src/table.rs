#![forbid(unsafe_code)]

//! Table facade: the surface a row-addressable widget consumes.
//!
//! `ListingTable` wires a [`ChangeEventBridge`] to a [`RowProjector`]
//! behind the classic table-model quartet — `row_count`,
//! `column_count`, `header`, `cell` — and forwards the bridge's
//! structural notifications to a registered [`RowObserver`].
//!
//! The document is shared with the producer thread through an `Arc`;
//! the table itself lives on the consumer thread and is mutated only by
//! [`pump`](ListingTable::pump).

use std::sync::Arc;

use lkit_core::{
    Address, Demangler, FlatDemangler, ItemFilter, ListingDocument, NullStringReader, StringReader,
};
use tracing::trace;

use crate::bridge::{BridgeState, ChangeEventBridge, NullObserver, RowObserver};
use crate::error::TableError;
use crate::filtered_index::IndexEntry;
use crate::projector::{CellValue, Column, DisplayRecord, RowProjector};

/// Four-column live view over a filtered slice of the listing.
pub struct ListingTable<D: Demangler = FlatDemangler, S: StringReader = NullStringReader> {
    document: Arc<ListingDocument>,
    bridge: ChangeEventBridge,
    observer: Box<dyn RowObserver>,
    demangler: D,
    strings: S,
}

impl<D: Demangler, S: StringReader> std::fmt::Debug for ListingTable<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingTable")
            .field("state", &self.bridge.state())
            .field("rows", &self.bridge.index().len())
            .finish()
    }
}

impl ListingTable {
    /// Table over `document` with the given filter and the null
    /// demangler/string services.
    #[must_use]
    pub fn new(document: Arc<ListingDocument>, filter: ItemFilter) -> Self {
        Self::with_services(document, filter, FlatDemangler, NullStringReader)
    }
}

impl<D: Demangler, S: StringReader> ListingTable<D, S> {
    /// Table over `document` with explicit demangler and string reader.
    #[must_use]
    pub fn with_services(
        document: Arc<ListingDocument>,
        filter: ItemFilter,
        demangler: D,
        strings: S,
    ) -> Self {
        Self {
            document,
            bridge: ChangeEventBridge::new(filter),
            observer: Box::new(NullObserver),
            demangler,
            strings,
        }
    }

    /// Register the notification consumer.
    ///
    /// Set before [`attach`](Self::attach) to observe the initial
    /// `rows_reset`; replacing the observer later is allowed.
    pub fn set_observer(&mut self, observer: Box<dyn RowObserver>) {
        self.observer = observer;
    }

    /// Attach to the document: bulk build plus subscription, then a
    /// `rows_reset` notification.
    ///
    /// # Errors
    ///
    /// [`TableError::Bridge`] when the table was already attached.
    pub fn attach(&mut self) -> Result<(), TableError> {
        self.bridge
            .attach(&self.document, self.observer.as_mut())?;
        Ok(())
    }

    /// Drain pending document changes, notifying the observer per row.
    ///
    /// # Errors
    ///
    /// [`TableError::Bridge`] when not attached or on a protocol
    /// violation (see [`ChangeEventBridge::pump`]).
    pub fn pump(&mut self) -> Result<usize, TableError> {
        let processed = self.bridge.pump(self.observer.as_mut())?;
        if processed > 0 {
            trace!(processed, rows = self.bridge.index().len(), "table pumped");
        }
        Ok(processed)
    }

    /// Unsubscribe; rows stay readable, frozen. Idempotent.
    pub fn detach(&mut self) {
        self.bridge.detach();
    }

    /// Bridge lifecycle state.
    #[must_use]
    pub fn state(&self) -> BridgeState {
        self.bridge.state()
    }

    /// Number of visible rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.bridge.index().len()
    }

    /// Number of columns; fixed at four.
    #[must_use]
    pub fn column_count(&self) -> usize {
        Column::ALL.len()
    }

    /// Header text for `column`.
    #[must_use]
    pub fn header(&self, column: Column) -> &'static str {
        column.header()
    }

    /// Index entry at `row`.
    ///
    /// # Errors
    ///
    /// [`TableError::RowOutOfRange`] when `row >= row_count()`.
    pub fn entry(&self, row: usize) -> Result<IndexEntry, TableError> {
        Ok(self.bridge.index().at(row)?)
    }

    /// Cell value at `(row, column)`.
    ///
    /// `Ok(None)` means the row's symbol is not registered yet — a
    /// transient state, not an error. An out-of-range row *is* an
    /// error.
    ///
    /// # Errors
    ///
    /// [`TableError::RowOutOfRange`] when `row >= row_count()`.
    pub fn cell(&self, row: usize, column: Column) -> Result<Option<CellValue>, TableError> {
        let entry = self.entry(row)?;
        Ok(self.projector().project_cell(entry, column))
    }

    /// Whole display record at `row`; `Ok(None)` when the symbol is
    /// absent.
    ///
    /// # Errors
    ///
    /// [`TableError::RowOutOfRange`] when `row >= row_count()`.
    pub fn record(&self, row: usize) -> Result<Option<DisplayRecord>, TableError> {
        let entry = self.entry(row)?;
        Ok(self.projector().project(entry))
    }

    /// First row at or after `address`, for jump-to-address.
    #[must_use]
    pub fn row_at_address(&self, address: Address) -> Option<usize> {
        self.bridge.index().row_at_address(address)
    }

    /// The shared document.
    #[must_use]
    pub fn document(&self) -> &Arc<ListingDocument> {
        &self.document
    }

    fn projector(&self) -> RowProjector<'_, D, S> {
        RowProjector::new(&self.document, &self.demangler, &self.strings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use lkit_core::{ItemKind, Symbol, SymbolFlags};

    use crate::bridge::RowRange;
    use crate::error::BridgeError;

    /// Observer writing into a shared log, so tests can keep the box
    /// inside the table and still inspect the calls.
    #[derive(Debug, Clone, Default)]
    struct SharedRecorder {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl RowObserver for SharedRecorder {
        fn rows_reset(&mut self) {
            self.calls.borrow_mut().push("reset".into());
        }
        fn rows_about_to_insert(&mut self, range: RowRange) {
            self.calls.borrow_mut().push(format!("pre-ins {}", range.first));
        }
        fn rows_inserted(&mut self, range: RowRange) {
            self.calls.borrow_mut().push(format!("ins {}", range.first));
        }
        fn rows_about_to_remove(&mut self, range: RowRange) {
            self.calls.borrow_mut().push(format!("pre-rem {}", range.first));
        }
        fn rows_removed(&mut self, range: RowRange) {
            self.calls.borrow_mut().push(format!("rem {}", range.first));
        }
    }

    fn attached_table() -> (ListingTable, Rc<RefCell<Vec<String>>>) {
        let document = Arc::new(ListingDocument::new(32));
        let mut table = ListingTable::new(document, ItemFilter::All);
        let recorder = SharedRecorder::default();
        let calls = Rc::clone(&recorder.calls);
        table.set_observer(Box::new(recorder));
        table.attach().unwrap();
        (table, calls)
    }

    #[test]
    fn fresh_table_is_empty_with_four_columns() {
        let (table, calls) = attached_table();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 4);
        assert_eq!(*calls.borrow(), ["reset"]);
    }

    #[test]
    fn headers_match_the_fixed_set() {
        let (table, _) = attached_table();
        assert_eq!(table.header(Column::Address), "Address");
        assert_eq!(table.header(Column::Symbol), "Symbol");
        assert_eq!(table.header(Column::References), "R");
        assert_eq!(table.header(Column::Segment), "Segment");
    }

    #[test]
    fn pump_reflects_document_mutations_in_row_order() {
        let (mut table, calls) = attached_table();
        let document = Arc::clone(table.document());

        document.insert(Address(0x10), ItemKind::Instruction);
        document.insert(Address(0x30), ItemKind::Instruction);
        document.insert(Address(0x20), ItemKind::Instruction);

        assert_eq!(table.pump().unwrap(), 3);
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            *calls.borrow(),
            [
                "reset", "pre-ins 0", "ins 0", "pre-ins 1", "ins 1", "pre-ins 1",
                "ins 1"
            ]
        );
    }

    #[test]
    fn cell_out_of_range_is_an_error_not_a_default() {
        let (table, _) = attached_table();
        let err = table.cell(0, Column::Address).unwrap_err();
        assert_eq!(err, TableError::RowOutOfRange { row: 0, len: 0 });
    }

    #[test]
    fn cell_without_symbol_is_absent_not_an_error() {
        let (mut table, _) = attached_table();
        table.document().insert(Address(0x10), ItemKind::Data);
        table.pump().unwrap();

        for column in Column::ALL {
            assert_eq!(table.cell(0, column).unwrap(), None);
        }
        assert_eq!(table.record(0).unwrap(), None);
    }

    #[test]
    fn cell_with_symbol_projects() {
        let (mut table, _) = attached_table();
        let document = Arc::clone(table.document());
        document.insert(Address(0x10), ItemKind::Symbol);
        document
            .tables_mut()
            .symbols()
            .define(Symbol::new(Address(0x10), "main", SymbolFlags::FUNCTION));
        table.pump().unwrap();

        let cell = table.cell(0, Column::Symbol).unwrap().unwrap();
        assert_eq!(cell.text, "main");
        let addr = table.cell(0, Column::Address).unwrap().unwrap();
        assert_eq!(addr.text, "00000010");
    }

    #[test]
    fn detach_freezes_rows_and_blocks_pump() {
        let (mut table, _) = attached_table();
        table.document().insert(Address(0x10), ItemKind::Data);
        table.pump().unwrap();
        table.detach();

        assert_eq!(table.state(), BridgeState::Detached);
        assert_eq!(table.row_count(), 1);
        assert!(matches!(
            table.pump(),
            Err(TableError::Bridge(BridgeError::NotAttached { .. }))
        ));
    }

    #[test]
    fn row_at_address_navigates() {
        let (mut table, _) = attached_table();
        let document = Arc::clone(table.document());
        document.insert(Address(0x10), ItemKind::Data);
        document.insert(Address(0x30), ItemKind::Data);
        table.pump().unwrap();

        assert_eq!(table.row_at_address(Address(0x20)), Some(1));
        assert_eq!(table.row_at_address(Address(0x40)), None);
    }
}
