#![forbid(unsafe_code)]

//! Row projection: one visible entry to a four-column display record,
//! computed at read time.
//!
//! Nothing here is cached. Every projection re-reads the symbol,
//! segment, and reference tables under a single scoped read guard, so
//! all four columns of one row come from one consistent snapshot and
//! the record always reflects the current table state.
//!
//! Color decisions stay symbolic ([`CellTint`], [`RowTint`]): mapping a
//! tint to an actual color is the theme's job, outside this crate.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No symbol at the row's address | Whole record absent (`None`) |
//! | String bytes fail to decode | Raw symbol name, unquoted |
//! | Name fails to demangle | Raw symbol name |
//! | Address outside any segment | `"???"` sentinel |
//! | No references recorded | `"0"` |

use lkit_core::{Demangler, ListingDocument, StringReader, Symbol, SymbolFlags, quoted};

use crate::filtered_index::IndexEntry;

/// Fixed column set of the listing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Formatted address.
    Address,
    /// Symbol name, demangled or decoded.
    Symbol,
    /// Incoming reference count.
    References,
    /// Containing segment name.
    Segment,
}

impl Column {
    /// All columns in display order.
    pub const ALL: [Self; 4] = [Self::Address, Self::Symbol, Self::References, Self::Segment];

    /// Header text for this column.
    #[must_use]
    pub fn header(self) -> &'static str {
        match self {
            Self::Address => "Address",
            Self::Symbol => "Symbol",
            Self::References => "R",
            Self::Segment => "Segment",
        }
    }

    /// Column for a 0-based display index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Foreground hint for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellTint {
    /// Address-column styling.
    Address,
    /// Narrow-string styling on the symbol column.
    String,
}

/// Background hint for a whole row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowTint {
    /// The symbol is a function the user locked.
    LockedFunction,
}

/// One formatted cell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellValue {
    /// Display text.
    pub text: String,
    /// Optional foreground hint.
    pub tint: Option<CellTint>,
}

impl CellValue {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tint: None,
        }
    }
}

/// The four cells of one row plus its background hint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayRecord {
    /// Cells in [`Column::ALL`] order.
    pub cells: [CellValue; 4],
    /// Optional background hint.
    pub background: Option<RowTint>,
}

/// Projects index entries into display records.
///
/// Borrows the document and the two service seams; cheap to construct
/// per read.
#[derive(Debug)]
pub struct RowProjector<'a, D: Demangler, S: StringReader> {
    document: &'a ListingDocument,
    demangler: &'a D,
    strings: &'a S,
}

impl<'a, D: Demangler, S: StringReader> RowProjector<'a, D, S> {
    /// Create a projector over `document` using the given services.
    #[must_use]
    pub fn new(document: &'a ListingDocument, demangler: &'a D, strings: &'a S) -> Self {
        Self {
            document,
            demangler,
            strings,
        }
    }

    /// Full record for `entry`, or `None` when no symbol is registered
    /// at its address yet.
    ///
    /// An absent symbol is a real transient state (the item landed
    /// before its symbol), not an error; every column is absent
    /// together.
    #[must_use]
    pub fn project(&self, entry: IndexEntry) -> Option<DisplayRecord> {
        let tables = self.document.tables();
        let symbol = tables.symbol(entry.address)?;

        let cells = [
            self.address_cell(symbol),
            self.symbol_cell(symbol),
            CellValue::plain(tables.ref_count(symbol.address).to_string()),
            Self::segment_cell(&tables, symbol),
        ];
        Some(DisplayRecord {
            cells,
            background: Self::background(symbol),
        })
    }

    /// Single cell for `entry`, or `None` when no symbol is registered
    /// at its address. Same lock scope and fallbacks as
    /// [`project`](Self::project).
    #[must_use]
    pub fn project_cell(&self, entry: IndexEntry, column: Column) -> Option<CellValue> {
        let tables = self.document.tables();
        let symbol = tables.symbol(entry.address)?;

        let cell = match column {
            Column::Address => self.address_cell(symbol),
            Column::Symbol => self.symbol_cell(symbol),
            Column::References => {
                CellValue::plain(tables.ref_count(symbol.address).to_string())
            }
            Column::Segment => Self::segment_cell(&tables, symbol),
        };
        Some(cell)
    }

    fn address_cell(&self, symbol: &Symbol) -> CellValue {
        CellValue {
            text: symbol.address.to_hex(self.document.bits()),
            tint: Some(CellTint::Address),
        }
    }

    fn symbol_cell(&self, symbol: &Symbol) -> CellValue {
        let text = if symbol.flags.contains(SymbolFlags::WIDE_STRING) {
            self.strings
                .read_wide_string(symbol)
                .map(|s| quoted(&s))
                .unwrap_or_else(|| symbol.name.clone())
        } else if symbol.flags.contains(SymbolFlags::STRING) {
            self.strings
                .read_string(symbol)
                .map(|s| quoted(&s))
                .unwrap_or_else(|| symbol.name.clone())
        } else {
            self.demangler
                .demangle(&symbol.name)
                .unwrap_or_else(|| symbol.name.clone())
        };
        CellValue {
            text,
            tint: symbol
                .flags
                .contains(SymbolFlags::STRING)
                .then_some(CellTint::String),
        }
    }

    fn segment_cell(
        tables: &lkit_core::TablesReadGuard<'_>,
        symbol: &Symbol,
    ) -> CellValue {
        let text = tables
            .segment(symbol.address)
            .map_or_else(|| "???".to_string(), |seg| seg.name.clone());
        CellValue::plain(text)
    }

    fn background(symbol: &Symbol) -> Option<RowTint> {
        symbol
            .flags
            .contains(SymbolFlags::FUNCTION | SymbolFlags::LOCKED)
            .then_some(RowTint::LockedFunction)
    }
}
