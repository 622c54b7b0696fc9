#![forbid(unsafe_code)]

//! Core data model for ListingKit: the listing document, its change
//! stream, and the auxiliary lookup tables a listing view reads from.
//!
//! This crate owns everything on the *producer* side of the pipeline:
//!
//! - [`ListingDocument`]: the address-ordered, mutable item store with
//!   synchronous change notification and an atomic
//!   snapshot-then-subscribe protocol.
//! - [`SymbolTable`], [`SegmentTable`], [`ReferenceIndex`]: lookup
//!   tables bundled behind a scoped read lock ([`TablesReadGuard`]).
//! - [`Demangler`] and [`StringReader`]: seams for the name demangling
//!   and string decoding services, which live outside this crate.
//!
//! The consumer side (filtered index, change bridge, row projection)
//! lives in `lkit-model`.

pub mod address;
pub mod document;
pub mod error;
pub mod event;
pub mod item;
pub mod segment;
pub mod services;
pub mod symbol;
pub mod tables;
pub mod xref;

pub use address::Address;
pub use document::ListingDocument;
pub use error::SegmentError;
pub use event::{ChangeEvent, ChangeKind, ChangeStream};
pub use item::{ItemFilter, ItemId, ItemKind, ListingItem};
pub use segment::{Segment, SegmentTable};
pub use services::{Demangler, FlatDemangler, NullStringReader, StringReader, quoted};
pub use symbol::{Symbol, SymbolFlags, SymbolTable};
pub use tables::{Tables, TablesReadGuard, TablesWriteGuard};
pub use xref::ReferenceIndex;
