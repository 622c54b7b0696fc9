#![forbid(unsafe_code)]

//! Symbol table: name, type flags, and user lock state per address.

use ahash::AHashMap;
use bitflags::bitflags;

use crate::address::Address;

bitflags! {
    /// Type flags attached to a symbol.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SymbolFlags: u16 {
        /// Entry point of a function.
        const FUNCTION    = 1 << 0;
        /// Narrow (byte) string data.
        const STRING      = 1 << 1;
        /// Wide (two-byte) string data.
        const WIDE_STRING = 1 << 2;
        /// Imported from another module.
        const IMPORT      = 1 << 3;
        /// Exported to other modules.
        const EXPORT      = 1 << 4;
        /// Pinned by the user; analysis must not rename or discard it.
        const LOCKED      = 1 << 5;
    }
}

impl SymbolFlags {
    /// Whether either string flag is set.
    #[must_use]
    pub fn is_string(self) -> bool {
        self.intersects(Self::STRING | Self::WIDE_STRING)
    }
}

/// A named location in the analyzed binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Address the symbol is defined at.
    pub address: Address,
    /// Possibly-mangled name.
    pub name: String,
    /// Type flags.
    pub flags: SymbolFlags,
}

impl Symbol {
    /// Create a symbol.
    #[must_use]
    pub fn new(address: Address, name: impl Into<String>, flags: SymbolFlags) -> Self {
        Self {
            address,
            name: name.into(),
            flags,
        }
    }
}

/// Address-keyed symbol table.
///
/// One symbol per address; redefinition replaces (last write wins),
/// preserving an existing user lock.
#[derive(Debug, Default)]
pub struct SymbolTable {
    by_address: AHashMap<Address, Symbol>,
}

impl SymbolTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or redefine the symbol at `symbol.address`.
    ///
    /// Redefinition keeps the `LOCKED` flag of the previous definition:
    /// a user pin survives re-analysis.
    pub fn define(&mut self, mut symbol: Symbol) {
        if let Some(old) = self.by_address.get(&symbol.address)
            && old.flags.contains(SymbolFlags::LOCKED)
        {
            symbol.flags |= SymbolFlags::LOCKED;
        }
        self.by_address.insert(symbol.address, symbol);
    }

    /// Remove the symbol at `address`, if any.
    pub fn undefine(&mut self, address: Address) -> Option<Symbol> {
        self.by_address.remove(&address)
    }

    /// Look up the symbol at `address`.
    #[must_use]
    pub fn get(&self, address: Address) -> Option<&Symbol> {
        self.by_address.get(&address)
    }

    /// Set the user lock on the symbol at `address`.
    ///
    /// Returns `false` when no symbol is defined there.
    pub fn lock(&mut self, address: Address) -> bool {
        match self.by_address.get_mut(&address) {
            Some(sym) => {
                sym.flags |= SymbolFlags::LOCKED;
                true
            }
            None => false,
        }
    }

    /// Clear the user lock on the symbol at `address`.
    pub fn unlock(&mut self, address: Address) -> bool {
        match self.by_address.get_mut(&address) {
            Some(sym) => {
                sym.flags -= SymbolFlags::LOCKED;
                true
            }
            None => false,
        }
    }

    /// Number of defined symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(addr: u64, name: &str, flags: SymbolFlags) -> SymbolTable {
        let mut t = SymbolTable::new();
        t.define(Symbol::new(Address(addr), name, flags));
        t
    }

    #[test]
    fn define_then_get() {
        let t = table_with(0x1000, "main", SymbolFlags::FUNCTION);
        let sym = t.get(Address(0x1000)).unwrap();
        assert_eq!(sym.name, "main");
        assert!(sym.flags.contains(SymbolFlags::FUNCTION));
    }

    #[test]
    fn redefinition_replaces_but_keeps_lock() {
        let mut t = table_with(0x1000, "sub_1000", SymbolFlags::FUNCTION);
        assert!(t.lock(Address(0x1000)));

        t.define(Symbol::new(Address(0x1000), "main", SymbolFlags::FUNCTION));
        let sym = t.get(Address(0x1000)).unwrap();
        assert_eq!(sym.name, "main");
        assert!(sym.flags.contains(SymbolFlags::LOCKED));
    }

    #[test]
    fn lock_on_missing_symbol_is_false() {
        let mut t = SymbolTable::new();
        assert!(!t.lock(Address(0x2000)));
        assert!(!t.unlock(Address(0x2000)));
    }

    #[test]
    fn unlock_clears_flag() {
        let mut t = table_with(0x1000, "s", SymbolFlags::empty());
        t.lock(Address(0x1000));
        t.unlock(Address(0x1000));
        assert!(
            !t.get(Address(0x1000))
                .unwrap()
                .flags
                .contains(SymbolFlags::LOCKED)
        );
    }

    #[test]
    fn is_string_covers_both_widths() {
        assert!(SymbolFlags::STRING.is_string());
        assert!(SymbolFlags::WIDE_STRING.is_string());
        assert!(!SymbolFlags::FUNCTION.is_string());
    }

    #[test]
    fn undefine_removes() {
        let mut t = table_with(0x1000, "s", SymbolFlags::empty());
        assert!(t.undefine(Address(0x1000)).is_some());
        assert!(t.get(Address(0x1000)).is_none());
        assert!(t.is_empty());
    }
}
