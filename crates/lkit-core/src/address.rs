#![forbid(unsafe_code)]

//! Address newtype and fixed-width hex formatting.
//!
//! Addresses are the total order key of the listing document. They are
//! plain `u64` values wrapped for type safety; the architecture word
//! size only matters when *formatting* an address for display, which is
//! why [`Address::to_hex`] takes the bit width as an argument instead of
//! storing it.

use core::fmt;

/// An address in the analyzed binary.
///
/// Ordering is numeric. Two listing items may carry the same address
/// (identity is by [`ItemId`](crate::ItemId), not by address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address(pub u64);

impl Address {
    /// Format as lowercase hex, zero-padded to the architecture word
    /// size (`bits / 4` digits).
    ///
    /// Widths outside `{8, 16, 32, 64}` fall back to 64 bits rather
    /// than producing a ragged column.
    ///
    /// # Example
    ///
    /// ```
    /// use lkit_core::Address;
    ///
    /// assert_eq!(Address(0x401000).to_hex(32), "00401000");
    /// assert_eq!(Address(0xff).to_hex(16), "00ff");
    /// ```
    #[must_use]
    pub fn to_hex(self, bits: u8) -> String {
        let digits = match bits {
            8 => 2,
            16 => 4,
            32 => 8,
            _ => 16,
        };
        format!("{:0width$x}", self.0, width = digits)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
