//! Bit fields of packed device frames
//!
//! Bits are allocated LSB-first inside each byte: bit 0 of a field sits on
//! the least significant bit of its byte, and a field declared after it
//! occupies the next higher bits. This is the allocation the device firmware
//! uses for its packed frame structs, so every layout in the payload crate is
//! expressed with it.

use crate::error::{Result, UnitError};

/// A named field inside one byte of a packed frame
///
/// `offset` counts from the least significant bit of `byte`. Fields never
/// straddle a byte boundary; values split across bytes (battery MSB/LSB,
/// temperature MSB/LSB, ...) are declared as two fields and reassembled by
/// the codec that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    pub byte: usize,
    pub offset: u8,
    pub width: u8,
}

impl BitField {
    /// Declare a field; panics at compile time when used in a `const` and
    /// the field does not fit in a single byte.
    pub const fn new(byte: usize, offset: u8, width: u8) -> Self {
        assert!(width > 0, "Bit field must be at least one bit wide");
        assert!(offset + width <= 8, "Bit field must fit in one byte");
        Self {
            byte,
            offset,
            width,
        }
    }

    /// Whole-byte field
    pub const fn byte(byte: usize) -> Self {
        Self::new(byte, 0, 8)
    }

    /// Single-bit field
    pub const fn flag(byte: usize, offset: u8) -> Self {
        Self::new(byte, offset, 1)
    }

    /// Largest raw value the field can hold
    pub const fn max_value(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    #[inline]
    fn mask(&self) -> u8 {
        self.max_value() << self.offset
    }

    /// Read the field's raw value; a byte past the end of `bytes` reads as zero
    #[inline]
    pub fn get(&self, bytes: &[u8]) -> u8 {
        bytes.get(self.byte).map_or(0, |b| (b & self.mask()) >> self.offset)
    }

    /// Read a field as a boolean (any non-zero value is `true`)
    #[inline]
    pub fn get_flag(&self, bytes: &[u8]) -> bool {
        self.get(bytes) != 0
    }

    /// Write the field's raw value, rejecting values wider than the field
    ///
    /// Writing past the end of `bytes` leaves the buffer untouched.
    pub fn set(&self, bytes: &mut [u8], value: u8) -> Result<()> {
        if value > self.max_value() {
            return Err(UnitError::overflow(value as u32, self.width));
        }
        self.write(bytes, value);
        Ok(())
    }

    /// Write a boolean into the field's lowest bit
    #[inline]
    pub fn set_flag(&self, bytes: &mut [u8], value: bool) {
        self.write(bytes, value as u8);
    }

    #[inline]
    fn write(&self, bytes: &mut [u8], value: u8) {
        if let Some(b) = bytes.get_mut(self.byte) {
            *b = (*b & !self.mask()) | ((value << self.offset) & self.mask());
        }
    }
}
