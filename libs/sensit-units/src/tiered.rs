//! Piecewise exponential (tiered) scale
//!
//! One byte holds a 2-bit tier in its top bits and a 6-bit mantissa in its
//! low bits. The engineering value is `mantissa * multiplier[tier]`, which
//! trades precision for range: every tier covers 64 grid points of its own
//! step. Encoding picks the smallest tier whose mantissa range covers the
//! value and floors the value onto that tier's step.

use crate::error::{Result, UnitError};

const MANTISSA_BITS: u8 = 6;
const MANTISSA_MASK: u8 = (1 << MANTISSA_BITS) - 1;

/// Byte-wide tiered scale with four exponent tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TieredScale {
    multipliers: [u32; 4],
}

impl TieredScale {
    /// Multipliers must be strictly increasing
    pub const fn new(multipliers: [u32; 4]) -> Self {
        assert!(multipliers[0] > 0, "Tier multiplier must be positive");
        assert!(multipliers[0] < multipliers[1]);
        assert!(multipliers[1] < multipliers[2]);
        assert!(multipliers[2] < multipliers[3]);
        Self { multipliers }
    }

    pub const fn multipliers(&self) -> [u32; 4] {
        self.multipliers
    }

    /// Largest mantissa of any tier
    pub const fn max_mantissa(&self) -> u32 {
        MANTISSA_MASK as u32
    }

    /// Largest value accepted by `encode` (floors onto 63 * top multiplier)
    pub const fn max_value(&self) -> u32 {
        (self.max_mantissa() + 1) * self.multipliers[3] - 1
    }

    /// Byte code to engineering value
    #[inline]
    pub fn decode(&self, code: u8) -> u32 {
        let tier = (code >> MANTISSA_BITS) as usize;
        let mantissa = (code & MANTISSA_MASK) as u32;
        mantissa * self.multipliers[tier]
    }

    /// Engineering value to byte code
    ///
    /// Values that are not a multiple of the chosen tier's step are floored
    /// onto it; values beyond the top tier are rejected.
    pub fn encode(&self, value: u32) -> Result<u8> {
        for (tier, multiplier) in self.multipliers.iter().enumerate() {
            let mantissa = value / multiplier;
            if mantissa <= self.max_mantissa() {
                return Ok(((tier as u8) << MANTISSA_BITS) | mantissa as u8);
            }
        }

        Err(UnitError::out_of_range(value, 0, self.max_value()))
    }

    /// Like [`encode`](Self::encode), but rejects values that would be floored
    pub fn encode_exact(&self, value: u32) -> Result<u8> {
        let code = self.encode(value)?;
        if self.decode(code) != value {
            let step = self.multipliers[(code >> MANTISSA_BITS) as usize];
            return Err(UnitError::OffGrid {
                value: value.into(),
                offset: 0,
                step: step.into(),
            });
        }
        Ok(code)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    const LIGHT: TieredScale = TieredScale::new([1, 8, 64, 1024]);

    #[test]
    fn test_decode_tiers() {
        assert_eq!(LIGHT.decode(0x2A), 42);
        assert_eq!(LIGHT.decode(0x40 | 5), 40);
        assert_eq!(LIGHT.decode(0x80 | 15), 960);
        assert_eq!(LIGHT.decode(0xC0 | 63), 64512);
    }

    #[test]
    fn test_encode_picks_smallest_tier() {
        assert_eq!(LIGHT.encode(0).unwrap(), 0x00);
        assert_eq!(LIGHT.encode(63).unwrap(), 0x3F);
        assert_eq!(LIGHT.encode(64).unwrap(), 0x48);
        assert_eq!(LIGHT.encode(504).unwrap(), 0x7F);
        assert_eq!(LIGHT.encode(512).unwrap(), 0x88);
        assert_eq!(LIGHT.encode(960).unwrap(), 0x8F);
        assert_eq!(LIGHT.encode(4096).unwrap(), 0xC4);
    }

    #[test]
    fn test_encode_floors_within_tier() {
        // 100 lands in the x8 tier: 100 / 8 = 12 -> 96
        let code = LIGHT.encode(100).unwrap();
        assert_eq!(code, 0x40 | 12);
        assert_eq!(LIGHT.decode(code), 96);
    }

    #[test]
    fn test_encode_exact_rejects_flooring() {
        assert_eq!(LIGHT.encode_exact(960).unwrap(), 0x8F);
        assert_eq!(
            LIGHT.encode_exact(100).unwrap_err(),
            UnitError::OffGrid {
                value: 100,
                offset: 0,
                step: 8
            }
        );
    }

    #[test]
    fn test_encode_top_of_range() {
        assert_eq!(LIGHT.max_value(), 65535);
        assert_eq!(LIGHT.encode(65535).unwrap(), 0xFF);
        assert!(LIGHT.encode(65536).is_err());
    }
}
