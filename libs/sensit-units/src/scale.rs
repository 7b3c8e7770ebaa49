//! Linear offset/step scales
//!
//! A raw code `r` of `width` bits represents the engineering value
//! `r * step + offset`. Encoding is the strict inverse: values outside the
//! code space or between two grid points are rejected instead of being
//! wrapped or truncated into a neighbouring code.

use crate::error::{Result, UnitError};

/// Linear mapping between a `width`-bit raw code and an engineering value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinearScale {
    pub offset: i32,
    pub step: i32,
    pub width: u8,
}

impl LinearScale {
    pub const fn new(offset: i32, step: i32, width: u8) -> Self {
        assert!(step > 0, "Scale step must be positive");
        assert!(width > 0 && width <= 16, "Scale width must be 1..=16 bits");
        Self {
            offset,
            step,
            width,
        }
    }

    /// Largest raw code
    pub const fn max_raw(&self) -> u32 {
        (1u32 << self.width) - 1
    }

    /// Smallest representable engineering value
    pub const fn min(&self) -> i32 {
        self.offset
    }

    /// Largest representable engineering value
    pub const fn max(&self) -> i32 {
        self.offset + self.step * self.max_raw() as i32
    }

    /// Raw code to engineering value
    #[inline]
    pub fn decode(&self, raw: u32) -> i32 {
        debug_assert!(raw <= self.max_raw(), "Raw code {} wider than {} bits", raw, self.width);
        raw as i32 * self.step + self.offset
    }

    /// Engineering value to raw code
    pub fn encode(&self, value: i32) -> Result<u32> {
        if value < self.min() || value > self.max() {
            return Err(UnitError::out_of_range(value, self.min(), self.max()));
        }

        let delta = value - self.offset;
        if delta % self.step != 0 {
            return Err(UnitError::OffGrid {
                value: value.into(),
                offset: self.offset.into(),
                step: self.step.into(),
            });
        }

        Ok((delta / self.step) as u32)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    const BATTERY: LinearScale = LinearScale::new(2700, 50, 5);
    const HUMIDITY: LinearScale = LinearScale::new(30, 4, 4);
    const TEMPERATURE: LinearScale = LinearScale::new(-9, 1, 6);

    #[test]
    fn test_bounds() {
        assert_eq!(BATTERY.min(), 2700);
        assert_eq!(BATTERY.max(), 4250);
        assert_eq!(HUMIDITY.max(), 90);
        assert_eq!(TEMPERATURE.min(), -9);
        assert_eq!(TEMPERATURE.max(), 54);
    }

    #[test]
    fn test_decode() {
        assert_eq!(BATTERY.decode(0), 2700);
        assert_eq!(BATTERY.decode(30), 4200);
        assert_eq!(TEMPERATURE.decode(9), 0);
        assert_eq!(HUMIDITY.decode(15), 90);
    }

    #[test]
    fn test_encode_inverse() {
        assert_eq!(TEMPERATURE.encode(-9).unwrap(), 0);
        assert_eq!(TEMPERATURE.encode(54).unwrap(), 63);
        assert_eq!(HUMIDITY.encode(50).unwrap(), 5);
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert_eq!(
            TEMPERATURE.encode(-10).unwrap_err(),
            UnitError::OutOfRange {
                value: -10,
                min: -9,
                max: 54
            }
        );
        assert!(TEMPERATURE.encode(55).is_err());
        assert!(HUMIDITY.encode(94).is_err());
    }

    #[test]
    fn test_encode_rejects_off_grid() {
        assert_eq!(
            HUMIDITY.encode(32).unwrap_err(),
            UnitError::OffGrid {
                value: 32,
                offset: 30,
                step: 4
            }
        );
        assert!(HUMIDITY.encode(31).is_err());
        assert_eq!(HUMIDITY.encode(34).unwrap(), 1);
    }

    #[test]
    fn test_every_code_roundtrips() {
        for scale in [BATTERY, HUMIDITY, TEMPERATURE] {
            for raw in 0..=scale.max_raw() {
                assert_eq!(scale.encode(scale.decode(raw)).unwrap(), raw);
            }
        }
    }
}
