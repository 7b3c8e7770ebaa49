//! Unit conversion error types

use thiserror::Error;

/// Result type for sensit-units operations
pub type Result<T> = std::result::Result<T, UnitError>;

/// Errors raised when an engineering value cannot be packed into its raw code
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// Value lies outside the representable range of the scale
    #[error("Value {value} out of range [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },

    /// Value is inside the range but not reachable by a whole number of steps
    #[error("Value {value} is not on the grid of step {step} from offset {offset}")]
    OffGrid { value: i64, offset: i64, step: i64 },

    /// Raw code does not fit the width of its bit field
    #[error("Raw value {value} does not fit in {width} bits")]
    Overflow { value: u32, width: u8 },
}

impl UnitError {
    pub fn out_of_range(value: impl Into<i64>, min: impl Into<i64>, max: impl Into<i64>) -> Self {
        UnitError::OutOfRange {
            value: value.into(),
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn overflow(value: u32, width: u8) -> Self {
        UnitError::Overflow { value, width }
    }
}
