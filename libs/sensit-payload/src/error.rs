//! Payload codec error types

use sensit_units::UnitError;
use thiserror::Error;

use crate::types::ProtocolVersion;

/// Result type for payload operations
pub type Result<T> = std::result::Result<T, PayloadError>;

/// Errors raised at the byte boundary and while encoding configurations
///
/// Structural problems inside a well-sized data frame (unknown frame type,
/// unknown mode) are not errors: they are reported through
/// [`ErrorKind`](crate::ErrorKind) on the reading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Invalid {kind} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        kind: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("Unsupported protocol version: {0} (expected 2 or 3)")]
    UnsupportedVersion(u8),

    #[error("Invalid {field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: UnitError,
    },

    #[error("Cannot encode unknown {field} preset")]
    UnknownPreset { field: &'static str },

    #[error("Missing {field}: required by protocol {version}")]
    MissingField {
        field: &'static str,
        version: ProtocolVersion,
    },

    #[error("Unsupported {field}: not carried by protocol {version}")]
    UnsupportedField {
        field: &'static str,
        version: ProtocolVersion,
    },
}

impl PayloadError {
    pub fn invalid_length(kind: &'static str, expected: &'static str, actual: usize) -> Self {
        PayloadError::InvalidLength {
            kind,
            expected,
            actual,
        }
    }

    /// Adapter for `map_err` that tags a unit error with its field name
    pub fn field(field: &'static str) -> impl FnOnce(UnitError) -> Self {
        move |source| PayloadError::Field { field, source }
    }

    /// Unwrap a field the target protocol requires
    pub(crate) fn required<T>(value: Option<T>, field: &'static str, version: ProtocolVersion) -> Result<T> {
        value.ok_or(PayloadError::MissingField { field, version })
    }

    /// Fail when a field the target protocol cannot carry is set
    pub(crate) fn reject<T>(value: &Option<T>, field: &'static str, version: ProtocolVersion) -> Result<()> {
        match value {
            Some(_) => Err(PayloadError::UnsupportedField { field, version }),
            None => Ok(()),
        }
    }
}
