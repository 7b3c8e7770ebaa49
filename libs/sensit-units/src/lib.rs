//! Sens'it Unit Conversion Library
//!
//! Shared primitives used by every protocol generation of the Sens'it codec.
//!
//! # Architecture
//!
//! This library provides:
//! - **Bit fields**: LSB-first named fields over packed frames
//! - **Linear scales**: `raw * step + offset` mappings with strict inverse
//! - **Exact-match tables**: named presets keyed by canonical raw values
//! - **Tiered scales**: 2-bit exponent + 6-bit mantissa light encoding
//!
//! Nothing in here knows about a particular frame layout; the payload crate
//! composes these pieces per protocol version.

pub mod bit_ops;
pub mod error;
pub mod lookup;
pub mod scale;
pub mod tiered;

pub use bit_ops::BitField;
pub use error::{Result, UnitError};
pub use lookup::ExactMatchTable;
pub use scale::LinearScale;
pub use tiered::TieredScale;
