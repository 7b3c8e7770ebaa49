//! Codec trait implemented once per protocol generation

use crate::error::Result;
use crate::types::{ConfigFrame, Configuration, DataFrame, ProtocolVersion, Reading};

/// Fixed-size frame codec for one protocol generation
///
/// Decoding a well-sized frame never fails: every bit pattern maps to a
/// reading or configuration, with structural problems reported in-band.
/// Encoding fails fast on values the frame cannot represent.
pub trait PayloadCodec {
    /// Generation handled by this codec
    const VERSION: ProtocolVersion;

    fn decode_reading(frame: &DataFrame) -> Reading;

    fn decode_config(frame: &ConfigFrame) -> Configuration;

    fn encode_config(config: &Configuration) -> Result<ConfigFrame>;
}
