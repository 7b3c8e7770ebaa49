//! Protocol detection and routing to the per-generation codecs

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::traits::PayloadCodec;
use crate::types::{ConfigFrame, Configuration, DataFrame, ProtocolVersion, Reading};
use crate::v2::V2Codec;
use crate::v3::{self, V3Codec};

/// Protocol generation of a data frame, from its type bits
///
/// `0b110` marks v3. Any lower value is a v2 mode field. `0b111` is reserved
/// and matches no generation.
pub fn detect_version(frame: &DataFrame) -> Option<ProtocolVersion> {
    let frame_type = V3Codec::frame_type(frame);
    match frame_type.cmp(&v3::FRAME_TYPE) {
        std::cmp::Ordering::Equal => Some(ProtocolVersion::V3),
        std::cmp::Ordering::Less => Some(ProtocolVersion::V2),
        std::cmp::Ordering::Greater => None,
    }
}

/// Decode a data frame with the codec its type bits select
pub fn decode_reading(frame: &DataFrame) -> Reading {
    trace!("Decoding data frame {:02X?}", frame);
    match detect_version(frame) {
        Some(ProtocolVersion::V3) => V3Codec::decode_reading(frame),
        Some(ProtocolVersion::V2) => V2Codec::decode_reading(frame),
        None => {
            debug!("Data frame type {:#05b} matches no protocol", V3Codec::frame_type(frame));
            Reading::unknown_frame_type()
        },
    }
}

pub fn decode_config(frame: &ConfigFrame, version: ProtocolVersion) -> Configuration {
    trace!("Decoding {} config frame {:02X?}", version, frame);
    match version {
        ProtocolVersion::V2 => V2Codec::decode_config(frame),
        ProtocolVersion::V3 => V3Codec::decode_config(frame),
    }
}

pub fn encode_config(config: &Configuration, version: ProtocolVersion) -> Result<ConfigFrame> {
    let frame = match version {
        ProtocolVersion::V2 => V2Codec::encode_config(config)?,
        ProtocolVersion::V3 => V3Codec::encode_config(config)?,
    };
    debug!("Encoded {} config frame {:02X?}", version, frame);
    Ok(frame)
}

/// A data frame, optionally followed by the device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uplink {
    pub reading: Reading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Configuration>,
}

/// Decode a data frame and the configuration frame sent with it
///
/// The configuration is interpreted with the generation detected from the
/// data frame; it is dropped when that generation is unknown.
pub fn decode_uplink(data: &DataFrame, config: Option<&ConfigFrame>) -> Uplink {
    let reading = decode_reading(data);
    let config = config.and_then(|frame| match reading.version {
        Some(version) => Some(decode_config(frame, version)),
        None => {
            warn!("Skipping config frame: data frame matches no protocol");
            None
        },
    });

    Uplink { reading, config }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    #[test]
    fn test_detect_version_by_type_bits() {
        for type_bits in 0..=7u8 {
            let frame = [type_bits, 0, 0, 0];
            let expected = match type_bits {
                6 => Some(ProtocolVersion::V3),
                7 => None,
                _ => Some(ProtocolVersion::V2),
            };
            assert_eq!(detect_version(&frame), expected, "Failed for type bits: {:03b}", type_bits);
        }
    }

    #[test]
    fn test_unknown_frame_type() {
        let reading = decode_reading(&[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(reading.error, ErrorKind::UnknownFrameType);
        assert_eq!(reading.version, None);
        assert_eq!(reading.mode, None);
        assert_eq!(reading.mode_code, None);
        assert_eq!(reading, Reading::unknown_frame_type());
    }

    #[test]
    fn test_uplink_skips_config_for_unknown_frame() {
        let uplink = decode_uplink(&[0x07, 0, 0, 0], Some(&[0; 8]));
        assert_eq!(uplink.config, None);
    }

    #[test]
    fn test_uplink_decodes_config_with_detected_version() {
        let uplink = decode_uplink(
            &[0xF6, 0x10, 0x00, 0x65],
            Some(&[0x46, 0x00, 0x3F, 0x0F, 0x80, 0x04, 0x02, 0x3C]),
        );
        let config = uplink.config.expect("v3 config");
        assert_eq!(config.humidity_high, Some(90));
        assert_eq!(config.brightness_low, None);
    }
}
