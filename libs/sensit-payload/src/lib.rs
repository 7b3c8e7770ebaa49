//! Sens'it Payload Codec
//!
//! Decodes the 4-byte data frames and 8-byte configuration frames sent by
//! Sens'it devices of protocol generations 2 and 3, and encodes
//! configurations back into downlink frames.
//!
//! # Layout
//!
//! - [`types`]: unified reading and configuration model
//! - [`v2`] / [`v3`]: one [`PayloadCodec`] per generation
//! - [`dispatch`]: generation detection and routing
//!
//! The functions at the crate root take byte slices and integer protocol
//! versions, the shape in which frames arrive from network backends.
//!
//! # Example
//!
//! ```
//! use sensit_payload::{parse_reading, Mode};
//!
//! let reading = parse_reading(&[0xF6, 0x10, 0x00, 0x65]).unwrap();
//! assert_eq!(reading.mode, Some(Mode::Light));
//! assert_eq!(reading.battery_mv, 4200);
//! ```

pub mod dispatch;
pub mod error;
pub mod scales;
pub mod traits;
pub mod types;
pub mod v2;
pub mod v3;

pub use dispatch::{decode_config, decode_reading, decode_uplink, detect_version, encode_config, Uplink};
pub use error::{PayloadError, Result};
pub use traits::PayloadCodec;
pub use types::{
    ConfigFrame, Configuration, DataFrame, DoorSensitivity, DoorState, ErrorKind, FirmwareVersion, FrameTrigger,
    Mode, ModeFields, PeriodicReports, ProtocolVersion, Reading, UplinkPeriod, VibrationClearDelay,
    VibrationSensitivity, VibrationState, CONFIG_FRAME_LEN, DATA_FRAME_LEN,
};
pub use v2::V2Codec;
pub use v3::V3Codec;

fn data_frame(bytes: &[u8]) -> Result<DataFrame> {
    bytes
        .try_into()
        .map_err(|_| PayloadError::invalid_length("data frame", "4", bytes.len()))
}

fn config_frame(bytes: &[u8]) -> Result<ConfigFrame> {
    bytes
        .try_into()
        .map_err(|_| PayloadError::invalid_length("config frame", "8", bytes.len()))
}

/// Decode a data frame received as a byte slice
pub fn parse_reading(bytes: &[u8]) -> Result<Reading> {
    Ok(decode_reading(&data_frame(bytes)?))
}

/// Decode a configuration frame for protocol version 2 or 3
pub fn parse_config(bytes: &[u8], version: u8) -> Result<Configuration> {
    let version = ProtocolVersion::try_from(version)?;
    Ok(decode_config(&config_frame(bytes)?, version))
}

/// Encode a configuration for protocol version 2 or 3
pub fn serialize_config(config: &Configuration, version: u8) -> Result<ConfigFrame> {
    encode_config(config, ProtocolVersion::try_from(version)?)
}

/// Decode a 4-byte data frame or a 12-byte data + configuration uplink
pub fn parse_uplink(bytes: &[u8]) -> Result<Uplink> {
    match bytes.len() {
        DATA_FRAME_LEN => Ok(decode_uplink(&data_frame(bytes)?, None)),
        len if len == DATA_FRAME_LEN + CONFIG_FRAME_LEN => {
            let (data, config) = bytes.split_at(DATA_FRAME_LEN);
            Ok(decode_uplink(&data_frame(data)?, Some(&config_frame(config)?)))
        },
        len => Err(PayloadError::invalid_length("uplink", "4 or 12", len)),
    }
}
