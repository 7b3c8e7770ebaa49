//! Protocol generation 3 codec
//!
//! Data frame (LSB-first inside each byte):
//!
//! | Byte | Bits | Field                                   |
//! |------|------|-----------------------------------------|
//! | 0    | 0-2  | frame type, always `0b110`              |
//! | 0    | 3-7  | battery                                 |
//! | 1    | 0-1  | special (mode dependent)                |
//! | 1    | 2    | button                                  |
//! | 1    | 3-7  | mode                                    |
//! | 2-3  |      | mode dependent payload                  |

use sensit_units::{BitField, ExactMatchTable, LinearScale};
use tracing::debug;

use crate::error::{PayloadError, Result};
use crate::scales::{self, put, put_scaled};
use crate::traits::PayloadCodec;
use crate::types::{
    ConfigFrame, Configuration, DataFrame, DoorSensitivity, DoorState, ErrorKind, FirmwareVersion, Mode,
    ModeFields, PeriodicReports, ProtocolVersion, Reading, UplinkPeriod, VibrationClearDelay, VibrationState,
    CONFIG_FRAME_LEN,
};

/// Type bits identifying a v3 data frame
pub const FRAME_TYPE: u8 = 0b110;

mod data {
    use super::BitField;

    pub const FRAME_TYPE: BitField = BitField::new(0, 0, 3);
    pub const BATTERY: BitField = BitField::new(0, 3, 5);
    pub const SPECIAL: BitField = BitField::new(1, 0, 2);
    pub const BUTTON: BitField = BitField::flag(1, 2);
    pub const MODE: BitField = BitField::new(1, 3, 5);

    // Standby payload
    pub const FW_MINOR_MSB: BitField = BitField::new(2, 0, 4);
    pub const FW_MAJOR: BitField = BitField::new(2, 4, 4);
    pub const FW_PATCH: BitField = BitField::new(3, 0, 6);
    pub const FW_MINOR_LSB: BitField = BitField::new(3, 6, 2);
}

mod config {
    use super::BitField;

    pub const PERIODIC_STANDBY: BitField = BitField::flag(0, 0);
    pub const PERIODIC_TEMPERATURE: BitField = BitField::flag(0, 1);
    pub const PERIODIC_LIGHT: BitField = BitField::flag(0, 2);
    pub const PERIODIC_DOOR: BitField = BitField::flag(0, 3);
    pub const PERIODIC_VIBRATION: BitField = BitField::flag(0, 4);
    pub const PERIODIC_MAGNET: BitField = BitField::flag(0, 5);
    pub const UPLINK_PERIOD: BitField = BitField::new(0, 6, 2);
    pub const TEMPERATURE_LOW: BitField = BitField::new(1, 0, 6);
    pub const TEMPERATURE_HIGH: BitField = BitField::new(2, 0, 6);
    pub const HUMIDITY_HIGH: BitField = BitField::new(3, 0, 4);
    pub const HUMIDITY_LOW: BitField = BitField::new(3, 4, 4);
    pub const BRIGHTNESS: BitField = BitField::new(4, 0, 7);
    pub const LIMITED: BitField = BitField::flag(4, 7);
    pub const VIBRATION_THRESHOLD: BitField = BitField::byte(5);
    pub const VIBRATION_DEBOUNCE: BitField = BitField::new(6, 0, 4);
    pub const VIBRATION_CLEAR_DELAY: BitField = BitField::new(6, 4, 2);
    pub const DOOR_CLOSE: BitField = BitField::new(7, 0, 3);
    pub const DOOR_OPEN: BitField = BitField::new(7, 3, 4);
}

/// Temperature thresholds in °C
pub const TEMPERATURE_THRESHOLD: LinearScale = LinearScale::new(-9, 1, 6);

/// Humidity thresholds in %RH
pub const HUMIDITY_THRESHOLD: LinearScale = LinearScale::new(30, 4, 4);

/// Brightness threshold in raw units
pub const BRIGHTNESS_THRESHOLD: LinearScale = LinearScale::new(1, 5, 7);

/// Magnetometer presets as (close, open) thresholds
pub const DOOR_PRESETS: ExactMatchTable<(u8, u8), DoorSensitivity> = ExactMatchTable::new(&[
    ((4, 2), DoorSensitivity::Sensitive),
    ((4, 7), DoorSensitivity::Standard),
    ((4, 12), DoorSensitivity::NotVerySensitive),
]);

/// Codec for v3 devices
#[derive(Debug, Clone, Copy, Default)]
pub struct V3Codec;

impl V3Codec {
    /// Frame type bits of a data frame
    pub fn frame_type(frame: &DataFrame) -> u8 {
        data::FRAME_TYPE.get(frame)
    }
}

impl PayloadCodec for V3Codec {
    const VERSION: ProtocolVersion = ProtocolVersion::V3;

    fn decode_reading(frame: &DataFrame) -> Reading {
        let mode_code = data::MODE.get(frame);
        let mut reading = Reading::header(
            Self::VERSION,
            scales::battery_millivolts(data::BATTERY.get(frame)),
            mode_code,
            data::BUTTON.get_flag(frame),
        );

        let special = data::SPECIAL.get(frame);
        let counter = u16::from_be_bytes([frame[2], frame[3]]);

        reading.fields = match reading.mode {
            Some(Mode::Standby) => ModeFields::Firmware(FirmwareVersion {
                major: data::FW_MAJOR.get(frame),
                minor: (data::FW_MINOR_MSB.get(frame) << 4) | data::FW_MINOR_LSB.get(frame),
                patch: data::FW_PATCH.get(frame),
            }),
            Some(Mode::Temperature) => ModeFields::Climate {
                temperature: scales::reading_temperature((u16::from(special) << 8) | u16::from(frame[2])),
                humidity: frame[3],
            },
            Some(Mode::Light) => ModeFields::Light { brightness: counter },
            Some(Mode::Door) => ModeFields::Door {
                state: DoorState::from_bits(special),
                event_count: counter,
            },
            Some(Mode::Vibration) => ModeFields::Vibration {
                state: VibrationState::from_bits(special),
                event_count: counter,
            },
            Some(Mode::Magnet) => ModeFields::Magnet {
                detected: special != 0,
                event_count: counter,
            },
            None => {
                debug!("v3 frame carries unknown mode {}", mode_code);
                reading.error = ErrorKind::UnknownMode;
                ModeFields::Unset
            },
        };

        reading
    }

    fn decode_config(frame: &ConfigFrame) -> Configuration {
        let threshold = |field: BitField, scale: &LinearScale| scale.decode(field.get(frame).into());

        Configuration {
            limited: config::LIMITED.get_flag(frame),
            period: UplinkPeriod::from_bits(config::UPLINK_PERIOD.get(frame)),
            periodic: Some(PeriodicReports {
                standby: config::PERIODIC_STANDBY.get_flag(frame),
                temperature: config::PERIODIC_TEMPERATURE.get_flag(frame),
                light: config::PERIODIC_LIGHT.get_flag(frame),
                door: config::PERIODIC_DOOR.get_flag(frame),
                vibration: config::PERIODIC_VIBRATION.get_flag(frame),
                magnet: config::PERIODIC_MAGNET.get_flag(frame),
            }),
            temperature_low: threshold(config::TEMPERATURE_LOW, &TEMPERATURE_THRESHOLD) as i8,
            temperature_high: threshold(config::TEMPERATURE_HIGH, &TEMPERATURE_THRESHOLD) as i8,
            humidity_low: Some(threshold(config::HUMIDITY_LOW, &HUMIDITY_THRESHOLD) as u8),
            humidity_high: Some(threshold(config::HUMIDITY_HIGH, &HUMIDITY_THRESHOLD) as u8),
            brightness_low: None,
            brightness_high: None,
            brightness_threshold: Some(threshold(config::BRIGHTNESS, &BRIGHTNESS_THRESHOLD) as u16),
            vibration: scales::decode_vibration(
                config::VIBRATION_THRESHOLD.get(frame),
                config::VIBRATION_DEBOUNCE.get(frame),
            ),
            vibration_clear_delay: Some(VibrationClearDelay::from_bits(
                config::VIBRATION_CLEAR_DELAY.get(frame),
            )),
            door: scales::decode_door(
                &DOOR_PRESETS,
                (config::DOOR_CLOSE.get(frame), config::DOOR_OPEN.get(frame)),
            ),
        }
    }

    fn encode_config(cfg: &Configuration) -> Result<ConfigFrame> {
        let version = Self::VERSION;
        PayloadError::reject(&cfg.brightness_low, "brightness_low", version)?;
        PayloadError::reject(&cfg.brightness_high, "brightness_high", version)?;
        let periodic = PayloadError::required(cfg.periodic, "periodic", version)?;
        let humidity_low = PayloadError::required(cfg.humidity_low, "humidity_low", version)?;
        let humidity_high = PayloadError::required(cfg.humidity_high, "humidity_high", version)?;
        let brightness = PayloadError::required(cfg.brightness_threshold, "brightness_threshold", version)?;
        let clear_delay = PayloadError::required(cfg.vibration_clear_delay, "vibration_clear_delay", version)?;
        let (threshold, debounce) = scales::encode_vibration(cfg.vibration)?;
        let (close, open) = scales::encode_door(&DOOR_PRESETS, cfg.door)?;

        let mut frame = [0u8; CONFIG_FRAME_LEN];

        config::PERIODIC_STANDBY.set_flag(&mut frame, periodic.standby);
        config::PERIODIC_TEMPERATURE.set_flag(&mut frame, periodic.temperature);
        config::PERIODIC_LIGHT.set_flag(&mut frame, periodic.light);
        config::PERIODIC_DOOR.set_flag(&mut frame, periodic.door);
        config::PERIODIC_VIBRATION.set_flag(&mut frame, periodic.vibration);
        config::PERIODIC_MAGNET.set_flag(&mut frame, periodic.magnet);
        put(&mut frame, config::UPLINK_PERIOD, cfg.period.bits(), "period")?;

        put_scaled(
            &mut frame,
            config::TEMPERATURE_LOW,
            &TEMPERATURE_THRESHOLD,
            cfg.temperature_low.into(),
            "temperature_low",
        )?;
        put_scaled(
            &mut frame,
            config::TEMPERATURE_HIGH,
            &TEMPERATURE_THRESHOLD,
            cfg.temperature_high.into(),
            "temperature_high",
        )?;
        put_scaled(
            &mut frame,
            config::HUMIDITY_LOW,
            &HUMIDITY_THRESHOLD,
            humidity_low.into(),
            "humidity_low",
        )?;
        put_scaled(
            &mut frame,
            config::HUMIDITY_HIGH,
            &HUMIDITY_THRESHOLD,
            humidity_high.into(),
            "humidity_high",
        )?;
        put_scaled(
            &mut frame,
            config::BRIGHTNESS,
            &BRIGHTNESS_THRESHOLD,
            brightness.into(),
            "brightness_threshold",
        )?;
        config::LIMITED.set_flag(&mut frame, cfg.limited);

        put(&mut frame, config::VIBRATION_THRESHOLD, threshold, "vibration")?;
        put(&mut frame, config::VIBRATION_DEBOUNCE, debounce, "vibration")?;
        put(&mut frame, config::VIBRATION_CLEAR_DELAY, clear_delay.bits(), "vibration_clear_delay")?;
        put(&mut frame, config::DOOR_CLOSE, close, "door")?;
        put(&mut frame, config::DOOR_OPEN, open, "door")?;

        Ok(frame)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::types::VibrationSensitivity;
    use tracing_test::traced_test;

    fn sample_config() -> Configuration {
        Configuration {
            limited: true,
            period: UplinkPeriod::OneHour,
            periodic: Some(PeriodicReports {
                temperature: true,
                light: true,
                ..PeriodicReports::default()
            }),
            temperature_low: -9,
            temperature_high: 54,
            humidity_low: Some(30),
            humidity_high: Some(90),
            brightness_low: None,
            brightness_high: None,
            brightness_threshold: Some(1),
            vibration: VibrationSensitivity::Standard,
            vibration_clear_delay: Some(VibrationClearDelay::EndOfVibrationMessage),
            door: DoorSensitivity::Standard,
        }
    }

    #[test]
    fn test_decode_light_frame() {
        let reading = V3Codec::decode_reading(&[0xF6, 0x10, 0x00, 0x65]);

        assert_eq!(reading.version, Some(ProtocolVersion::V3));
        assert_eq!(reading.error, ErrorKind::None);
        assert_eq!(reading.battery_mv, 4200);
        assert_eq!(reading.mode, Some(Mode::Light));
        assert!(!reading.button);
        assert_eq!(reading.fields, ModeFields::Light { brightness: 101 });
    }

    #[test]
    fn test_decode_temperature_frame() {
        let reading = V3Codec::decode_reading(&[0xF6, 0x09, 0x74, 0x4F]);

        assert_eq!(reading.mode, Some(Mode::Temperature));
        assert_eq!(
            reading.fields,
            ModeFields::Climate {
                temperature: 172,
                humidity: 79
            }
        );
        assert_eq!(reading.temperature_celsius(), Some(21.5));
        assert_eq!(reading.humidity_percent(), Some(39.5));
    }

    #[test]
    fn test_decode_standby_firmware() {
        // major 2, minor (0x1 << 4) | 0b10, patch 5
        let reading = V3Codec::decode_reading(&[0x06, 0x04, 0x21, 0x85]);

        assert_eq!(reading.battery_mv, 2700);
        assert!(reading.button);
        assert_eq!(
            reading.firmware(),
            Some(FirmwareVersion {
                major: 2,
                minor: 18,
                patch: 5
            })
        );
    }

    #[test]
    fn test_decode_door_states() {
        let states = [DoorState::None, DoorState::Movement, DoorState::Close, DoorState::Open];
        for (special, expected) in states.iter().enumerate() {
            let frame = [0x06, (3 << 3) | special as u8, 0x01, 0x02];
            let reading = V3Codec::decode_reading(&frame);
            assert_eq!(
                reading.fields,
                ModeFields::Door {
                    state: *expected,
                    event_count: 0x0102
                },
                "Failed for special bits: {}",
                special
            );
        }
    }

    #[test]
    fn test_decode_vibration_keeps_unnamed_states() {
        let reading = V3Codec::decode_reading(&[0x06, (4 << 3) | 0b11, 0x00, 0x07]);
        assert_eq!(
            reading.fields,
            ModeFields::Vibration {
                state: VibrationState::Other(3),
                event_count: 7
            }
        );
    }

    #[test]
    fn test_decode_unknown_mode() {
        let reading = V3Codec::decode_reading(&[0x06, 0x34, 0x12, 0x34]);

        assert_eq!(reading.error, ErrorKind::UnknownMode);
        assert_eq!(reading.mode, None);
        assert_eq!(reading.mode_code, Some(6));
        assert!(reading.button);
        assert_eq!(reading.fields, ModeFields::Unset);
    }

    #[test]
    fn test_decode_config_sample() {
        let frame = [0x46, 0x00, 0x3F, 0x0F, 0x80, 0x04, 0x02, 0x3C];
        assert_eq!(V3Codec::decode_config(&frame), sample_config());
    }

    #[test]
    fn test_encode_config_sample() {
        let frame = V3Codec::encode_config(&sample_config()).unwrap();
        assert_eq!(frame, [0x46, 0x00, 0x3F, 0x0F, 0x80, 0x04, 0x02, 0x3C]);
    }

    #[test]
    fn test_encode_rejects_off_grid_humidity() {
        let config = Configuration {
            humidity_low: Some(31),
            ..sample_config()
        };
        let err = V3Codec::encode_config(&config).unwrap_err();
        assert!(matches!(err, PayloadError::Field { field: "humidity_low", .. }));
    }

    #[test]
    fn test_encode_rejects_out_of_range_temperature() {
        let config = Configuration {
            temperature_high: 55,
            ..sample_config()
        };
        let err = V3Codec::encode_config(&config).unwrap_err();
        assert!(matches!(err, PayloadError::Field { field: "temperature_high", .. }));
    }

    #[test]
    fn test_encode_rejects_v2_only_fields() {
        let config = Configuration {
            brightness_high: Some(960),
            ..sample_config()
        };
        assert_eq!(
            V3Codec::encode_config(&config).unwrap_err(),
            PayloadError::UnsupportedField {
                field: "brightness_high",
                version: ProtocolVersion::V3
            }
        );
    }

    #[test]
    fn test_encode_requires_periodic_switches() {
        let config = Configuration {
            periodic: None,
            ..sample_config()
        };
        assert!(matches!(
            V3Codec::encode_config(&config),
            Err(PayloadError::MissingField { field: "periodic", .. })
        ));
    }

    #[test]
    fn test_encode_rejects_unknown_presets() {
        let config = Configuration {
            door: DoorSensitivity::Unknown,
            ..sample_config()
        };
        assert_eq!(
            V3Codec::encode_config(&config).unwrap_err(),
            PayloadError::UnknownPreset { field: "door" }
        );
    }

    #[test]
    fn test_door_presets_roundtrip() {
        for (_, preset) in DOOR_PRESETS.entries() {
            let config = Configuration {
                door: *preset,
                ..sample_config()
            };
            let frame = V3Codec::encode_config(&config).unwrap();
            assert_eq!(V3Codec::decode_config(&frame).door, *preset);
        }
    }

    #[test]
    fn test_unmatched_door_thresholds_decode_unknown() {
        // byte 7: close in bits 0-2, open in bits 3-6
        let test_cases = [
            (0x15, "close 5, open 2"),
            (0x1C, "close 4, open 3"),
            (0x3C | 0x40, "standard pair with bit 6 set"),
            (0x00, "all zero"),
        ];

        for (door_byte, case) in test_cases {
            let frame = [0x46, 0x00, 0x3F, 0x0F, 0x80, 0x04, 0x02, door_byte];
            assert_eq!(
                V3Codec::decode_config(&frame),
                Configuration {
                    door: DoorSensitivity::Unknown,
                    ..sample_config()
                },
                "Failed for {}",
                case
            );
        }
    }

    #[test]
    #[traced_test]
    fn test_unmatched_presets_keep_other_fields() {
        // vibration (5, 2) and door (5, 2) both miss their tables
        let config = V3Codec::decode_config(&[0x46, 0x00, 0x3F, 0x0F, 0x80, 0x05, 0x02, 0x15]);

        assert_eq!(
            config,
            Configuration {
                vibration: VibrationSensitivity::Unknown,
                door: DoorSensitivity::Unknown,
                ..sample_config()
            }
        );
        assert!(logs_contain("Door thresholds"));
        assert!(logs_contain("Vibration thresholds"));
    }
}
