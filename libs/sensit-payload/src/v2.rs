//! Protocol generation 2 codec
//!
//! v2 frames carry no dedicated type field: the mode occupies the low three
//! bits of byte 0 and is always below `0b110`, which is how the dispatcher
//! tells the generations apart.
//!
//! Data frame (LSB-first inside each byte):
//!
//! | Byte | Bits | Field                                            |
//! |------|------|--------------------------------------------------|
//! | 0    | 0-2  | mode                                             |
//! | 0    | 3-4  | uplink period                                    |
//! | 0    | 5-6  | frame trigger                                    |
//! | 0    | 7    | battery MSB                                      |
//! | 1    | 0-3  | battery LSB                                      |
//! | 1    | 4-7  | temperature MSB                                  |
//! | 2    | 0-5  | temperature LSB                                  |
//! | 2    | 6    | reed switch state                                |
//! | 2    |      | whole byte doubles as the light code             |
//! | 3    |      | humidity, event counter or firmware version      |

use sensit_units::{BitField, ExactMatchTable, LinearScale};
use tracing::debug;

use crate::error::{PayloadError, Result};
use crate::scales::{self, put, put_scaled, LIGHT};
use crate::traits::PayloadCodec;
use crate::types::{
    ConfigFrame, Configuration, DataFrame, DoorSensitivity, DoorState, ErrorKind, FirmwareVersion, FrameTrigger,
    Mode, ModeFields, ProtocolVersion, Reading, UplinkPeriod, VibrationState, CONFIG_FRAME_LEN,
};

mod data {
    use super::BitField;

    pub const MODE: BitField = BitField::new(0, 0, 3);
    pub const UPLINK_PERIOD: BitField = BitField::new(0, 3, 2);
    pub const TRIGGER: BitField = BitField::new(0, 5, 2);
    pub const BATTERY_MSB: BitField = BitField::flag(0, 7);
    pub const BATTERY_LSB: BitField = BitField::new(1, 0, 4);
    pub const TEMPERATURE_MSB: BitField = BitField::new(1, 4, 4);
    pub const TEMPERATURE_LSB: BitField = BitField::new(2, 0, 6);
    pub const REED_SWITCH: BitField = BitField::flag(2, 6);
    pub const LIGHT: BitField = BitField::byte(2);
    pub const TAIL: BitField = BitField::byte(3);
}

mod config {
    use super::BitField;

    pub const TEMPERATURE_LOW: BitField = BitField::new(0, 0, 7);
    pub const PERIOD_MSB: BitField = BitField::flag(0, 7);
    pub const TEMPERATURE_HIGH: BitField = BitField::new(1, 0, 7);
    pub const PERIOD_LSB: BitField = BitField::flag(1, 7);
    pub const BRIGHTNESS_LOW: BitField = BitField::byte(2);
    pub const BRIGHTNESS_HIGH: BitField = BitField::byte(3);
    pub const VIBRATION_THRESHOLD: BitField = BitField::byte(4);
    pub const VIBRATION_COUNT: BitField = BitField::byte(5);
    pub const ACC_TRANSIENT: BitField = BitField::byte(6);
    pub const DOOR_LEVEL: BitField = BitField::new(7, 0, 7);
    pub const LIMITED: BitField = BitField::flag(7, 7);
}

/// Accelerometer transient settings byte written by every v2 encode
pub const ACC_TRANSIENT_SETTINGS: u8 = 0x73;

/// Temperature thresholds in °C
pub const TEMPERATURE_THRESHOLD: LinearScale = LinearScale::new(-20, 1, 7);

/// Magnetometer presets by magnitude level
pub const DOOR_PRESETS: ExactMatchTable<u8, DoorSensitivity> = ExactMatchTable::new(&[
    (16, DoorSensitivity::Sensitive),
    (32, DoorSensitivity::Standard),
    (50, DoorSensitivity::NotVerySensitive),
]);

/// Codec for v2 devices
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Codec;

impl V2Codec {
    fn firmware(tail: u8) -> FirmwareVersion {
        FirmwareVersion {
            major: tail >> 4,
            minor: tail & 0x0F,
            patch: 0,
        }
    }
}

impl PayloadCodec for V2Codec {
    const VERSION: ProtocolVersion = ProtocolVersion::V2;

    fn decode_reading(frame: &DataFrame) -> Reading {
        let trigger = FrameTrigger::from_bits(data::TRIGGER.get(frame));
        let battery = (data::BATTERY_MSB.get(frame) << 4) | data::BATTERY_LSB.get(frame);
        let mode_code = data::MODE.get(frame);

        let mut reading = Reading::header(
            Self::VERSION,
            scales::battery_millivolts(battery),
            mode_code,
            trigger == FrameTrigger::Button,
        );
        reading.uplink_period = Some(UplinkPeriod::from_bits(data::UPLINK_PERIOD.get(frame)));
        reading.trigger = Some(trigger);

        let temperature = scales::reading_temperature(
            (u16::from(data::TEMPERATURE_MSB.get(frame)) << 6) | u16::from(data::TEMPERATURE_LSB.get(frame)),
        );
        let tail = data::TAIL.get(frame);
        let alert = trigger == FrameTrigger::Alert;

        let Some(mode) = reading.mode else {
            debug!("v2 frame carries unknown mode {}", mode_code);
            reading.error = ErrorKind::UnknownMode;
            return reading;
        };

        if reading.button {
            reading.fields = ModeFields::ButtonPress {
                temperature,
                firmware: Self::firmware(tail),
            };
            return reading;
        }

        reading.fields = match mode {
            Mode::Standby => ModeFields::Firmware(Self::firmware(tail)),
            Mode::Temperature => ModeFields::Climate {
                temperature,
                humidity: tail,
            },
            Mode::Light => ModeFields::Light {
                brightness: LIGHT.decode(data::LIGHT.get(frame)) as u16,
            },
            Mode::Door => ModeFields::Door {
                state: if alert { DoorState::Movement } else { DoorState::None },
                event_count: tail.into(),
            },
            Mode::Vibration => ModeFields::Vibration {
                state: if alert { VibrationState::Ongoing } else { VibrationState::None },
                event_count: tail.into(),
            },
            Mode::Magnet => ModeFields::Magnet {
                detected: data::REED_SWITCH.get_flag(frame),
                event_count: tail.into(),
            },
        };

        reading
    }

    fn decode_config(frame: &ConfigFrame) -> Configuration {
        let period = (config::PERIOD_MSB.get(frame) << 1) | config::PERIOD_LSB.get(frame);
        let temperature = |field: BitField| TEMPERATURE_THRESHOLD.decode(field.get(frame).into()) as i8;
        let brightness = |field: BitField| LIGHT.decode(field.get(frame)) as u16;

        Configuration {
            limited: config::LIMITED.get_flag(frame),
            period: UplinkPeriod::from_bits(period),
            periodic: None,
            temperature_low: temperature(config::TEMPERATURE_LOW),
            temperature_high: temperature(config::TEMPERATURE_HIGH),
            humidity_low: None,
            humidity_high: None,
            brightness_low: Some(brightness(config::BRIGHTNESS_LOW)),
            brightness_high: Some(brightness(config::BRIGHTNESS_HIGH)),
            brightness_threshold: None,
            vibration: scales::decode_vibration(
                config::VIBRATION_THRESHOLD.get(frame),
                config::VIBRATION_COUNT.get(frame),
            ),
            vibration_clear_delay: None,
            door: scales::decode_door(&DOOR_PRESETS, config::DOOR_LEVEL.get(frame)),
        }
    }

    fn encode_config(cfg: &Configuration) -> Result<ConfigFrame> {
        let version = Self::VERSION;
        PayloadError::reject(&cfg.periodic, "periodic", version)?;
        PayloadError::reject(&cfg.humidity_low, "humidity_low", version)?;
        PayloadError::reject(&cfg.humidity_high, "humidity_high", version)?;
        PayloadError::reject(&cfg.brightness_threshold, "brightness_threshold", version)?;
        PayloadError::reject(&cfg.vibration_clear_delay, "vibration_clear_delay", version)?;
        let brightness_low = PayloadError::required(cfg.brightness_low, "brightness_low", version)?;
        let brightness_high = PayloadError::required(cfg.brightness_high, "brightness_high", version)?;
        let (threshold, count) = scales::encode_vibration(cfg.vibration)?;
        let door_level = scales::encode_door(&DOOR_PRESETS, cfg.door)?;

        let mut frame = [0u8; CONFIG_FRAME_LEN];

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
        let period = cfg.period.bits();
        config::PERIOD_MSB.set_flag(&mut frame, period & 0b10 != 0);
        config::PERIOD_LSB.set_flag(&mut frame, period & 0b01 != 0);

        for (field, value, name) in [
            (config::BRIGHTNESS_LOW, brightness_low, "brightness_low"),
            (config::BRIGHTNESS_HIGH, brightness_high, "brightness_high"),
        ] {
            let code = LIGHT.encode_exact(value.into()).map_err(PayloadError::field(name))?;
            put(&mut frame, field, code, name)?;
        }

        put(&mut frame, config::VIBRATION_THRESHOLD, threshold, "vibration")?;
        put(&mut frame, config::VIBRATION_COUNT, count, "vibration")?;
        put(&mut frame, config::ACC_TRANSIENT, ACC_TRANSIENT_SETTINGS, "acc_transient")?;
        put(&mut frame, config::DOOR_LEVEL, door_level, "door")?;
        config::LIMITED.set_flag(&mut frame, cfg.limited);

        Ok(frame)
    }
}
