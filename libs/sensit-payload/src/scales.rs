//! Scales, preset tables and field helpers shared by both protocol generations

use sensit_units::{BitField, ExactMatchTable, LinearScale, TieredScale};
use tracing::warn;

use crate::error::{PayloadError, Result};
use crate::types::{DoorSensitivity, VibrationSensitivity};

/// Battery voltage in millivolts: 2.7 V plus 50 mV per step
pub const BATTERY: LinearScale = LinearScale::new(2700, 50, 5);

/// Temperature in eighths of a degree, offset by -25 °C
pub const READING_TEMPERATURE: LinearScale = LinearScale::new(-200, 1, 10);

/// v2 brightness: light code to raw sensor units
pub const LIGHT: TieredScale = TieredScale::new([1, 8, 64, 1024]);

/// Raw brightness units per lux
pub const UNITS_PER_LUX: f32 = 96.0;

/// Accelerometer presets as (threshold, debounce) pairs
pub const VIBRATION_PRESETS: ExactMatchTable<(u8, u8), VibrationSensitivity> = ExactMatchTable::new(&[
    ((1, 1), VibrationSensitivity::VerySensitive),
    ((3, 1), VibrationSensitivity::Sensitive),
    ((4, 2), VibrationSensitivity::Standard),
    ((8, 2), VibrationSensitivity::NotVerySensitive),
    ((16, 3), VibrationSensitivity::VeryLittleSensitive),
]);

pub fn battery_millivolts(raw: u8) -> u16 {
    BATTERY.decode(raw.into()) as u16
}

pub fn reading_temperature(raw: u16) -> i16 {
    READING_TEMPERATURE.decode(raw.into()) as i16
}

/// Remaining energy estimate for a Li-ion cell, 0..=100
///
/// Piecewise linear over three voltage bands. Voltages above 4.2 V count as
/// full and voltages below 2.7 V as empty. The vendor curve reports 0 % above
/// 4.2 V (raw level 31, 4250 mV); this deliberately reports 100 % instead.
pub fn battery_percentage(millivolts: u16) -> u8 {
    let mv = u32::from(millivolts);
    let percent = match mv {
        4201.. => 100,
        3900..=4200 => (mv - 3200) / 10,
        3600..=3899 => ((mv - 3480) * 2 + 6) / 12,
        2700..=3599 => ((mv - 2700) * 2 + 30) / 60,
        _ => 0,
    };
    percent.min(100) as u8
}

pub fn decode_vibration(threshold: u8, debounce: u8) -> VibrationSensitivity {
    VIBRATION_PRESETS.classify((threshold, debounce)).unwrap_or_else(|| {
        warn!(
            "Vibration thresholds ({}, {}) match no preset, reporting unknown",
            threshold, debounce
        );
        VibrationSensitivity::Unknown
    })
}

pub fn encode_vibration(preset: VibrationSensitivity) -> Result<(u8, u8)> {
    VIBRATION_PRESETS
        .key_of(preset)
        .ok_or(PayloadError::UnknownPreset { field: "vibration" })
}

/// Classify a door key, logging raw values that match no preset
pub fn decode_door<K>(table: &ExactMatchTable<K, DoorSensitivity>, key: K) -> DoorSensitivity
where
    K: PartialEq + Copy + std::fmt::Debug,
{
    table.classify(key).unwrap_or_else(|| {
        warn!("Door thresholds {:?} match no preset, reporting unknown", key);
        DoorSensitivity::Unknown
    })
}

pub fn encode_door<K>(table: &ExactMatchTable<K, DoorSensitivity>, preset: DoorSensitivity) -> Result<K>
where
    K: PartialEq + Copy,
{
    table
        .key_of(preset)
        .ok_or(PayloadError::UnknownPreset { field: "door" })
}

/// Write a raw value into a frame field, tagging overflow with the field name
pub fn put(frame: &mut [u8], field: BitField, value: u8, name: &'static str) -> Result<()> {
    field.set(frame, value).map_err(PayloadError::field(name))
}

/// Scale an engineering value and write it into a frame field
pub fn put_scaled(
    frame: &mut [u8],
    field: BitField,
    scale: &LinearScale,
    value: i32,
    name: &'static str,
) -> Result<()> {
    let raw = scale.encode(value).map_err(PayloadError::field(name))?;
    put(frame, field, raw as u8, name)
}
