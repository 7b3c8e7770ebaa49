//! Unified data model shared by every protocol generation
//!
//! Readings and configurations are plain values: built once per decode call,
//! never mutated afterwards, and safe to send across threads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PayloadError;
use crate::scales;

/// Size of an uplink data frame
pub const DATA_FRAME_LEN: usize = 4;

/// Size of a configuration frame
pub const CONFIG_FRAME_LEN: usize = 8;

/// Raw uplink data frame
pub type DataFrame = [u8; DATA_FRAME_LEN];

/// Raw configuration frame
pub type ConfigFrame = [u8; CONFIG_FRAME_LEN];

// ============================================================================
// Protocol & Mode
// ============================================================================

/// Device protocol generation
///
/// Represented by the integers 2 and 3 wherever it crosses a process
/// boundary (CLI flags, JSON output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProtocolVersion {
    V2,
    V3,
}

impl ProtocolVersion {
    pub fn number(self) -> u8 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = PayloadError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => Err(PayloadError::UnsupportedVersion(other)),
        }
    }
}

impl From<ProtocolVersion> for u8 {
    fn from(version: ProtocolVersion) -> Self {
        version.number()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// Active sensor mode of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Standby,
    Temperature,
    Light,
    Door,
    Vibration,
    Magnet,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Standby,
        Mode::Temperature,
        Mode::Light,
        Mode::Door,
        Mode::Vibration,
        Mode::Magnet,
    ];

    /// Mode for a raw mode code; `None` for codes outside the six known modes
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Standby => "standby",
            Self::Temperature => "temperature",
            Self::Light => "light",
            Self::Door => "door",
            Self::Vibration => "vibration",
            Self::Magnet => "magnet",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structural decode outcome carried on every reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[default]
    None,
    /// Type bits match no known protocol generation
    UnknownFrameType,
    /// Mode field outside the six known modes
    UnknownMode,
}

impl ErrorKind {
    /// Numeric code used by downstream consumers (0, 1, 2)
    pub fn code(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::UnknownFrameType => 0x01,
            Self::UnknownMode => 0x02,
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Door event reported in door mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    #[default]
    None,
    Movement,
    Close,
    Open,
}

impl DoorState {
    /// Total mapping from the 2-bit field
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::None,
            0b01 => Self::Movement,
            0b10 => Self::Close,
            _ => Self::Open,
        }
    }
}

/// Vibration event reported in vibration mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibrationState {
    #[default]
    None,
    Ongoing,
    /// Codes 0b10 and 0b11, kept verbatim
    Other(u8),
}

impl VibrationState {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::None,
            0b01 => Self::Ongoing,
            other => Self::Other(other),
        }
    }

    pub fn is_vibrating(self) -> bool {
        self == Self::Ongoing
    }
}

/// What made a v2 device emit the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameTrigger {
    Periodic,
    Button,
    Alert,
    NewMode,
}

impl FrameTrigger {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Periodic,
            0b01 => Self::Button,
            0b10 => Self::Alert,
            _ => Self::NewMode,
        }
    }
}

/// Firmware version reported in standby mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Mode-specific part of a reading
///
/// Temperature is in eighths of a degree Celsius, humidity in half percent,
/// brightness in raw sensor units (96 units per lux).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModeFields {
    /// Nothing mode-specific was decoded
    #[default]
    Unset,
    Firmware(FirmwareVersion),
    Climate {
        temperature: i16,
        humidity: u8,
    },
    Light {
        brightness: u16,
    },
    Door {
        state: DoorState,
        event_count: u16,
    },
    Vibration {
        state: VibrationState,
        event_count: u16,
    },
    Magnet {
        detected: bool,
        event_count: u16,
    },
    /// v2 double-click frame: temperature and firmware regardless of mode
    ButtonPress {
        temperature: i16,
        firmware: FirmwareVersion,
    },
}

/// Decoded data frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// `None` when the type bits match no protocol generation
    pub version: Option<ProtocolVersion>,
    pub error: ErrorKind,
    pub battery_mv: u16,
    pub mode: Option<Mode>,
    /// Raw mode field, kept even when it names no known mode; `None` when
    /// the frame type is unknown and no mode field was read
    pub mode_code: Option<u8>,
    /// Double-click message
    pub button: bool,
    pub fields: ModeFields,
    /// v2 only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uplink_period: Option<UplinkPeriod>,
    /// v2 only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<FrameTrigger>,
}

impl Reading {
    /// Reading with the fields every mode shares; mode-specific fields unset
    pub(crate) fn header(version: ProtocolVersion, battery_mv: u16, mode_code: u8, button: bool) -> Self {
        Self {
            version: Some(version),
            battery_mv,
            mode: Mode::from_code(mode_code),
            mode_code: Some(mode_code),
            button,
            ..Self::default()
        }
    }

    pub(crate) fn unknown_frame_type() -> Self {
        Self {
            error: ErrorKind::UnknownFrameType,
            ..Self::default()
        }
    }

    /// True when mode-specific fields can be trusted
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Temperature in eighths of a degree
    pub fn temperature(&self) -> Option<i16> {
        match self.fields {
            ModeFields::Climate { temperature, .. } | ModeFields::ButtonPress { temperature, .. } => {
                Some(temperature)
            },
            _ => None,
        }
    }

    pub fn temperature_celsius(&self) -> Option<f32> {
        self.temperature().map(|t| f32::from(t) / 8.0)
    }

    pub fn humidity_percent(&self) -> Option<f32> {
        match self.fields {
            ModeFields::Climate { humidity, .. } => Some(f32::from(humidity) / 2.0),
            _ => None,
        }
    }

    pub fn brightness_lux(&self) -> Option<f32> {
        match self.fields {
            ModeFields::Light { brightness } => Some(f32::from(brightness) / scales::UNITS_PER_LUX),
            _ => None,
        }
    }

    pub fn event_count(&self) -> Option<u16> {
        match self.fields {
            ModeFields::Door { event_count, .. }
            | ModeFields::Vibration { event_count, .. }
            | ModeFields::Magnet { event_count, .. } => Some(event_count),
            _ => None,
        }
    }

    pub fn firmware(&self) -> Option<FirmwareVersion> {
        match self.fields {
            ModeFields::Firmware(firmware) | ModeFields::ButtonPress { firmware, .. } => Some(firmware),
            _ => None,
        }
    }

    /// Remaining battery energy estimated from the reported voltage
    pub fn battery_percentage(&self) -> u8 {
        scales::battery_percentage(self.battery_mv)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Period of the periodic uplink message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UplinkPeriod {
    #[default]
    TenMinutes,
    OneHour,
    SixHours,
    OneDay,
}

impl UplinkPeriod {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::TenMinutes,
            0b01 => Self::OneHour,
            0b10 => Self::SixHours,
            _ => Self::OneDay,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn seconds(self) -> u32 {
        match self {
            Self::TenMinutes => 600,
            Self::OneHour => 3_600,
            Self::SixHours => 21_600,
            Self::OneDay => 86_400,
        }
    }
}

/// Per-mode periodic reporting switches (v3 only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicReports {
    pub standby: bool,
    pub temperature: bool,
    pub light: bool,
    pub door: bool,
    pub vibration: bool,
    pub magnet: bool,
}

impl PeriodicReports {
    pub fn is_enabled(&self, mode: Mode) -> bool {
        match mode {
            Mode::Standby => self.standby,
            Mode::Temperature => self.temperature,
            Mode::Light => self.light,
            Mode::Door => self.door,
            Mode::Vibration => self.vibration,
            Mode::Magnet => self.magnet,
        }
    }
}

/// Accelerometer sensitivity preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibrationSensitivity {
    VerySensitive,
    Sensitive,
    Standard,
    NotVerySensitive,
    VeryLittleSensitive,
    /// Raw thresholds match no preset
    Unknown,
}

/// Delay before a vibration alert clears (v3 only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibrationClearDelay {
    /// No timed clear: the device sends an end-of-vibration message
    EndOfVibrationMessage,
    TenSeconds,
    ThirtySeconds,
    SixtySeconds,
}

impl VibrationClearDelay {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::EndOfVibrationMessage,
            0b01 => Self::TenSeconds,
            0b10 => Self::ThirtySeconds,
            _ => Self::SixtySeconds,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn seconds(self) -> Option<u8> {
        match self {
            Self::EndOfVibrationMessage => None,
            Self::TenSeconds => Some(10),
            Self::ThirtySeconds => Some(30),
            Self::SixtySeconds => Some(60),
        }
    }
}

/// Magnetometer (door) sensitivity preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorSensitivity {
    Sensitive,
    Standard,
    NotVerySensitive,
    /// Raw thresholds match no preset
    Unknown,
}

/// Decoded configuration frame
///
/// Thresholds are in engineering units: °C, %RH and raw brightness units.
/// Fields a protocol generation does not carry are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Message limitation; devices expect it set
    pub limited: bool,
    pub period: UplinkPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodic: Option<PeriodicReports>,
    pub temperature_low: i8,
    pub temperature_high: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_low: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_high: Option<u8>,
    /// v2 only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness_low: Option<u16>,
    /// v2 only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness_high: Option<u16>,
    /// v3 only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness_threshold: Option<u16>,
    pub vibration: VibrationSensitivity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration_clear_delay: Option<VibrationClearDelay>,
    pub door: DoorSensitivity,
}
