//! Rendering of decoded readings, configurations and encoded frames

use anyhow::Result;
use colored::Colorize;
use sensit_payload::{Configuration, ErrorKind, ModeFields, ProtocolVersion, Reading, Uplink};
use serde::Serialize;

use crate::settings::OutputFormat;

const LABEL_WIDTH: usize = 14;

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    protocol: ProtocolVersion,
    #[serde(flatten)]
    body: &'a T,
}

#[derive(Serialize)]
struct EncodedFrame {
    protocol: ProtocolVersion,
    frame: String,
}

fn structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?.trim_end().to_string(),
        OutputFormat::Text | OutputFormat::Json => serde_json::to_string_pretty(value)?,
    })
}

/// Human name of a serde enum value: `one_hour` -> `one hour`
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name.replace('_', " "),
        Ok(other) => other.to_string(),
        Err(_) => "?".to_string(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn line(out: &mut String, name: &str, value: impl std::fmt::Display) {
    out.push_str(&format!("{} {}\n", format!("{:<width$}", name, width = LABEL_WIDTH).bright_cyan(), value));
}

pub fn render_uplink(uplink: &Uplink, format: OutputFormat) -> Result<String> {
    if format != OutputFormat::Text {
        return structured(uplink, format);
    }

    let mut out = String::new();
    render_reading(&mut out, &uplink.reading);
    if let (Some(config), Some(version)) = (&uplink.config, uplink.reading.version) {
        out.push('\n');
        render_configuration(&mut out, config, version);
    }
    Ok(out.trim_end().to_string())
}

fn render_reading(out: &mut String, reading: &Reading) {
    if reading.error != ErrorKind::None {
        line(
            out,
            "Error",
            format!("{} (code {})", label(&reading.error).red().bold(), reading.error.code()),
        );
    }
    let Some(version) = reading.version else {
        return;
    };

    line(out, "Protocol", version);
    line(
        out,
        "Battery",
        format!("{} mV ({}%)", reading.battery_mv, reading.battery_percentage()),
    );
    match reading.mode {
        Some(mode) => line(out, "Mode", mode),
        None => {
            let code = reading.mode_code.map_or_else(|| "?".to_string(), |code| code.to_string());
            line(out, "Mode", format!("{} (code {})", "unknown".red(), code));
        },
    }
    line(out, "Button", yes_no(reading.button));
    if let Some(period) = reading.uplink_period {
        line(out, "Period", format!("{} ({} s)", label(&period), period.seconds()));
    }
    if let Some(trigger) = reading.trigger {
        line(out, "Trigger", label(&trigger));
    }

    match reading.fields {
        ModeFields::Unset => {},
        ModeFields::Firmware(firmware) => line(out, "Firmware", firmware),
        ModeFields::Climate { temperature, .. } => {
            line(out, "Temperature", format!("{:.3} °C (raw {})", f32::from(temperature) / 8.0, temperature));
            if let Some(humidity) = reading.humidity_percent() {
                line(out, "Humidity", format!("{:.1} %RH", humidity));
            }
        },
        ModeFields::Light { brightness } => {
            let lux = reading.brightness_lux().unwrap_or_default();
            line(out, "Brightness", format!("{} ({:.2} lx)", brightness, lux));
        },
        ModeFields::Door { state, event_count } => {
            line(out, "Door", label(&state));
            line(out, "Events", event_count);
        },
        ModeFields::Vibration { state, event_count } => {
            line(out, "Vibration", label(&state));
            line(out, "Events", event_count);
        },
        ModeFields::Magnet { detected, event_count } => {
            line(out, "Magnet", yes_no(detected));
            line(out, "Events", event_count);
        },
        ModeFields::ButtonPress { temperature, firmware } => {
            line(out, "Temperature", format!("{:.3} °C (raw {})", f32::from(temperature) / 8.0, temperature));
            line(out, "Firmware", firmware);
        },
    }
}

pub fn render_config(config: &Configuration, version: ProtocolVersion, format: OutputFormat) -> Result<String> {
    if format != OutputFormat::Text {
        return structured(
            &Tagged {
                protocol: version,
                body: config,
            },
            format,
        );
    }

    let mut out = String::new();
    render_configuration(&mut out, config, version);
    Ok(out.trim_end().to_string())
}

fn render_configuration(out: &mut String, config: &Configuration, version: ProtocolVersion) {
    line(out, "Protocol", version);
    line(out, "Limited", yes_no(config.limited));
    line(out, "Period", format!("{} ({} s)", label(&config.period), config.period.seconds()));
    if let Some(periodic) = config.periodic {
        let enabled: Vec<&str> = sensit_payload::Mode::ALL
            .iter()
            .filter(|mode| periodic.is_enabled(**mode))
            .map(|mode| mode.name())
            .collect();
        let enabled = if enabled.is_empty() { "none".to_string() } else { enabled.join(", ") };
        line(out, "Periodic", enabled);
    }
    line(
        out,
        "Temperature",
        format!("{} .. {} °C", config.temperature_low, config.temperature_high),
    );
    if let (Some(low), Some(high)) = (config.humidity_low, config.humidity_high) {
        line(out, "Humidity", format!("{} .. {} %RH", low, high));
    }
    if let (Some(low), Some(high)) = (config.brightness_low, config.brightness_high) {
        line(out, "Brightness", format!("{} .. {}", low, high));
    }
    if let Some(threshold) = config.brightness_threshold {
        line(out, "Brightness", threshold);
    }
    line(out, "Vibration", label(&config.vibration));
    if let Some(delay) = config.vibration_clear_delay {
        match delay.seconds() {
            Some(seconds) => line(out, "Clear delay", format!("{} s", seconds)),
            None => line(out, "Clear delay", label(&delay)),
        }
    }
    line(out, "Door", label(&config.door));
}

pub fn render_frame(frame: &[u8], version: ProtocolVersion, format: OutputFormat) -> Result<String> {
    let frame = hex::encode_upper(frame);
    match format {
        OutputFormat::Text => Ok(frame),
        _ => structured(
            &EncodedFrame {
                protocol: version,
                frame,
            },
            format,
        ),
    }
}
