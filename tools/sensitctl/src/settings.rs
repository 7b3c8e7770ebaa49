//! Layered CLI settings and device configuration files

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use sensit_payload::Configuration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "SENSITCTL_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Settings that apply to every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliSettings {
    pub format: OutputFormat,
    /// Protocol used when `--protocol` is omitted
    pub default_protocol: u8,
    pub color: bool,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            default_protocol: 3,
            color: true,
        }
    }
}

impl CliSettings {
    /// Load settings from all sources
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (`SENSITCTL_*`)
    /// 2. Explicit settings file (`--config`)
    /// 3. `sensitctl.toml` / `sensitctl.yaml` in `dir`
    /// 4. Default values
    ///
    /// Command-line flags are applied on top by the caller.
    pub fn load(dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(CliSettings::default()))
            .merge(Toml::file(dir.join("sensitctl.toml")))
            .merge(Yaml::file(dir.join("sensitctl.yaml")));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(anyhow!("Settings file not found: {}", path.display()));
            }
            figment = figment.merge(file_provider(path)?);
        }

        let settings: CliSettings = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("Failed to load sensitctl settings")?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}

/// Figment holding a single TOML, YAML or JSON file, chosen by extension
fn file_provider(path: &Path) -> Result<Figment> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("File must have an extension: {}", path.display()))?;

    let figment = match extension {
        "toml" => Figment::new().merge(Toml::file(path)),
        "yaml" | "yml" => Figment::new().merge(Yaml::file(path)),
        "json" => Figment::new().merge(Json::file(path)),
        _ => return Err(anyhow!("Unsupported file format: {}", extension)),
    };
    Ok(figment)
}

/// Read a device configuration to encode
pub fn load_device_config(path: &Path) -> Result<Configuration> {
    if !path.exists() {
        return Err(anyhow!("Configuration file not found: {}", path.display()));
    }
    file_provider(path)?
        .extract()
        .with_context(|| format!("Invalid device configuration in {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use sensit_payload::{DoorSensitivity, UplinkPeriod};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let settings = CliSettings::load(dir.path(), None).unwrap();
        assert_eq!(settings.default_protocol, 3);
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn test_working_directory_file_then_explicit_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sensitctl.toml"), "format = \"json\"\ndefault_protocol = 2\n").unwrap();

        let settings = CliSettings::load(dir.path(), None).unwrap();
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.default_protocol, 2);
        assert!(settings.color);

        let explicit = dir.path().join("override.yaml");
        fs::write(&explicit, "format: yaml\ncolor: false\n").unwrap();

        let settings = CliSettings::load(dir.path(), Some(&explicit)).unwrap();
        assert_eq!(settings.format, OutputFormat::Yaml);
        assert_eq!(settings.default_protocol, 2);
        assert!(!settings.color);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(CliSettings::load(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_load_device_config_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("door.toml");
        fs::write(
            &path,
            r#"
limited = true
period = "one_hour"
temperature_low = -20
temperature_high = 107
brightness_low = 0
brightness_high = 960
vibration = "standard"
door = "sensitive"
"#,
        )
        .unwrap();

        let config = load_device_config(&path).unwrap();
        assert_eq!(config.period, UplinkPeriod::OneHour);
        assert_eq!(config.door, DoorSensitivity::Sensitive);
        assert_eq!(config.humidity_low, None);
    }

    #[test]
    fn test_load_device_config_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "limited = true").unwrap();

        let err = load_device_config(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }
}
