//! sensitctl - Sens'it frame decoder/encoder
//!
//! Decodes uplink data frames and configuration frames received from Sens'it
//! devices, and encodes configuration files into downlink frames.

mod output;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sensit_payload::{parse_config, parse_uplink, serialize_config, ProtocolVersion};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::settings::{CliSettings, OutputFormat};

#[derive(Parser)]
#[command(name = "sensitctl")]
#[command(about = "Sens'it payload decoder/encoder")]
#[command(long_about = "Sens'it payload decoder/encoder

Examples:
  sensitctl decode f609744f                         # Decode a v3 temperature uplink
  sensitctl decode 895d205d00ff008f04027390         # Decode a v2 uplink with its config
  sensitctl config decode 46003f0f8004023c -p 3     # Decode a v3 configuration frame
  sensitctl config encode device.yaml -p 2          # Encode a configuration file

Settings are read from sensitctl.toml / sensitctl.yaml in the working
directory, the --config file and SENSITCTL_* environment variables.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (overrides settings)
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short = 'c', long, global = true, env = "SENSITCTL_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an uplink: a 4-byte data frame, optionally followed by an 8-byte config frame
    Decode {
        /// Frame as hex (8 or 24 characters)
        hex: String,
    },

    /// Decode or encode configuration frames
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Decode an 8-byte configuration frame
    Decode {
        /// Frame as hex (16 characters)
        hex: String,

        /// Protocol version: 2 or 3 (default from settings)
        #[arg(short, long)]
        protocol: Option<u8>,
    },

    /// Encode a configuration file (TOML, YAML or JSON) into a frame
    Encode {
        /// Configuration file
        file: PathBuf,

        /// Protocol version: 2 or 3 (default from settings)
        #[arg(short, long)]
        protocol: Option<u8>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for results
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let mut settings = CliSettings::load(&cwd, cli.config.as_deref())?;
    if let Some(format) = cli.format {
        settings.format = format;
    }
    if cli.no_color {
        settings.color = false;
    }

    // Configure colored output
    if !settings.color {
        colored::control::set_override(false);
    }

    let rendered = match cli.command {
        Commands::Decode { hex } => handle_decode(&hex, &settings)?,
        Commands::Config(ConfigCommands::Decode { hex, protocol }) => {
            handle_config_decode(&hex, protocol, &settings)?
        },
        Commands::Config(ConfigCommands::Encode { file, protocol }) => {
            handle_config_encode(&file, protocol, &settings)?
        },
    };

    println!("{}", rendered);
    Ok(())
}

/// Parse frame text, tolerating a `0x` prefix and embedded whitespace
fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.split_whitespace().collect();
    let cleaned = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);
    hex::decode(cleaned).with_context(|| format!("Invalid hex frame: {}", text))
}

fn protocol(requested: Option<u8>, settings: &CliSettings) -> Result<ProtocolVersion> {
    let number = requested.unwrap_or(settings.default_protocol);
    Ok(ProtocolVersion::try_from(number)?)
}

fn handle_decode(text: &str, settings: &CliSettings) -> Result<String> {
    let bytes = parse_hex(text)?;
    debug!("Decoding {} byte uplink", bytes.len());
    let uplink = parse_uplink(&bytes)?;
    output::render_uplink(&uplink, settings.format)
}

fn handle_config_decode(text: &str, requested: Option<u8>, settings: &CliSettings) -> Result<String> {
    let version = protocol(requested, settings)?;
    let bytes = parse_hex(text)?;
    let config = parse_config(&bytes, version.number())?;
    output::render_config(&config, version, settings.format)
}

fn handle_config_encode(file: &Path, requested: Option<u8>, settings: &CliSettings) -> Result<String> {
    let version = protocol(requested, settings)?;
    let config = crate::settings::load_device_config(file)?;
    let frame = serialize_config(&config, version.number())
        .with_context(|| format!("Cannot encode {} for protocol {}", file.display(), version))?;
    output::render_frame(&frame, version, settings.format)
}
