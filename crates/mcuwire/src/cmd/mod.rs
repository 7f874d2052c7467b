use clap::{Args, Subcommand, ValueEnum};
use mcuwire_engine::{EngineConfig, SensorLayout};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;
use crate::parse::{parse_byte, parse_hex, parse_wide, HexBytes};

pub mod bridge;
pub mod decode;
pub mod encode;
pub mod sensor;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one command frame.
    Encode(EncodeArgs),
    /// Decode a captured byte stream and print what the engine reports.
    Decode(DecodeArgs),
    /// Decode a 6-byte DHT20 sensor payload.
    Sensor(SensorArgs),
    /// Attach to a microcontroller link and bridge it to stdin/stdout.
    Bridge(BridgeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Sensor(args) => sensor::run(args, format),
        Command::Bridge(args) => bridge::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Measurement fields first, status byte last.
    #[default]
    StatusLast,
    /// Status byte first, measurement fields after it.
    StatusFirst,
}

impl From<LayoutArg> for SensorLayout {
    fn from(layout: LayoutArg) -> Self {
        match layout {
            LayoutArg::StatusLast => SensorLayout::StatusLast,
            LayoutArg::StatusFirst => SensorLayout::StatusFirst,
        }
    }
}

/// Engine options shared by `decode` and `bridge`.
#[derive(Args, Debug)]
pub struct EngineArgs {
    /// Frame type decoded as a sensor reading.
    #[arg(long, value_parser = parse_byte, default_value = "0x21")]
    pub sensor_type: u8,
    /// Sensor payload layout.
    #[arg(long, value_enum, default_value_t = LayoutArg::StatusLast)]
    pub layout: LayoutArg,
}

impl EngineArgs {
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            sensor_response_type: self.sensor_type,
            sensor_layout: self.layout.into(),
        }
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Frame type (decimal or 0x hex). Only the low byte is sent.
    #[arg(long = "type", value_parser = parse_wide)]
    pub frame_type: u32,
    /// Frame id (decimal or 0x hex). Only the low byte is sent.
    #[arg(long, value_parser = parse_wide)]
    pub id: u32,
    /// Payload as hex.
    #[arg(long, value_parser = parse_hex)]
    pub payload: Option<HexBytes>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Bytes to decode, as hex.
    #[arg(long, value_parser = parse_hex, conflicts_with = "file")]
    pub hex: Option<HexBytes>,
    /// Read raw bytes from a file.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args, Debug)]
pub struct SensorArgs {
    /// Sensor payload as hex (at least 6 bytes).
    pub hex: String,
    /// Sensor payload layout.
    #[arg(long, value_enum, default_value_t = LayoutArg::StatusLast)]
    pub layout: LayoutArg,
}

#[derive(Args, Debug)]
pub struct BridgeArgs {
    /// Device/FIFO path, or socket path with --uds.
    pub path: PathBuf,
    /// Connect to a Unix domain socket instead of opening a device path.
    #[arg(long)]
    pub uds: bool,
    /// Bytes requested per read from the link.
    #[arg(long, default_value_t = 256)]
    pub chunk_size: usize,
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
