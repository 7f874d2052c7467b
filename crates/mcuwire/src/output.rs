use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use mcuwire_engine::Notification;
use mcuwire_frame::{type_name, Command};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EncodedOutput<'a> {
    packet_type: u8,
    type_name: &'a str,
    packet_id: u8,
    payload_len: usize,
    checksum: u8,
    hex: String,
}

pub fn print_encoded(command: &Command, wire: &[u8], format: OutputFormat) {
    let checksum = wire.last().copied().unwrap_or_default();
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                packet_type: command.frame_type,
                type_name: type_name(command.frame_type),
                packet_id: command.id,
                payload_len: command.payload.len(),
                checksum,
                hex: hex::encode_upper(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "ID", "LEN", "CHECKSUM", "WIRE"])
                .add_row(vec![
                    format!("0x{:02x} ({})", command.frame_type, type_name(command.frame_type)),
                    format!("0x{:02x}", command.id),
                    command.payload.len().to_string(),
                    format!("0x{checksum:02x}"),
                    spaced_hex(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", spaced_hex(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_notification(notification: &Notification, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(notification).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let fields = fields(notification);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(
                    std::iter::once("EVENT")
                        .chain(fields.iter().map(|(name, _)| *name))
                        .map(str::to_uppercase)
                        .collect::<Vec<_>>(),
                )
                .add_row(
                    std::iter::once(notification.kind().to_string())
                        .chain(fields.into_iter().map(|(_, value)| value))
                        .collect::<Vec<_>>(),
                );
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let fields = fields(notification)
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{} {fields}", notification.kind());
        }
        OutputFormat::Raw => {
            if let Notification::FrameReceived { payload_hex, .. } = notification {
                if let Ok(payload) = hex::decode(payload_hex) {
                    print_raw(&payload);
                }
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn fields(notification: &Notification) -> Vec<(&'static str, String)> {
    match notification {
        Notification::FrameReceived {
            version,
            frame_type,
            id,
            payload_hex,
            ..
        } => vec![
            ("version", version.to_string()),
            ("type", format!("0x{frame_type:02x}")),
            ("name", type_name(*frame_type).to_string()),
            ("id", format!("0x{id:02x}")),
            ("payload", payload_hex.clone()),
        ],
        Notification::SensorReading(reading) => vec![
            ("humidity", format!("{:.2}", reading.humidity_pct)),
            ("temperature", format!("{:.2}", reading.temperature_c)),
            ("status", reading.status_hex()),
        ],
        Notification::ChecksumMismatch { expected, received } => vec![
            ("expected", format!("0x{expected:02x}")),
            ("received", format!("0x{received:02x}")),
        ],
        Notification::Status { connected } => vec![("connected", connected.to_string())],
    }
}

fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
