//! Frame type discriminators understood by the microcontroller firmware.
//!
//! Commands (host → MCU) live in `0x10..=0x1F`, responses (MCU → host) in
//! `0x20..=0x2F`. The decoder does not interpret the type byte; these
//! constants only give names to the values observed on the wire.

/// Request a DHT20 temperature/humidity measurement.
pub const CMD_DHT20: u8 = 0x10;

/// Move the servo.
pub const CMD_SERVO: u8 = 0x11;

/// DHT20 measurement result (6-byte sensor payload).
pub const RESP_DHT20: u8 = 0x21;

/// Servo acknowledgement.
pub const RESP_SERVO: u8 = 0x22;

/// Generic status report.
pub const RESP_STATUS: u8 = 0x23;

/// Returns a human-readable name for a frame type.
pub fn type_name(frame_type: u8) -> &'static str {
    match frame_type {
        CMD_DHT20 => "CMD_DHT20",
        CMD_SERVO => "CMD_SERVO",
        RESP_DHT20 => "RESP_DHT20",
        RESP_SERVO => "RESP_SERVO",
        RESP_STATUS => "RESP_STATUS",
        _ => "UNKNOWN",
    }
}

/// Returns true for host → MCU command types.
pub fn is_command(frame_type: u8) -> bool {
    (0x10..=0x1F).contains(&frame_type)
}

/// Returns true for MCU → host response types.
pub fn is_response(frame_type: u8) -> bool {
    (0x20..=0x2F).contains(&frame_type)
}
