use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::Checksum;
use crate::kinds::CMD_DHT20;

/// Two-byte frame preamble.
pub const PREAMBLE: [u8; 2] = [0xAA, 0x55];

/// Protocol version written by the encoder.
pub const PROTO_VERSION: u8 = 0x01;

/// Largest payload the firmware's receive buffer accepts.
pub const PAYLOAD_MAX: usize = 128;

/// Preamble (2) + version + type + id + length.
pub const HEADER_SIZE: usize = 6;

/// Trailing checksum byte.
pub const TRAILER_SIZE: usize = 1;

/// A complete, checksum-validated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Version byte as received. Not validated.
    pub version: u8,
    /// Command/response discriminator.
    pub frame_type: u8,
    /// Correlation id chosen by the sender.
    pub id: u8,
    /// Frame body, at most [`PAYLOAD_MAX`] bytes.
    pub payload: Bytes,
    /// Trailing checksum byte, equal to the sum of header and payload.
    pub checksum: u8,
}

impl Frame {
    /// Build a frame at the current protocol version, computing its checksum.
    pub fn new(frame_type: u8, id: u8, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let checksum = frame_checksum(PROTO_VERSION, frame_type, id, &payload);
        Self {
            version: PROTO_VERSION,
            frame_type,
            id,
            payload,
            checksum,
        }
    }

    /// Payload rendered as uppercase hex, e.g. `1A2B`.
    pub fn payload_hex(&self) -> String {
        hex::encode_upper(&self.payload)
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + TRAILER_SIZE
    }
}

/// An outbound request for the microcontroller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub frame_type: u8,
    pub id: u8,
    pub payload: Bytes,
}

impl Command {
    pub fn new(frame_type: u8, id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            frame_type,
            id,
            payload: payload.into(),
        }
    }

    /// Build a command from wider integers, keeping only the low byte of
    /// `frame_type` and `id` the way the wire format does.
    pub fn from_wide(frame_type: u32, id: u32, payload: impl Into<Bytes>) -> Self {
        Self::new((frame_type & 0xFF) as u8, (id & 0xFF) as u8, payload)
    }

    /// The canned DHT20 measurement request: `AA 55 01 10 0A 02 1A 2B 62`.
    pub fn request_sensor() -> Self {
        Self::new(CMD_DHT20, 0x0A, Bytes::from_static(&[0x1A, 0x2B]))
    }

    /// Encode into a standalone buffer.
    pub fn encode(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(HEADER_SIZE + self.payload.len() + TRAILER_SIZE);
        encode_frame(self.frame_type, self.id, &self.payload, &mut dst);
        dst.freeze()
    }
}

/// Checksum over the header fields and payload of one frame.
pub fn frame_checksum(version: u8, frame_type: u8, id: u8, payload: &[u8]) -> u8 {
    let mut sum = Checksum::start(version);
    sum.push(frame_type);
    sum.push(id);
    sum.push(payload.len() as u8);
    sum.extend(payload);
    sum.value()
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬─────────┬──────┬────┬─────┬─────────────┬──────────┐
/// │ Preamble  │ Version │ Type │ Id │ Len │ Payload     │ Checksum │
/// │ 0xAA 0x55 │ 0x01    │ (1B) │(1B)│(1B) │ (Len bytes) │ (1B)     │
/// └───────────┴─────────┴──────┴────┴─────┴─────────────┴──────────┘
/// ```
///
/// Never fails. `payload` must not exceed [`PAYLOAD_MAX`]; a longer payload
/// is written with a truncated length byte and the receiver will drop it.
pub fn encode_frame(frame_type: u8, id: u8, payload: &[u8], dst: &mut BytesMut) {
    let len = payload.len() as u8;
    dst.reserve(HEADER_SIZE + payload.len() + TRAILER_SIZE);
    dst.put_slice(&PREAMBLE);
    dst.put_u8(PROTO_VERSION);
    dst.put_u8(frame_type);
    dst.put_u8(id);
    dst.put_u8(len);
    dst.put_slice(payload);
    dst.put_u8(frame_checksum(PROTO_VERSION, frame_type, id, payload));
}

/// Configuration for the blocking frame reader and writer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Read timeout applied to links that support one.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout applied to links that support one.
    pub write_timeout: Option<std::time::Duration>,
    /// Size of each read from the link. Default: 256 bytes.
    pub read_chunk_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            write_timeout: None,
            read_chunk_size: 256,
        }
    }
}
