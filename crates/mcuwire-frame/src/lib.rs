//! Preamble-synchronized, checksummed framing for microcontroller links.
//!
//! Every frame on the wire is:
//! - a 2-byte preamble (`0xAA 0x55`) the receiver resynchronizes on
//! - version, type, id and length bytes
//! - 0 to 128 payload bytes
//! - a 1-byte modulo-256 checksum over everything after the preamble
//!
//! There is no byte stuffing. A corrupted frame is dropped and the decoder
//! resumes scanning for the next preamble.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod kinds;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::FrameCodec;
pub use checksum::{checksum, Checksum};
pub use codec::{
    encode_frame, frame_checksum, Command, Frame, FrameConfig, HEADER_SIZE, PAYLOAD_MAX,
    PREAMBLE, PROTO_VERSION, TRAILER_SIZE,
};
pub use decoder::{DecodeEvent, DecodeState, FrameDecoder};
pub use error::{FrameError, Result};
pub use kinds::{type_name, CMD_DHT20, CMD_SERVO, RESP_DHT20, RESP_SERVO, RESP_STATUS};
pub use reader::FrameReader;
pub use writer::FrameWriter;
