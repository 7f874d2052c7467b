use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, Command, PAYLOAD_MAX};
use crate::decoder::{DecodeEvent, FrameDecoder};
use crate::error::FrameError;

/// `tokio_util` codec over the same state machine as [`FrameDecoder`].
///
/// Decoding consumes input one byte at a time and stops at the first
/// completed event, so the bytes left in `src` are exactly those not yet
/// seen. Partial frames live in the decoder, not in the read buffer.
#[derive(Debug, Default)]
pub struct FrameCodec {
    decoder: FrameDecoder,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the decoder (e.g. to inspect its state).
    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }
}

impl Decoder for FrameCodec {
    type Item = DecodeEvent;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            if let Some(event) = self.decoder.push(src.get_u8()) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(event) => Ok(Some(event)),
            None => {
                self.decoder.reset();
                Ok(None)
            }
        }
    }
}

impl Encoder<Command> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.payload.len() > PAYLOAD_MAX {
            return Err(FrameError::PayloadTooLarge {
                size: item.payload.len(),
                max: PAYLOAD_MAX,
            });
        }
        encode_frame(item.frame_type, item.id, &item.payload, dst);
        Ok(())
    }
}
