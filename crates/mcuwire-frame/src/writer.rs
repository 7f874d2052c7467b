use std::io::Write;

use bytes::BytesMut;
use mcuwire_transport::{LinkStream, StreamTransport, Transport, TransportError};
use tracing::debug;

use crate::codec::{encode_frame, Command, FrameConfig, HEADER_SIZE, PAYLOAD_MAX, TRAILER_SIZE};
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

/// Writes complete frames to any `Write` stream.
///
/// Unlike [`encode_frame`], which trusts its caller, the writer refuses
/// payloads the firmware could not receive. The bytes themselves go out
/// through a [`StreamTransport`], so a link that stops accepting writes
/// reports [`FrameError::ConnectionClosed`].
pub struct FrameWriter<T> {
    link: StreamTransport<T>,
    buf: BytesMut,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            link: StreamTransport::new(inner),
            buf: BytesMut::with_capacity(HEADER_SIZE + PAYLOAD_MAX + TRAILER_SIZE),
        }
    }

    /// Write a command (blocking).
    pub fn write_command(&mut self, command: &Command) -> Result<()> {
        self.send(command.frame_type, command.id, command.payload.as_ref())
    }

    /// Encode and send one frame, flushing the stream afterwards.
    pub fn send(&mut self, frame_type: u8, id: u8, payload: &[u8]) -> Result<()> {
        if payload.len() > PAYLOAD_MAX {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: PAYLOAD_MAX,
            });
        }

        self.buf.clear();
        encode_frame(frame_type, id, payload, &mut self.buf);
        self.link.write_bytes(&self.buf).map_err(link_error)?;

        debug!(frame_type, id, wire = %hex::encode_upper(&self.buf), "sent frame");
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        self.link.get_ref()
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.link.into_inner()
    }
}

impl FrameWriter<LinkStream> {
    /// Create a frame writer for a link and apply the write timeout from config.
    pub fn with_config_link(inner: LinkStream, config: &FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::new(inner))
    }
}

fn link_error(err: TransportError) -> FrameError {
    match err {
        TransportError::Unavailable => FrameError::ConnectionClosed,
        other => transport_to_frame_error(other),
    }
}
