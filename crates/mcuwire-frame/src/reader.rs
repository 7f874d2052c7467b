use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use mcuwire_transport::LinkStream;

use crate::codec::FrameConfig;
use crate::decoder::{DecodeEvent, FrameDecoder};
use crate::error::{FrameError, Result};

/// Reads decode events from any `Read` stream.
///
/// Owns the decoder for the stream it wraps, so partial frames carry over
/// between reads and a new reader always starts from a clean state.
pub struct FrameReader<T> {
    inner: T,
    decoder: FrameDecoder,
    pending: VecDeque<DecodeEvent>,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::new(),
            pending: VecDeque::new(),
            config,
        }
    }

    /// Read until the next decode event (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` at end of stream; any
    /// partial frame still buffered at that point is discarded.
    pub fn read_event(&mut self) -> Result<DecodeEvent> {
        let mut chunk = vec![0u8; self.config.read_chunk_size.max(1)];
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }

            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.decoder.reset();
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend(self.decoder.feed(&chunk[..read]));
        }
    }

    /// Borrow the decoder (e.g. to inspect its state).
    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameReader<LinkStream> {
    /// Create a frame reader for a link and apply the read timeout from config.
    pub fn with_config_link(inner: LinkStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: mcuwire_transport::TransportError) -> FrameError {
    match err {
        mcuwire_transport::TransportError::Io(io)
        | mcuwire_transport::TransportError::Accept(io) => FrameError::Io(io),
        mcuwire_transport::TransportError::Open { source, .. }
        | mcuwire_transport::TransportError::Bind { source, .. }
        | mcuwire_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
