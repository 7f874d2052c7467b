use std::fs::File;
use std::io::{ErrorKind, Read, Write};

use tracing::{debug, warn};

use crate::error::{Result, TransportError};

/// A connected link to the microcontroller. Implements `Read + Write`.
///
/// Chunk boundaries on reads are whatever the operating system hands back;
/// nothing above this layer may assume they line up with frames.
pub struct LinkStream {
    inner: LinkStreamInner,
}

enum LinkStreamInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    Device(File),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.read(buf),
            LinkStreamInner::Device(file) => file.read(buf),
        }
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.write(buf),
            LinkStreamInner::Device(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.flush(),
            LinkStreamInner::Device(file) => file.flush(),
        }
    }
}

impl LinkStream {
    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: LinkStreamInner::Unix(stream),
        }
    }

    pub(crate) fn from_device(file: File) -> Self {
        Self {
            inner: LinkStreamInner::Device(file),
        }
    }

    /// Set read timeout on the underlying stream.
    ///
    /// Device paths have no portable timeout; the call is a no-op for them.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            LinkStreamInner::Device(_) => Ok(()),
        }
    }

    /// Set write timeout on the underlying stream. No-op for device paths.
    pub fn set_write_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            LinkStreamInner::Device(_) => Ok(()),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => Ok(Self::from_unix(stream.try_clone()?)),
            LinkStreamInner::Device(file) => Ok(Self::from_device(file.try_clone()?)),
        }
    }

    /// Link kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => "unix",
            LinkStreamInner::Device(_) => "device",
        }
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkStream")
            .field("type", &self.kind())
            .finish()
    }
}

/// Write side of a link, as seen by the protocol engine.
///
/// Writes are fire-and-forget: implementations either hand the whole buffer
/// to the link or report failure. Nothing is queued for later.
pub trait Transport {
    /// Write all of `bytes` to the link.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Whether the link is currently able to accept writes.
    fn is_available(&self) -> bool {
        true
    }
}

/// [`Transport`] over any blocking `Write`.
#[derive(Debug)]
pub struct StreamTransport<W> {
    inner: W,
    available: bool,
}

impl<W: Write> StreamTransport<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            available: true,
        }
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the transport and return the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn flush(&mut self) -> std::io::Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

impl<W: Write> Transport for StreamTransport<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.available {
            return Err(TransportError::Unavailable);
        }

        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => {
                    warn!("link accepted zero bytes; marking unavailable");
                    self.available = false;
                    return Err(TransportError::Unavailable);
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => {
                    if matches!(
                        err.kind(),
                        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::NotConnected
                    ) {
                        self.available = false;
                    }
                    return Err(TransportError::Io(err));
                }
            }
        }

        self.flush()?;
        debug!(len = bytes.len(), "wrote bytes to link");
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
