//! Byte-stream links between the host and a microcontroller.
//!
//! The protocol engine does not care where bytes come from. This crate
//! provides the two link kinds the bridge uses:
//! - an already-configured character device or FIFO path
//! - a Unix domain socket (e.g. a serial port exposed through `socat`)
//!
//! and the [`Transport`] write seam the engine sends encoded frames through.

pub mod device;
pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use device::open_device;
pub use error::{Result, TransportError};
pub use traits::{LinkStream, StreamTransport, Transport};

#[cfg(unix)]
pub use uds::UnixDomainSocket;
