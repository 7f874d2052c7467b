//! Serial bridge protocol engine for microcontroller links.
//!
//! mcuwire frames commands to a microcontroller, resynchronizes on the
//! preamble when the byte stream is corrupted, and decodes DHT20 sensor
//! responses into readings.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte-stream links (device paths, Unix sockets) and the write seam
//! - [`frame`]: checksum, encoder, receive state machine, blocking/async framing
//! - [`engine`]: sensor codec, notifications and the protocol engine

/// Re-export transport types.
pub mod transport {
    pub use mcuwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use mcuwire_frame::*;
}

/// Re-export engine types.
pub mod engine {
    pub use mcuwire_engine::*;
}
