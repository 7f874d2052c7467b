/// Errors that can occur while reading or writing frames on a link.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds what the firmware can receive.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link reached end-of-stream.
    #[error("link closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
