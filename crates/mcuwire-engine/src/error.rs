/// Errors that can occur in engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A sensor payload is shorter than the fixed sensor layout.
    #[error("sensor payload too short ({len} bytes, need {required})")]
    InsufficientPayload { len: usize, required: usize },

    /// Hex input could not be parsed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
