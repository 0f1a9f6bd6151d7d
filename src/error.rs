use thiserror::Error;

/// Errors the engine can surface to callers.
///
/// "No pitch detected" is deliberately *not* here — an unvoiced or silent
/// frame is a normal data state (`frequency_hz: None`), not a failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller supplied a frame with an unsupported window length.
    /// Fatal to that single call only; tracker state is untouched.
    #[error("unsupported frame size {got}: expected a power of two between {min} and {max} samples")]
    InvalidFrameSize { got: usize, min: usize, max: usize },

    /// The underlying audio source disappeared mid-session. Terminal for
    /// that session handle; the caller must start a new session.
    #[error("audio source lost: {reason}")]
    SourceLost { reason: String },

    /// A zone boundary table failed validation at construction time.
    /// Classification itself never fails.
    #[error("invalid zone table: {message}")]
    InvalidZoneTable { message: String },
}

impl EngineError {
    /// Convenience constructor for `AudioSource` implementations reporting
    /// a vanished device.
    pub fn source_lost(reason: impl Into<String>) -> Self {
        Self::SourceLost {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_zone_table(message: impl Into<String>) -> Self {
        Self::InvalidZoneTable {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
