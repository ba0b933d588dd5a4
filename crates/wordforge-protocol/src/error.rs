//! Error types for the protocol layer.

/// Errors that can occur while interpreting client input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The line is not exactly one lowercase ASCII letter.
    #[error("invalid guess: {0:?}")]
    InvalidGuess(String),
}
