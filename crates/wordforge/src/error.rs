//! Unified error type for Wordforge.

use std::path::PathBuf;

use wordforge_protocol::ProtocolError;
use wordforge_room::RoomError;
use wordforge_session::SessionError;
use wordforge_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WordforgeError {
    /// Binding or accepting failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The round could not start (bad word, unreadable dictionary).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The configuration file could not be read or parsed.
    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}
