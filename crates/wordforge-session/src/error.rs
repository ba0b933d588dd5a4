//! Error types for the session layer.

use wordforge_transport::ConnectionId;

/// Errors from registering, promoting, or looking up connections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Another active player already uses this name.
    #[error("name {0:?} is already taken")]
    NameTaken(String),

    /// The proposed name is longer than the configured maximum.
    #[error("name is {len} characters long, the limit is {max}")]
    NameTooLong { len: usize, max: usize },

    /// An empty line is never a valid name.
    #[error("name must not be empty")]
    NameEmpty,

    /// The connection is not pending (or not registered at all).
    #[error("connection {0} not found")]
    NotFound(ConnectionId),

    /// The connection has already been promoted.
    #[error("connection {0} is already active")]
    AlreadyActive(ConnectionId),
}

impl SessionError {
    /// Returns `true` for rejections the client can fix by sending
    /// another name.
    pub fn is_name_rejection(&self) -> bool {
        matches!(
            self,
            Self::NameTaken(_) | Self::NameTooLong { .. } | Self::NameEmpty
        )
    }
}
