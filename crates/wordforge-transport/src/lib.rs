//! Transport layer for Wordforge.
//!
//! Owns the listening socket and the raw byte plumbing of every accepted
//! connection. Nothing here knows about names, turns or words.
//!
//! Each accepted stream is split into two halves driven by background tasks:
//!
//! ```text
//!   socket ──read──→ reader task ──TransportEvent──→ event loop
//!   event loop ──Peer::send──→ write queue ──→ writer task ──write──→ socket
//! ```
//!
//! The reader task is the readiness notifier: the event loop only ever sees
//! bytes that have already arrived, so it never blocks on a single client.
//! The writer task drains a bounded per-connection queue, so a slow or
//! stalled peer cannot block the event loop either. A peer that lets its
//! queue fill is refused further output, and a write that makes no progress
//! within [`TransportConfig::write_timeout_ms`] ends the writer.

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{Peer, TcpTransport, TransportConfig, READ_CHUNK};

use std::fmt;

/// Opaque identifier for a connection.
///
/// Stable for the lifetime of the connection and never reused while the
/// process runs, so a stale identifier can never alias a newer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Something that happened on a connection, reported to the event loop.
#[derive(Debug)]
pub enum TransportEvent {
    /// Bytes arrived from the peer.
    Received { id: ConnectionId, data: Vec<u8> },

    /// The peer closed its side (zero-byte read).
    Closed { id: ConnectionId },

    /// Reading or writing failed. The connection is unusable.
    Failed {
        id: ConnectionId,
        error: TransportError,
    },
}

impl TransportEvent {
    /// The connection this event belongs to.
    pub fn id(&self) -> ConnectionId {
        match self {
            Self::Received { id, .. }
            | Self::Closed { id }
            | Self::Failed { id, .. } => *id,
        }
    }
}
