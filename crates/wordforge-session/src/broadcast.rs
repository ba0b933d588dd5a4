//! Delivery to the active roster.
//!
//! A broadcast always attempts every recipient. Failed recipients are
//! reported back instead of being removed here, so the caller can finish
//! its own pass first and then disconnect them.

use wordforge_protocol::ServerMessage;
use wordforge_transport::ConnectionId;

use crate::ConnectionRegistry;

impl ConnectionRegistry {
    /// Sends `message` to every active connection.
    ///
    /// Returns the ids whose delivery failed, in turn order.
    pub fn broadcast(&self, message: &ServerMessage) -> Vec<ConnectionId> {
        self.deliver(message, None)
    }

    /// Sends `message` to every active connection except `skip`.
    pub fn broadcast_except(
        &self,
        skip: ConnectionId,
        message: &ServerMessage,
    ) -> Vec<ConnectionId> {
        self.deliver(message, Some(skip))
    }

    /// Sends `message` to one connection, pending or active.
    ///
    /// Returns `false` if the connection is unknown, its writer is gone, or
    /// its write queue is full.
    pub fn send_to(&self, id: ConnectionId, message: &ServerMessage) -> bool {
        let Some(conn) = self.get(id) else {
            return false;
        };
        match conn.send(message) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(conn_id = %id, error = %e, "direct send failed");
                false
            }
        }
    }

    fn deliver(
        &self,
        message: &ServerMessage,
        skip: Option<ConnectionId>,
    ) -> Vec<ConnectionId> {
        let mut failed = Vec::new();
        for conn in self.active.iter().filter(|c| Some(c.id()) != skip) {
            if let Err(e) = conn.send(message) {
                tracing::debug!(conn_id = %conn.id(), error = %e, "broadcast delivery failed");
                failed.push(conn.id());
            }
        }
        failed
    }
}
