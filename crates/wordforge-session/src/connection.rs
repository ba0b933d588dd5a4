//! A single client connection as the server tracks it.

use std::net::SocketAddr;

use wordforge_protocol::{Assembled, AssemblerConfig, LineAssembler, ServerMessage};
use wordforge_transport::{ConnectionId, Peer, TransportError};

/// One connected client: its transport handle, its name once accepted, and
/// the bytes it has sent that don't form a full line yet.
///
/// A `Connection` is owned by exactly one registry collection at a time.
/// Dropping it releases the underlying socket.
#[derive(Debug)]
pub struct Connection {
    peer: Peer,
    name: Option<String>,
    assembler: LineAssembler,
}

impl Connection {
    /// Wraps a freshly accepted peer. The connection starts unnamed.
    pub fn new(peer: Peer, assembler: AssemblerConfig) -> Self {
        Self {
            peer,
            name: None,
            assembler: LineAssembler::new(assembler),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.peer.id()
    }

    pub fn addr(&self) -> SocketAddr {
        self.peer.addr()
    }

    /// The accepted name, or `None` while pending.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Queues one message for this client.
    pub fn send(&self, message: &ServerMessage) -> Result<(), TransportError> {
        self.peer.send(message.to_wire())
    }

    /// Feeds one read into this connection's line assembler.
    pub fn push(&mut self, chunk: &[u8]) -> Assembled {
        self.assembler.push(chunk)
    }

    /// Takes the next line already retained by the assembler.
    pub fn next_line(&mut self) -> Option<String> {
        self.assembler.next_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_send_renders_message_with_network_newline() {
        let (tx, mut rx) = mpsc::channel(64);
        let peer = Peer::from_channel(
            ConnectionId::new(1),
            "127.0.0.1:5000".parse().unwrap(),
            tx,
        );
        let conn = Connection::new(peer, AssemblerConfig::default());

        conn.send(&ServerMessage::Welcome).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            "Welcome to our word game. What is your name?\r\n"
        );
        assert_eq!(conn.name(), None);
    }

    #[test]
    fn test_push_then_next_line_drains_in_order() {
        let (tx, _rx) = mpsc::channel(64);
        let peer = Peer::from_channel(
            ConnectionId::new(2),
            "127.0.0.1:5001".parse().unwrap(),
            tx,
        );
        let mut conn = Connection::new(peer, AssemblerConfig::default());

        assert_eq!(conn.push(b"a\r\nb\r\n"), Assembled::Line("a".into()));
        assert_eq!(conn.next_line(), Some("b".into()));
        assert_eq!(conn.next_line(), None);
    }
}
