/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer's write queue is closed; nothing more can be delivered.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The peer's write queue is full because it is not reading.
    #[error("write queue full: {0}")]
    QueueFull(String),

    /// Writing queued data to the socket failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading from the socket failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Accepting a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),
}
