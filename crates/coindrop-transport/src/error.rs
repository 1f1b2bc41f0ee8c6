use crate::Side;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The side is held by an active reader or writer.
    ///
    /// Cancelling or closing a side requires exclusive access, so this
    /// is returned instead of tearing down under an in-flight operation.
    #[error("{0} side is locked")]
    Locked(Side),

    /// The side was already closed by shutdown.
    #[error("transport shut down")]
    Shutdown,
}
