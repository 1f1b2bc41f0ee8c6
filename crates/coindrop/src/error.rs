//! Unified error type for Coindrop.

use coindrop_protocol::ProtocolError;
use coindrop_session::SessionError;
use coindrop_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `coindrop` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates the `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CoindropError {
    /// A transport-level error (connect, send, receive, locked side).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (bad tag, truncated frame, invalid color).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (stream closed, unlock timeout).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for a client config.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
