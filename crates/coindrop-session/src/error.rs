//! Error types for the session layer.

use std::fmt;

use coindrop_protocol::ProtocolError;
use coindrop_transport::{Side, TransportError};

use crate::StreamState;

/// Where in the session the inbound stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// Before the handshake frame arrived. No session was ever possible.
    Handshake,
    /// While waiting for the next snapshot.
    Streaming,
}

impl fmt::Display for StreamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamPhase::Handshake => f.write_str("handshake"),
            StreamPhase::Streaming => f.write_str("streaming"),
        }
    }
}

/// Errors that can end a game session.
///
/// All of these are fatal for the session. Nothing in this crate retries;
/// the owner of the [`ConnectionManager`](crate::ConnectionManager) is
/// expected to disconnect and start over.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The transport failed: could not connect, send, or receive.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server sent bytes that don't decode: wrong tag, truncated
    /// frame, unknown color, or a board too large to model.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server hung up where a frame was expected.
    ///
    /// Kept apart from [`SessionError::Protocol`] so callers can tell
    /// "server went away" from "server sent garbage".
    #[error("stream closed during {0}")]
    StreamClosed(StreamPhase),

    /// A side stayed locked for the whole shutdown wait.
    #[error("{side} side still locked after shutdown wait")]
    UnlockTimedOut { side: Side },

    /// [`ViewStream::run`](crate::ViewStream::run) was called on a stream
    /// that already ran.
    #[error("view stream already {0}")]
    AlreadyStarted(StreamState),
}

impl SessionError {
    /// Returns `true` if the server closed the stream.
    pub fn is_stream_closed(&self) -> bool {
        matches!(self, SessionError::StreamClosed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_closed_is_distinct_from_protocol() {
        let closed = SessionError::StreamClosed(StreamPhase::Streaming);
        let garbage: SessionError = ProtocolError::UnknownTag(7).into();

        assert!(closed.is_stream_closed());
        assert!(!garbage.is_stream_closed());
        assert_eq!(closed.to_string(), "stream closed during streaming");
    }

    #[test]
    fn test_from_transport_error() {
        let err: SessionError = TransportError::Locked(Side::Writable).into();
        assert!(matches!(err, SessionError::Transport(_)));
        assert!(err.to_string().contains("writable"));
    }

    #[test]
    fn test_unlock_timeout_message() {
        let err = SessionError::UnlockTimedOut {
            side: Side::Readable,
        };
        assert_eq!(err.to_string(), "readable side still locked after shutdown wait");
    }
}
