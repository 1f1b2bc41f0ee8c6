//! Transport abstraction layer for Coindrop.
//!
//! A game session runs over one bidirectional byte stream. This crate
//! splits that stream into two independently lockable sides:
//!
//! - [`Readable`]: wraps a [`ChunkReader`]; one reader at a time.
//! - [`Writable`]: wraps a [`ChunkWriter`]; one writer at a time.
//!
//! Each side is an `Arc<tokio::sync::Mutex<_>>`, so "is someone reading
//! right now?" is just "is the mutex held?". The lifecycle code in
//! `coindrop-session` relies on that to avoid tearing down a side while
//! a read or write is still in flight.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client transport via `tokio-tungstenite`
//!
//! The in-memory transport in [`memory`] is always available; it backs the
//! test suites and offline demos.

#![allow(async_fn_in_trait)]

mod connection;
mod error;
pub mod memory;
mod side;
#[cfg(feature = "websocket")]
mod websocket;

pub use connection::{close_signal, CloseTrigger, ClosingSignal, Connection};
pub use error::TransportError;
pub use side::{Readable, ReadGuard, Side, Writable, WriteGuard};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketReader, WebSocketTransport, WebSocketWriter};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates the next process-wide unique `ConnectionId`.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
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

/// Establishes outgoing connections to a game server.
pub trait Transport: Send + Sync + 'static {
    /// The read half produced by this transport.
    type Reader: ChunkReader;
    /// The write half produced by this transport.
    type Writer: ChunkWriter;

    /// Connects to `endpoint` and returns both sides of the stream.
    ///
    /// No retry or backoff happens here: a failure is returned as
    /// [`TransportError::ConnectFailed`] and the caller decides.
    async fn connect(
        &self,
        endpoint: &str,
    ) -> Result<Connection<Self::Reader, Self::Writer>, TransportError>;
}

/// The receiving half of a connection.
///
/// Every call to [`read`](ChunkReader::read) yields one physical chunk.
/// The protocol layer decodes each chunk as exactly one frame, so
/// implementations must not merge or split transport messages.
pub trait ChunkReader: Send + 'static {
    /// Reads the next chunk.
    ///
    /// Returns `Ok(None)` at end-of-data: the peer hung up, the reader was
    /// cancelled, or the connection began closing.
    async fn read(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Cancels the reader. Subsequent reads report end-of-data.
    async fn cancel(&mut self) -> Result<(), TransportError>;
}

/// The sending half of a connection.
pub trait ChunkWriter: Send + 'static {
    /// Writes `data` as one transport message.
    ///
    /// `Ok` means the transport accepted the bytes, nothing more.
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Closes the writer. Subsequent writes fail.
    async fn close(&mut self) -> Result<(), TransportError>;
}
