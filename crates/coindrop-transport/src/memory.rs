//! In-memory transport backed by Tokio channels.
//!
//! [`MemoryTransport::new`] returns the transport together with a
//! [`MemoryPeer`], which plays the server: it pushes chunks to the client
//! and receives whatever the client writes. Every `send` on the peer is
//! delivered as exactly one chunk, just like one WebSocket message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::{
    close_signal, ChunkReader, ChunkWriter, CloseTrigger, ClosingSignal,
    Connection, ConnectionId, Transport, TransportError,
};

/// Shared flags that let the peer observe teardown of the client sides.
#[derive(Debug, Default)]
struct Probe {
    reader_cancelled: AtomicBool,
    writer_closed: AtomicBool,
}

/// A [`Transport`] that connects exactly once, to its paired [`MemoryPeer`].
pub struct MemoryTransport {
    pending: Mutex<Option<(MemoryReader, MemoryWriter, CloseTrigger)>>,
}

impl MemoryTransport {
    /// Creates a transport and the peer it will connect to.
    pub fn new() -> (Self, MemoryPeer) {
        let (to_client, from_peer) = mpsc::unbounded_channel();
        let (to_peer, from_client) = mpsc::unbounded_channel();
        let (trigger, closing) = close_signal();
        let probe = Arc::new(Probe::default());

        let reader = MemoryReader {
            rx: from_peer,
            closing,
            done: false,
            probe: Arc::clone(&probe),
        };
        let writer = MemoryWriter {
            tx: Some(to_peer),
            probe: Arc::clone(&probe),
        };
        let peer = MemoryPeer {
            tx: Some(to_client),
            rx: from_client,
            probe,
        };

        let transport = Self {
            pending: Mutex::new(Some((reader, writer, trigger))),
        };
        (transport, peer)
    }
}

impl Transport for MemoryTransport {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    async fn connect(
        &self,
        endpoint: &str,
    ) -> Result<Connection<MemoryReader, MemoryWriter>, TransportError> {
        let (reader, writer, trigger) =
            self.pending.lock().await.take().ok_or_else(|| {
                TransportError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "memory transport already connected",
                ))
            })?;

        let id = ConnectionId::next();
        tracing::debug!(%id, endpoint, "memory connection established");
        Ok(Connection::new(id, reader, writer, trigger))
    }
}

/// The readable half of a memory connection.
pub struct MemoryReader {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    closing: ClosingSignal,
    done: bool,
    probe: Arc<Probe>,
}

impl ChunkReader for MemoryReader {
    async fn read(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.done {
            return Ok(None);
        }

        let chunk = tokio::select! {
            biased;
            () = self.closing.closed() => None,
            chunk = self.rx.recv() => chunk,
        };

        if chunk.is_none() {
            self.done = true;
        }
        Ok(chunk)
    }

    async fn cancel(&mut self) -> Result<(), TransportError> {
        self.done = true;
        self.rx.close();
        self.probe.reader_cancelled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// The writable half of a memory connection.
pub struct MemoryWriter {
    tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
    probe: Arc<Probe>,
}

impl ChunkWriter for MemoryWriter {
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Shutdown)?;
        tx.send(data.to_vec()).map_err(|_| {
            TransportError::ConnectionClosed("peer hung up".into())
        })
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.tx = None;
        self.probe.writer_closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// The server end of a memory connection.
pub struct MemoryPeer {
    tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    probe: Arc<Probe>,
}

impl MemoryPeer {
    /// Delivers `chunk` to the client as a single read.
    pub fn send(&self, chunk: impl Into<Vec<u8>>) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or_else(|| {
            TransportError::ConnectionClosed("peer already hung up".into())
        })?;
        tx.send(chunk.into()).map_err(|_| {
            TransportError::ConnectionClosed("client reader gone".into())
        })
    }

    /// Ends the inbound stream. The client's next read reports end-of-data
    /// once every chunk already sent has been consumed.
    pub fn hang_up(&mut self) {
        self.tx = None;
    }

    /// Receives the next chunk the client wrote, or `None` once the
    /// client's writer is closed or dropped.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    /// Returns `true` once the client cancelled its reader.
    pub fn reader_cancelled(&self) -> bool {
        self.probe.reader_cancelled.load(Ordering::SeqCst)
    }

    /// Returns `true` once the client closed its writer.
    pub fn writer_closed(&self) -> bool {
        self.probe.writer_closed.load(Ordering::SeqCst)
    }
}
