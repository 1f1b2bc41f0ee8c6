//! A connected stream: both sides plus the close signal.

use tokio::sync::watch;

use crate::{ChunkReader, ChunkWriter, ConnectionId, Readable, Writable};

/// Creates a linked close trigger and signal.
///
/// Transports hand the [`ClosingSignal`] to their reader and the
/// [`CloseTrigger`] to [`Connection::new`].
pub fn close_signal() -> (CloseTrigger, ClosingSignal) {
    let (tx, rx) = watch::channel(false);
    (CloseTrigger { tx }, ClosingSignal { rx })
}

/// The sending end of a connection's close signal.
#[derive(Debug)]
pub struct CloseTrigger {
    tx: watch::Sender<bool>,
}

impl CloseTrigger {
    /// Marks the connection as closing. Idempotent.
    pub fn fire(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once [`fire`](Self::fire) has been called.
    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }
}

/// The receiving end of a connection's close signal.
#[derive(Debug, Clone)]
pub struct ClosingSignal {
    rx: watch::Receiver<bool>,
}

impl ClosingSignal {
    /// Returns `true` once the connection has begun closing.
    pub fn is_closing(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when the connection begins closing.
    ///
    /// Also resolves if the trigger was dropped, since a dropped
    /// trigger means the owning connection is gone.
    pub async fn closed(&mut self) {
        let _ = self.rx.wait_for(|closing| *closing).await;
    }
}

/// One established bidirectional stream to the server.
pub struct Connection<R, W> {
    id: ConnectionId,
    readable: Readable<R>,
    writable: Writable<W>,
    trigger: CloseTrigger,
}

impl<R: ChunkReader, W: ChunkWriter> Connection<R, W> {
    /// Assembles a connection from its halves.
    pub fn new(
        id: ConnectionId,
        reader: R,
        writer: W,
        trigger: CloseTrigger,
    ) -> Self {
        Self {
            id,
            readable: Readable::new(reader),
            writable: Writable::new(writer),
            trigger,
        }
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// A handle to the readable side.
    pub fn readable(&self) -> Readable<R> {
        self.readable.clone()
    }

    /// A handle to the writable side.
    pub fn writable(&self) -> Writable<W> {
        self.writable.clone()
    }

    /// Signals the transport to begin closing.
    ///
    /// This does not touch either side's lock: a reader blocked in
    /// `read` observes the signal as end-of-data and returns on its own,
    /// which is what eventually releases the readable side.
    pub fn begin_close(&self) {
        self.trigger.fire();
    }

    /// Returns `true` once [`begin_close`](Self::begin_close) was called.
    pub fn is_closing(&self) -> bool {
        self.trigger.is_fired()
    }
}
