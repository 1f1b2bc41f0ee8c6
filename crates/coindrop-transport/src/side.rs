//! Lockable readable and writable sides of a connection.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{ChunkReader, ChunkWriter, TransportError};

/// Which half of a connection an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The inbound (server → client) half.
    Readable,
    /// The outbound (client → server) half.
    Writable,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Readable => f.write_str("readable"),
            Side::Writable => f.write_str("writable"),
        }
    }
}

/// Exclusive access to a reader. Dropping the guard releases the lock.
pub type ReadGuard<R> = OwnedMutexGuard<R>;

/// Exclusive access to a writer. Dropping the guard releases the lock.
pub type WriteGuard<W> = OwnedMutexGuard<W>;

/// The readable side of a connection.
///
/// Cloning is cheap and yields another handle to the same reader; the
/// lock is shared between all clones.
pub struct Readable<R> {
    inner: Arc<Mutex<R>>,
}

// Written by hand so that cloning the handle doesn't require `R: Clone`.
impl<R> Clone for Readable<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: ChunkReader> Readable<R> {
    /// Wraps a reader.
    pub fn new(reader: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(reader)),
        }
    }

    /// Waits for exclusive access and returns an owned guard.
    ///
    /// The guard is `'static`, so a long-running read loop can hold it
    /// for the entire session.
    pub async fn lock(&self) -> ReadGuard<R> {
        Arc::clone(&self.inner).lock_owned().await
    }

    /// Takes exclusive access if nobody holds it.
    pub fn try_lock(&self) -> Result<ReadGuard<R>, TransportError> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .map_err(|_| TransportError::Locked(Side::Readable))
    }

    /// Returns `true` while a reader holds the side.
    pub fn is_locked(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    /// Cancels the reader.
    ///
    /// # Errors
    /// Returns [`TransportError::Locked`] if a reader still holds the side.
    pub async fn cancel(&self) -> Result<(), TransportError> {
        let mut reader = self.try_lock()?;
        reader.cancel().await
    }
}

/// The writable side of a connection.
pub struct Writable<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for Writable<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: ChunkWriter> Writable<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Waits for exclusive access and returns an owned guard.
    pub async fn lock(&self) -> WriteGuard<W> {
        Arc::clone(&self.inner).lock_owned().await
    }

    /// Takes exclusive access if nobody holds it.
    pub fn try_lock(&self) -> Result<WriteGuard<W>, TransportError> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .map_err(|_| TransportError::Locked(Side::Writable))
    }

    /// Returns `true` while a writer holds the side.
    pub fn is_locked(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    /// Closes the writer.
    ///
    /// # Errors
    /// Returns [`TransportError::Locked`] if a writer still holds the side.
    pub async fn close(&self) -> Result<(), TransportError> {
        let mut writer = self.try_lock()?;
        writer.close().await
    }
}
