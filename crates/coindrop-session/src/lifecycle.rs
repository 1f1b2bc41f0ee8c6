//! Connection lifecycle: connect, hand out the two flows, shut down.
//!
//! ```text
//!   connect() ──→ view_stream()     (reader flow, holds the readable side)
//!             └─→ command_channel() (writer flow, holds the writable side)
//!                        │
//!                        ▼
//!                  disconnect()
//!                    1. request cancellation
//!                    2. begin closing the transport
//!                    3. per side, concurrently:
//!                         wait until unlocked ──→ cancel reader / close writer
//! ```
//!
//! # Shutdown safety
//!
//! A side is never cancelled or closed while something holds it. Shutdown
//! polls each side's lock at [`ClientConfig::unlock_poll_interval`] and
//! acts in the same step that acquires it, so nothing can slip in between
//! the check and the teardown.

use coindrop_transport::{
    ChunkReader, ChunkWriter, Connection, ConnectionId, Side, Transport, TransportError,
};

use crate::{CancelHandle, ClientConfig, CommandChannel, SessionError, ViewStream};

/// Owns one connection to the game server.
pub struct ConnectionManager<R, W> {
    connection: Connection<R, W>,
    config: ClientConfig,
    cancel: CancelHandle,
}

impl<R: ChunkReader, W: ChunkWriter> ConnectionManager<R, W> {
    /// Connects to `config.endpoint`.
    ///
    /// # Errors
    /// Returns [`SessionError::Transport`] if the transport cannot connect.
    /// There is no retry.
    pub async fn connect<T>(transport: &T, config: ClientConfig) -> Result<Self, SessionError>
    where
        T: Transport<Reader = R, Writer = W>,
    {
        let config = config.validated();
        let connection = transport.connect(&config.endpoint).await?;
        tracing::info!(id = %connection.id(), endpoint = %config.endpoint, "connected");

        Ok(Self {
            connection,
            config,
            cancel: CancelHandle::new(),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.connection.id()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn connection(&self) -> &Connection<R, W> {
        &self.connection
    }

    /// A view stream over the readable side.
    ///
    /// The stream takes the side's lock only when it starts running.
    pub fn view_stream(&self) -> ViewStream<R> {
        ViewStream::new(self.connection.readable(), self.cancel.clone())
    }

    /// Takes the writable side for sending commands.
    ///
    /// # Errors
    /// Returns [`TransportError::Locked`] inside [`SessionError::Transport`]
    /// if a channel already exists.
    pub fn command_channel(&self) -> Result<CommandChannel<W>, SessionError> {
        CommandChannel::acquire(&self.connection.writable())
    }

    /// The handle that [`disconnect`](Self::disconnect) fires.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Shuts the connection down.
    ///
    /// Requests cancellation, signals the transport to close, then waits
    /// for each side to be released before cancelling the reader and
    /// closing the writer. Both sides are handled concurrently.
    ///
    /// # Errors
    /// - [`SessionError::UnlockTimedOut`] if a side stayed locked for
    ///   [`ClientConfig::max_unlock_polls`] re-checks.
    /// - [`SessionError::Transport`] if the cancel or close itself fails.
    ///
    /// When both sides fail, the readable side's error is returned.
    pub async fn disconnect(self) -> Result<(), SessionError> {
        let id = self.connection.id();
        tracing::info!(%id, "disconnecting");

        self.cancel.request();
        self.connection.begin_close();

        let readable = self.connection.readable();
        let writable = self.connection.writable();
        let config = &self.config;

        let (read_result, write_result) = tokio::join!(
            async {
                let mut reader =
                    wait_until_unlocked(Side::Readable, config, || readable.try_lock()).await?;
                reader.cancel().await?;
                Ok::<(), SessionError>(())
            },
            async {
                let mut writer =
                    wait_until_unlocked(Side::Writable, config, || writable.try_lock()).await?;
                writer.close().await?;
                Ok::<(), SessionError>(())
            },
        );

        read_result?;
        write_result?;
        tracing::info!(%id, "disconnected");
        Ok(())
    }
}

/// Polls `try_lock` until it yields a guard.
///
/// The first attempt is immediate. After that it sleeps one poll interval
/// between attempts and gives up after `max_unlock_polls` re-checks.
async fn wait_until_unlocked<G>(
    side: Side,
    config: &ClientConfig,
    mut try_lock: impl FnMut() -> Result<G, TransportError>,
) -> Result<G, SessionError> {
    let mut polls: u32 = 0;
    loop {
        match try_lock() {
            Ok(guard) => return Ok(guard),
            Err(TransportError::Locked(_)) => {}
            Err(e) => return Err(e.into()),
        }

        if config.max_unlock_polls.is_some_and(|max| polls >= max) {
            tracing::warn!(%side, polls, "side still locked, giving up");
            return Err(SessionError::UnlockTimedOut { side });
        }

        polls += 1;
        tracing::debug!(%side, polls, "side locked, waiting");
        tokio::time::sleep(config.unlock_poll_interval()).await;
    }
}
