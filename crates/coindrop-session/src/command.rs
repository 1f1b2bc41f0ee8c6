//! Outbound commands.
//!
//! A [`CommandChannel`] holds the writable side's lock for as long as it
//! lives. While one exists, shutdown waits instead of closing the writer
//! underneath it, so drop (or [`release`](CommandChannel::release)) the
//! channel before calling
//! [`ConnectionManager::disconnect`](crate::ConnectionManager::disconnect).

use coindrop_protocol::{encode_command, Command};
use coindrop_transport::{ChunkWriter, Writable, WriteGuard};

use crate::SessionError;

/// Exclusive handle for sending commands to the server.
pub struct CommandChannel<W> {
    writer: WriteGuard<W>,
    published: u64,
}

impl<W: ChunkWriter> CommandChannel<W> {
    /// Takes the writable side.
    ///
    /// # Errors
    /// Returns [`TransportError::Locked`](coindrop_transport::TransportError::Locked)
    /// if another channel already holds it.
    pub fn acquire(writable: &Writable<W>) -> Result<Self, SessionError> {
        let writer = writable.try_lock()?;
        Ok(Self {
            writer,
            published: 0,
        })
    }

    /// Encodes `command` and writes it as one message.
    ///
    /// Success means the transport accepted the bytes. The server may still
    /// reject the move; the next snapshot is the only authority.
    pub async fn publish(&mut self, command: &Command) -> Result<(), SessionError> {
        let bytes = encode_command(command);
        self.writer.write(&bytes).await?;
        self.published += 1;
        tracing::debug!(?command, "command published");
        Ok(())
    }

    /// Asks to drop a coin into `column` (0-based).
    pub async fn play_coin(&mut self, column: u64) -> Result<(), SessionError> {
        self.publish(&Command::PlayCoin { column }).await
    }

    /// How many commands this channel has written.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Gives the writable side back. Same as dropping the channel.
    pub fn release(self) {}
}
