//! The one-shot handshake that opens every session.
//!
//! The first inbound chunk tells the client who it is:
//!
//! ```text
//! [0x00][player_id: u64 BE][color: u8]  (+ optional snapshot frame)
//! ```
//!
//! The server is allowed to push its first snapshot in the same physical
//! read. Those trailing bytes are handed back undecoded: the caller emits
//! `Joined` first, then decodes them as a snapshot before it reads again.

use coindrop_protocol::{decode_handshake, PlayerIdentity};
use coindrop_transport::ChunkReader;

use crate::{SessionError, StreamPhase};

/// What the handshake learned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub identity: PlayerIdentity,
    /// Bytes that arrived in the same read after the handshake frame.
    /// Empty unless the server coalesced its first snapshot.
    pub trailing: Vec<u8>,
}

/// Runs the handshake on a reader the caller already holds exclusively.
///
/// Performs exactly one read.
///
/// # Errors
/// - [`SessionError::StreamClosed`] with [`StreamPhase::Handshake`] if the
///   stream ends before anything arrives.
/// - [`SessionError::Protocol`] if the chunk is not a valid handshake.
/// - [`SessionError::Transport`] if the read itself fails.
pub async fn handshake<R: ChunkReader>(reader: &mut R) -> Result<Joined, SessionError> {
    let chunk = reader
        .read()
        .await?
        .ok_or(SessionError::StreamClosed(StreamPhase::Handshake))?;
    tracing::trace!(len = chunk.len(), "handshake chunk received");

    let (identity, rest) = decode_handshake(&chunk)?;
    if !rest.is_empty() {
        tracing::debug!(len = rest.len(), "snapshot coalesced with handshake");
    }

    Ok(Joined {
        identity,
        trailing: rest.to_vec(),
    })
}
