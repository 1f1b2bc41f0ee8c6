//! The view stream: inbound chunks in, ordered views out.
//!
//! ```text
//!   AwaitingHandshake ──handshake ok──→ Streaming ──end-of-data──→ Closed
//!          │                                │
//!          │                                ├──decode error────→ Closed
//!          └───────cancel requested─────────┴──cancel requested─→ Cancelled
//! ```
//!
//! There is one logical reader. The stream takes the readable side's lock
//! when [`ViewStream::run`] starts and holds it until `run` returns, so a
//! single decode/delivery is in flight at any time and views reach the
//! subscriber in exactly the order the chunks were read.
//!
//! # Cancellation latency
//!
//! Cancellation is checked between reads only. A pending read keeps
//! waiting until the next frame arrives or the connection begins closing
//! (see [`ConnectionManager::disconnect`](crate::ConnectionManager::disconnect)).
//! An end-of-data that follows a cancellation request is the expected
//! result of teardown and ends the stream as `Cancelled`, not as an error.
//!
//! # Framing errors
//!
//! There is no resync point in the wire format beyond the fixed snapshot
//! header, so any malformed frame ends the session.

use std::fmt;

use coindrop_protocol::{decode_frame, decode_snapshot, Frame, FrameKind, ProtocolError, View};
use coindrop_transport::{ChunkReader, Readable};

use crate::handshake::handshake;
use crate::{CancelHandle, Session, SessionError, StreamPhase};

/// Where the view stream is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    AwaitingHandshake,
    Streaming,
    /// Terminal: the server hung up or sent something undecodable.
    Closed,
    /// Terminal: teardown was requested. Not an error.
    Cancelled,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamState::AwaitingHandshake => f.write_str("awaiting handshake"),
            StreamState::Streaming => f.write_str("streaming"),
            StreamState::Closed => f.write_str("closed"),
            StreamState::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Turns the readable side into an ordered sequence of [`View`]s.
pub struct ViewStream<R> {
    readable: Readable<R>,
    cancel: CancelHandle,
    session: Session,
    state: StreamState,
}

impl<R: ChunkReader> ViewStream<R> {
    pub fn new(readable: Readable<R>, cancel: CancelHandle) -> Self {
        Self {
            readable,
            cancel,
            session: Session::new(),
            state: StreamState::AwaitingHandshake,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// The session state built from every view delivered so far.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// A handle that stops this stream at its next check.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Runs the stream to completion, calling `on_view` once per view.
    ///
    /// The callback receives the view and the session *after* the view
    /// was applied to it. `Joined` always comes first, exactly once.
    ///
    /// Returns `Ok(())` only when the stream was cancelled.
    ///
    /// # Errors
    /// - [`SessionError::StreamClosed`] when the server hangs up.
    /// - [`SessionError::Protocol`] on the first malformed frame.
    /// - [`SessionError::Transport`] if a read fails.
    /// - [`SessionError::AlreadyStarted`] if the stream already ran.
    pub async fn run<F>(&mut self, mut on_view: F) -> Result<(), SessionError>
    where
        F: FnMut(&View, &Session),
    {
        if self.state != StreamState::AwaitingHandshake {
            return Err(SessionError::AlreadyStarted(self.state));
        }

        let mut reader = self.readable.lock().await;
        let result = self.drive(&mut *reader, &mut on_view).await;
        // Release the side before reporting, so shutdown can proceed.
        drop(reader);

        if let Err(e) = &result {
            self.state = StreamState::Closed;
            tracing::debug!(error = %e, "view stream closed");
        }
        result
    }

    async fn drive<F>(&mut self, reader: &mut R, on_view: &mut F) -> Result<(), SessionError>
    where
        F: FnMut(&View, &Session),
    {
        if self.cancel.is_requested() {
            self.finish_cancelled();
            return Ok(());
        }

        let joined = match handshake(reader).await {
            Ok(joined) => joined,
            Err(SessionError::StreamClosed(_)) if self.cancel.is_requested() => {
                self.finish_cancelled();
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.state = StreamState::Streaming;
        self.deliver(View::Joined(joined.identity), on_view);
        if !joined.trailing.is_empty() {
            let snapshot = decode_snapshot(&joined.trailing)?;
            self.deliver(View::Snapshot(snapshot), on_view);
        }

        loop {
            if self.cancel.is_requested() {
                self.finish_cancelled();
                return Ok(());
            }

            let Some(chunk) = reader.read().await? else {
                if self.cancel.is_requested() {
                    self.finish_cancelled();
                    return Ok(());
                }
                return Err(SessionError::StreamClosed(StreamPhase::Streaming));
            };
            tracing::trace!(len = chunk.len(), "chunk received");

            let view = decode_view(&chunk)?;
            self.deliver(view, on_view);
        }
    }

    fn deliver<F>(&mut self, view: View, on_view: &mut F)
    where
        F: FnMut(&View, &Session),
    {
        self.session.apply(&view);

        match &view {
            View::Joined(identity) => tracing::info!(
                player_id = %identity.player_id,
                color = %identity.color,
                "joined game"
            ),
            View::Snapshot(snapshot) => tracing::debug!(
                columns = snapshot.columns,
                rows = snapshot.rows,
                coins = snapshot.coins.len(),
                winner_id = snapshot.winner_id,
                "snapshot applied"
            ),
        }

        on_view(&view, &self.session);
    }

    fn finish_cancelled(&mut self) {
        self.state = StreamState::Cancelled;
        self.cancel.mark_cancelled();
        tracing::debug!("view stream cancelled");
    }
}

/// Decodes a chunk read after the handshake. Only snapshots are valid here.
fn decode_view(chunk: &[u8]) -> Result<View, ProtocolError> {
    match decode_frame(chunk)? {
        Frame::Snapshot(snapshot) => Ok(View::Snapshot(snapshot)),
        other => Err(ProtocolError::UnexpectedFrame {
            expected: FrameKind::Snapshot,
            found: other.kind(),
        }),
    }
}
