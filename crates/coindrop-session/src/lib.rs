//! Client-side session layer for Coindrop.
//!
//! This crate turns one connection into two independent flows:
//!
//! 1. **Reader flow** ([`ViewStream`]): handshake, then an ordered stream
//!    of board snapshots, each applied to the [`Session`] and handed to a
//!    subscriber callback.
//! 2. **Writer flow** ([`CommandChannel`]): encode and send moves.
//!
//! [`ConnectionManager`] connects, hands out both flows, and tears the
//! connection down without ever cancelling or closing a side that is
//! still in use.
//!
//! # How it fits in the stack
//!
//! ```text
//! Application (above)  ← renders views, reads player input
//!     ↕
//! Session Layer (this crate)  ← handshake, view ordering, shutdown
//!     ↕
//! Protocol Layer (below)  ← frame encoding and decoding
//!     ↕
//! Transport Layer (bottom)  ← lockable readable/writable sides
//! ```

#![allow(async_fn_in_trait)]

mod cancel;
mod command;
mod config;
mod error;
mod handshake;
mod lifecycle;
mod session;
mod stream;

pub use cancel::{CancelHandle, CancelState};
pub use command::CommandChannel;
pub use config::ClientConfig;
pub use error::{SessionError, StreamPhase};
pub use handshake::{handshake, Joined};
pub use lifecycle::ConnectionManager;
pub use session::Session;
pub use stream::{StreamState, ViewStream};
