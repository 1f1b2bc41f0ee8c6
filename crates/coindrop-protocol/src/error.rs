//! Error types for the protocol layer.
//!
//! Everything here is produced by pure decoding, so a `ProtocolError`
//! always means "the bytes were wrong", never "the network was wrong".
//! Network failures live in `coindrop_transport::TransportError`.

use crate::FrameKind;

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The leading tag byte is not the one this decoder handles.
    #[error("expected {expected} frame (tag {tag}), found tag {found}", tag = .expected.tag())]
    TagMismatch { expected: FrameKind, found: u8 },

    /// The leading tag byte doesn't name any known frame.
    #[error("unknown frame tag {0}")]
    UnknownTag(u8),

    /// The buffer ends before the frame does.
    ///
    /// Frames are never zero-padded: a short grid is malformed, not empty.
    #[error("truncated frame: needed {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// A color byte is 0 or outside the palette.
    #[error("invalid color {0}")]
    InvalidColor(u8),

    /// The board is too large for this host to address.
    #[error("board of {columns}x{rows} cells exceeds host capacity")]
    DimensionOutOfRange { columns: u64, rows: u64 },

    /// A well-formed frame arrived where a different kind was expected,
    /// e.g. a second handshake in the middle of the snapshot stream.
    #[error("unexpected {found} frame, expected {expected}")]
    UnexpectedFrame { expected: FrameKind, found: FrameKind },

    /// A coin placed outside the board's dimensions (encoding only).
    #[error("cell ({column}, {row}) is outside the board")]
    CellOutOfBounds { column: u64, row: u64 },
}

impl ProtocolError {
    /// Returns `true` for errors caused by a board the client can't model,
    /// as opposed to bytes that don't follow the framing rules.
    pub fn is_domain_range(&self) -> bool {
        matches!(self, ProtocolError::DimensionOutOfRange { .. })
    }
}
