//! Binary codec for the three frame shapes.
//!
//! Every function here is pure: bytes in, values out, no I/O and no
//! state. The layouts are fixed and big-endian:
//!
//! ```text
//! Handshake  [0x00][player_id: u64][color: u8]  (+ optional trailing snapshot)
//! Snapshot   [0x01][winner_id: u64][columns: u64][rows: u64][grid: columns*rows]
//! Command    [0x02][column: u64]
//! ```
//!
//! The snapshot grid is column-major: cell `(c, r)` lives at byte
//! `25 + c * rows + r`, and `0` means empty.

use std::collections::BTreeMap;

use crate::{
    Cell, Coin, Color, Command, Frame, FrameKind, PlayerId, PlayerIdentity,
    ProtocolError, Snapshot,
};

/// Length of a handshake frame without any trailing bytes.
pub const HANDSHAKE_LEN: usize = 10;

/// Length of the fixed snapshot header (tag + three `u64` fields).
pub const SNAPSHOT_HEADER_LEN: usize = 25;

/// Length of a command frame.
pub const COMMAND_LEN: usize = 9;

// ---------------------------------------------------------------------------
// Integers
// ---------------------------------------------------------------------------

pub fn encode_u64_be(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decodes the first 8 bytes of `bytes` as a big-endian `u64`.
///
/// # Errors
/// Returns [`ProtocolError::Truncated`] if fewer than 8 bytes are given.
pub fn decode_u64_be(bytes: &[u8]) -> Result<u64, ProtocolError> {
    let word: [u8; 8] = bytes
        .get(..8)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(ProtocolError::Truncated {
            needed: 8,
            available: bytes.len(),
        })?;
    Ok(u64::from_be_bytes(word))
}

/// Reads a `u64` field at `offset`, reporting truncation against the
/// whole frame rather than the sub-slice.
fn read_u64(bytes: &[u8], offset: usize) -> Result<u64, ProtocolError> {
    let field = bytes.get(offset..).unwrap_or_default();
    decode_u64_be(field).map_err(|_| ProtocolError::Truncated {
        needed: offset + 8,
        available: bytes.len(),
    })
}

fn expect_tag(bytes: &[u8], expected: FrameKind) -> Result<(), ProtocolError> {
    match bytes.first() {
        None => Err(ProtocolError::Truncated {
            needed: 1,
            available: 0,
        }),
        Some(&tag) if tag == expected.tag() => Ok(()),
        Some(&found) => Err(ProtocolError::TagMismatch { expected, found }),
    }
}

fn ensure_len(bytes: &[u8], needed: usize) -> Result<(), ProtocolError> {
    if bytes.len() < needed {
        return Err(ProtocolError::Truncated {
            needed,
            available: bytes.len(),
        });
    }
    Ok(())
}

/// Number of grid bytes for a `columns x rows` board, if this host can
/// address a frame that large.
fn grid_len(columns: u64, rows: u64) -> Result<usize, ProtocolError> {
    let out_of_range = ProtocolError::DimensionOutOfRange { columns, rows };
    let cols = usize::try_from(columns).map_err(|_| out_of_range.clone())?;
    let rows_usize = usize::try_from(rows).map_err(|_| out_of_range.clone())?;
    cols.checked_mul(rows_usize)
        .filter(|len| len.checked_add(SNAPSHOT_HEADER_LEN).is_some())
        .ok_or(out_of_range)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Encodes a command frame. `PlayCoin` is always 9 bytes.
pub fn encode_command(command: &Command) -> Vec<u8> {
    match command {
        Command::PlayCoin { column } => {
            let mut buf = Vec::with_capacity(COMMAND_LEN);
            buf.push(FrameKind::Command.tag());
            buf.extend_from_slice(&encode_u64_be(*column));
            buf
        }
    }
}

/// Decodes a command frame. Trailing bytes are ignored.
pub fn decode_command(bytes: &[u8]) -> Result<Command, ProtocolError> {
    expect_tag(bytes, FrameKind::Command)?;
    let column = read_u64(bytes, 1)?;
    Ok(Command::PlayCoin { column })
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

pub fn encode_handshake(identity: &PlayerIdentity) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HANDSHAKE_LEN);
    buf.push(FrameKind::Handshake.tag());
    buf.extend_from_slice(&encode_u64_be(identity.player_id.0));
    buf.push(identity.color.to_wire());
    buf
}

/// Decodes a handshake frame and returns whatever follows it.
///
/// The server may coalesce the first snapshot into the same physical read
/// as the handshake. Those bytes come back as the second element so the
/// caller can decode them right away instead of losing them.
///
/// # Errors
/// - [`ProtocolError::TagMismatch`] if the first byte isn't `0`.
/// - [`ProtocolError::Truncated`] if the frame is shorter than 10 bytes.
/// - [`ProtocolError::InvalidColor`] if the color byte is `0` or unknown.
pub fn decode_handshake(
    bytes: &[u8],
) -> Result<(PlayerIdentity, &[u8]), ProtocolError> {
    expect_tag(bytes, FrameKind::Handshake)?;
    ensure_len(bytes, HANDSHAKE_LEN)?;

    let player_id = PlayerId(read_u64(bytes, 1)?);
    let color = Color::from_wire(bytes[HANDSHAKE_LEN - 1])?;
    let rest = &bytes[HANDSHAKE_LEN..];

    Ok((PlayerIdentity { player_id, color }, rest))
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Encodes a snapshot frame, zero-filling empty cells.
///
/// # Errors
/// - [`ProtocolError::DimensionOutOfRange`] if the board can't be addressed.
/// - [`ProtocolError::CellOutOfBounds`] if a coin lies outside the board.
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, ProtocolError> {
    let len = grid_len(snapshot.columns, snapshot.rows)?;

    let mut buf = Vec::with_capacity(SNAPSHOT_HEADER_LEN + len);
    buf.push(FrameKind::Snapshot.tag());
    buf.extend_from_slice(&encode_u64_be(snapshot.winner_id));
    buf.extend_from_slice(&encode_u64_be(snapshot.columns));
    buf.extend_from_slice(&encode_u64_be(snapshot.rows));
    buf.resize(SNAPSHOT_HEADER_LEN + len, 0);

    for (cell, coin) in &snapshot.coins {
        if cell.column >= snapshot.columns || cell.row >= snapshot.rows {
            return Err(ProtocolError::CellOutOfBounds {
                column: cell.column,
                row: cell.row,
            });
        }
        // Both coordinates are below dimensions that grid_len accepted,
        // so the index fits in usize.
        let index = (cell.column * snapshot.rows + cell.row) as usize;
        buf[SNAPSHOT_HEADER_LEN + index] = coin.color.to_wire();
    }

    Ok(buf)
}

/// Decodes a snapshot frame into a sparse board.
///
/// Only non-zero cells are materialized. Bytes past the grid are ignored.
///
/// # Errors
/// - [`ProtocolError::TagMismatch`] if the first byte isn't `1`.
/// - [`ProtocolError::DimensionOutOfRange`] if `columns * rows` can't be
///   addressed on this host.
/// - [`ProtocolError::Truncated`] if the header or grid is short.
/// - [`ProtocolError::InvalidColor`] for a non-zero cell outside the palette.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot, ProtocolError> {
    expect_tag(bytes, FrameKind::Snapshot)?;
    ensure_len(bytes, SNAPSHOT_HEADER_LEN)?;

    let winner_id = read_u64(bytes, 1)?;
    let columns = read_u64(bytes, 9)?;
    let rows = read_u64(bytes, 17)?;

    let len = grid_len(columns, rows)?;
    let end = SNAPSHOT_HEADER_LEN + len;
    ensure_len(bytes, end)?;

    if bytes.len() > end {
        tracing::debug!(
            extra = bytes.len() - end,
            "ignoring bytes past snapshot grid"
        );
    }

    let mut coins = BTreeMap::new();
    if len > 0 {
        let rows_per_column = len / columns as usize;
        for (index, &byte) in bytes[SNAPSHOT_HEADER_LEN..end].iter().enumerate()
        {
            if byte == 0 {
                continue;
            }
            let cell = Cell::new(
                (index / rows_per_column) as u64,
                (index % rows_per_column) as u64,
            );
            coins.insert(cell, Coin { color: Color::from_wire(byte)? });
        }
    }

    Ok(Snapshot {
        winner_id,
        columns,
        rows,
        coins,
    })
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Decodes any frame by its leading tag.
///
/// A handshake decoded here drops its trailing bytes; use
/// [`decode_handshake`] where coalesced snapshots are expected.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, ProtocolError> {
    let tag = *bytes.first().ok_or(ProtocolError::Truncated {
        needed: 1,
        available: 0,
    })?;

    match FrameKind::from_tag(tag) {
        Some(FrameKind::Handshake) => {
            decode_handshake(bytes).map(|(identity, _)| Frame::Handshake(identity))
        }
        Some(FrameKind::Snapshot) => decode_snapshot(bytes).map(Frame::Snapshot),
        Some(FrameKind::Command) => decode_command(bytes).map(Frame::Command),
        None => Err(ProtocolError::UnknownTag(tag)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(winner: u64, columns: u64, rows: u64) -> Vec<u8> {
        let mut buf = vec![1];
        buf.extend_from_slice(&winner.to_be_bytes());
        buf.extend_from_slice(&columns.to_be_bytes());
        buf.extend_from_slice(&rows.to_be_bytes());
        buf
    }

    #[test]
    fn test_u64_is_big_endian() {
        assert_eq!(encode_u64_be(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(
            decode_u64_be(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]),
            Ok(0x0102_0304_0506_0708)
        );
    }

    #[test]
    fn test_u64_decode_rejects_short_input() {
        assert_eq!(
            decode_u64_be(&[1, 2, 3]),
            Err(ProtocolError::Truncated {
                needed: 8,
                available: 3
            })
        );
    }

    #[test]
    fn test_play_coin_layout() {
        let bytes = encode_command(&Command::PlayCoin { column: 3 });
        assert_eq!(bytes, vec![2, 0, 0, 0, 0, 0, 0, 0, 3]);
        assert_eq!(bytes.len(), COMMAND_LEN);
    }

    #[test]
    fn test_command_round_trip_at_extremes() {
        for column in [0, 1, 255, 256, u64::from(u32::MAX), u64::MAX - 1, u64::MAX] {
            let cmd = Command::PlayCoin { column };
            assert_eq!(decode_command(&encode_command(&cmd)), Ok(cmd));
        }
    }

    #[test]
    fn test_command_decode_rejects_wrong_tag_and_short_input() {
        assert!(matches!(
            decode_command(&[1, 0, 0, 0, 0, 0, 0, 0, 0]),
            Err(ProtocolError::TagMismatch { found: 1, .. })
        ));
        assert_eq!(
            decode_command(&[2, 0, 0]),
            Err(ProtocolError::Truncated {
                needed: 9,
                available: 3
            })
        );
    }

    #[test]
    fn test_snapshot_documented_example() {
        let mut bytes = header(0, 2, 3);
        bytes.extend_from_slice(&[0, 0, 1, 0, 0, 2]);

        let snapshot = decode_snapshot(&bytes).expect("should decode");
        assert_eq!(snapshot.winner_id, 0);
        assert_eq!(snapshot.columns, 2);
        assert_eq!(snapshot.rows, 3);
        assert_eq!(snapshot.coins.len(), 2);
        assert_eq!(snapshot.coin_at(0, 2), Some(&Coin { color: Color::Orange }));
        assert_eq!(snapshot.coin_at(1, 2), Some(&Coin { color: Color::Blue }));
    }

    #[test]
    fn test_snapshot_grid_is_column_major() {
        // 3 columns x 2 rows: column 1, row 0 is byte 25 + 1*2 + 0.
        let mut bytes = header(7, 3, 2);
        bytes.extend_from_slice(&[0, 0, 3, 0, 0, 5]);

        let snapshot = decode_snapshot(&bytes).expect("should decode");
        assert_eq!(snapshot.winner(), Some(PlayerId(7)));
        assert_eq!(snapshot.coin_at(1, 0).map(|c| c.color), Some(Color::Red));
        assert_eq!(snapshot.coin_at(2, 1).map(|c| c.color), Some(Color::Purple));
        assert_eq!(snapshot.coins.len(), 2);
    }

    #[test]
    fn test_snapshot_truncated_grid_is_rejected() {
        let mut bytes = header(0, 2, 3);
        bytes.extend_from_slice(&[0, 0, 1, 0, 0]);

        assert_eq!(
            decode_snapshot(&bytes),
            Err(ProtocolError::Truncated {
                needed: 31,
                available: 30
            })
        );
    }

    #[test]
    fn test_snapshot_truncated_header_is_rejected() {
        let bytes = header(0, 2, 3);
        assert!(matches!(
            decode_snapshot(&bytes[..20]),
            Err(ProtocolError::Truncated { needed: 25, .. })
        ));
    }

    #[test]
    fn test_snapshot_wrong_tag_is_rejected() {
        let mut bytes = header(0, 0, 0);
        bytes[0] = 0;
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(ProtocolError::TagMismatch {
                expected: FrameKind::Snapshot,
                found: 0
            })
        ));
    }

    #[test]
    fn test_snapshot_dimensions_beyond_host_capacity() {
        let bytes = header(0, u64::MAX, 2);
        let err = decode_snapshot(&bytes).expect_err("should fail");
        assert!(err.is_domain_range());
    }

    #[test]
    fn test_snapshot_invalid_cell_color() {
        let mut bytes = header(0, 1, 2);
        bytes.extend_from_slice(&[0, 9]);
        assert_eq!(decode_snapshot(&bytes), Err(ProtocolError::InvalidColor(9)));
    }

    #[test]
    fn test_snapshot_empty_board() {
        let snapshot = decode_snapshot(&header(0, 0, 6)).expect("should decode");
        assert_eq!(snapshot, Snapshot::new(0, 6));
    }

    #[test]
    fn test_snapshot_encode_matches_wire_layout() {
        let board = Snapshot::new(2, 3)
            .with_coin(0, 2, Color::Orange)
            .with_coin(1, 2, Color::Blue);

        let mut expected = header(0, 2, 3);
        expected.extend_from_slice(&[0, 0, 1, 0, 0, 2]);
        assert_eq!(encode_snapshot(&board), Ok(expected));
    }

    #[test]
    fn test_snapshot_encode_rejects_coin_outside_board() {
        let board = Snapshot::new(2, 2).with_coin(2, 0, Color::Red);
        assert_eq!(
            encode_snapshot(&board),
            Err(ProtocolError::CellOutOfBounds { column: 2, row: 0 })
        );
    }

    #[test]
    fn test_handshake_decode_without_trailing_bytes() {
        let bytes = [0, 0, 0, 0, 0, 0, 0, 0, 42, 2];
        let (identity, rest) = decode_handshake(&bytes).expect("should decode");
        assert_eq!(identity.player_id, PlayerId(42));
        assert_eq!(identity.color, Color::Blue);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_handshake_surfaces_coalesced_snapshot() {
        let identity = PlayerIdentity {
            player_id: PlayerId(1),
            color: Color::Orange,
        };
        let snapshot = Snapshot::new(1, 1).with_coin(0, 0, Color::Blue);

        let mut bytes = encode_handshake(&identity);
        let snapshot_bytes = encode_snapshot(&snapshot).expect("encode");
        bytes.extend_from_slice(&snapshot_bytes);

        let (decoded, rest) = decode_handshake(&bytes).expect("should decode");
        assert_eq!(decoded, identity);
        assert_eq!(rest, snapshot_bytes.as_slice());
        assert_eq!(decode_snapshot(rest), Ok(snapshot));
    }

    #[test]
    fn test_handshake_rejects_nonzero_tag() {
        assert!(matches!(
            decode_handshake(&[1, 0, 0, 0, 0, 0, 0, 0, 1, 1]),
            Err(ProtocolError::TagMismatch {
                expected: FrameKind::Handshake,
                found: 1
            })
        ));
    }

    #[test]
    fn test_handshake_rejects_zero_color() {
        assert_eq!(
            decode_handshake(&[0, 0, 0, 0, 0, 0, 0, 0, 1, 0]).map(|(id, _)| id),
            Err(ProtocolError::InvalidColor(0))
        );
    }

    #[test]
    fn test_handshake_rejects_short_frame() {
        assert!(matches!(
            decode_handshake(&[0, 0, 0, 0, 1]),
            Err(ProtocolError::Truncated { needed: 10, available: 5 })
        ));
    }

    #[test]
    fn test_decode_frame_dispatches_by_tag() {
        let handshake = [0, 0, 0, 0, 0, 0, 0, 0, 3, 4];
        assert_eq!(
            decode_frame(&handshake).map(|f| f.kind()),
            Ok(FrameKind::Handshake)
        );
        assert_eq!(
            decode_frame(&header(0, 0, 0)).map(|f| f.kind()),
            Ok(FrameKind::Snapshot)
        );
        assert_eq!(
            decode_frame(&encode_command(&Command::PlayCoin { column: 1 })),
            Ok(Frame::Command(Command::PlayCoin { column: 1 }))
        );
    }

    #[test]
    fn test_decode_frame_rejects_unknown_and_empty() {
        assert_eq!(decode_frame(&[9, 1, 2]), Err(ProtocolError::UnknownTag(9)));
        assert!(matches!(
            decode_frame(&[]),
            Err(ProtocolError::Truncated { needed: 1, available: 0 })
        ));
    }
}
