//! ASCII rendering of the board and parsing of player input.

use std::fmt::Write as _;

use coindrop::prelude::*;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

fn glyph(color: Color) -> char {
    match color {
        Color::Orange => 'O',
        Color::Blue => 'B',
        Color::Red => 'R',
        Color::Yellow => 'Y',
        Color::Purple => 'P',
    }
}

/// Draws the board with row 0 at the top, where coins enter.
///
/// Column numbers in the footer are 1-based, matching what the player types.
pub fn render_board(board: &Snapshot, me: Option<&PlayerIdentity>) -> String {
    let mut out = String::new();

    for row in 0..board.rows {
        for column in 0..board.columns {
            let cell = board.coin_at(column, row).map_or('.', |coin| glyph(coin.color));
            let _ = write!(out, " {cell:>2}");
        }
        out.push('\n');
    }
    for column in 0..board.columns {
        let _ = write!(out, " {:>2}", column + 1);
    }
    out.push('\n');

    if let Some(winner) = board.winner() {
        let suffix = match me {
            Some(me) if me.player_id == winner => " (you)",
            _ => "",
        };
        let _ = writeln!(out, "winner: {winner}{suffix}");
    }
    out
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// A 0-based column to drop a coin into.
    Play(u64),
    Quit,
    Invalid,
}

/// Parses one line typed by the player: a 1-based column or `q`.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Input::Quit;
    }
    match line.parse::<u64>() {
        Ok(column) if column >= 1 => Input::Play(column - 1),
        _ => Input::Invalid,
    }
}
