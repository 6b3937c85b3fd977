//! Traditional move notation.
//!
//! A move is written as piece glyph, origin file, direction and target
//! file, e.g. `炮二平五` (cannon on file two moves level to file five).
//! Files are numbered 一 to 九 by column index for both sides. A trailing
//! `吃` marks a capture.

use crate::types::*;

const FILE_GLYPHS: [char; 9] = ['一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Returns the traditional glyph of a piece.
///
/// General, advisor, elephant and soldier use different glyphs per side.
pub fn piece_glyph(piece: Piece) -> char {
    match (piece.color, piece.kind) {
        (Color::Red, PieceKind::General) => '帅',
        (Color::Red, PieceKind::Advisor) => '仕',
        (Color::Red, PieceKind::Elephant) => '相',
        (Color::Red, PieceKind::Soldier) => '兵',
        (Color::Black, PieceKind::General) => '将',
        (Color::Black, PieceKind::Advisor) => '士',
        (Color::Black, PieceKind::Elephant) => '象',
        (Color::Black, PieceKind::Soldier) => '卒',
        (_, PieceKind::Horse) => '馬',
        (_, PieceKind::Chariot) => '車',
        (_, PieceKind::Cannon) => '炮',
    }
}

/// Direction of a move relative to the mover's side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the opponent's back rank.
    Advance,
    /// Toward one's own back rank.
    Retreat,
    /// Along the same row.
    Level,
}

impl Direction {
    /// Classifies the move of a `color` piece from `from` to `to`.
    pub fn of(color: Color, from: Position, to: Position) -> Self {
        let delta = to.row as i8 - from.row as i8;
        if delta == 0 {
            Direction::Level
        } else if delta.signum() == color.forward() {
            Direction::Advance
        } else {
            Direction::Retreat
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Direction::Advance => '进',
            Direction::Retreat => '退',
            Direction::Level => '平',
        }
    }
}

/// Writes the notation of `piece` moving from `from` to `to`.
pub fn notate(piece: Piece, from: Position, to: Position, captured: bool) -> String {
    let mut s = String::with_capacity(16);
    s.push(piece_glyph(piece));
    s.push(FILE_GLYPHS[from.col as usize]);
    s.push(Direction::of(piece.color, from, to).glyph());
    s.push(FILE_GLYPHS[to.col as usize]);
    if captured {
        s.push('吃');
    }
    s
}
