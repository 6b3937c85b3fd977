//! Core types for the xiangqi engine.
//!
//! This module defines the fundamental data structures used throughout the
//! engine: sides, piece kinds, board coordinates, the 10×9 board itself and
//! the JSON read model handed to frontends.
//!
//! Coordinates follow the screen layout: row 0 is Black's back rank at the
//! top, row 9 is Red's back rank at the bottom, and columns run 0–8 from
//! left to right.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Number of rows on the board.
pub const ROWS: u8 = 10;

/// Number of columns on the board.
pub const COLS: u8 = 9;

/// Number of cells on the board.
pub const CELLS: usize = ROWS as usize * COLS as usize;

/// Piece placement of the opening position in xiangqi FEN.
pub const START_FEN: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR";

// ---------------------------------------------------------------------------
// Piece & Color
// ---------------------------------------------------------------------------

/// The side a piece belongs to. Red always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Starts on rows 5–9 and advances toward row 0.
    Red,
    /// Starts on rows 0–4 and advances toward row 9.
    Black,
}

impl Color {
    /// Returns the opposite color.
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    /// Row delta of one step toward the opponent's back rank.
    pub fn forward(self) -> i8 {
        match self {
            Color::Red => -1,
            Color::Black => 1,
        }
    }

    /// Returns `true` if `row` lies on this color's side of the river.
    pub fn owns_row(self, row: u8) -> bool {
        match self {
            Color::Red => row >= 5,
            Color::Black => row <= 4,
        }
    }

    /// Returns `true` if `pos` lies inside this color's palace.
    pub fn palace_contains(self, pos: Position) -> bool {
        let rows = match self {
            Color::Red => 7..=9,
            Color::Black => 0..=2,
        };
        rows.contains(&pos.row) && (3..=5).contains(&pos.col)
    }

    fn prefix(self) -> char {
        match self {
            Color::Red => 'r',
            Color::Black => 'b',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Black => write!(f, "black"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red" | "r" | "w" => Ok(Color::Red),
            "black" | "b" => Ok(Color::Black),
            _ => Err(format!("Unknown side '{}'. Valid: red, black", s)),
        }
    }
}

/// The seven xiangqi piece kinds (without color information).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    General,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Soldier,
}

impl PieceKind {
    /// Lowercase English name, as used in piece labels.
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::General => "general",
            PieceKind::Advisor => "advisor",
            PieceKind::Elephant => "elephant",
            PieceKind::Horse => "horse",
            PieceKind::Chariot => "chariot",
            PieceKind::Cannon => "cannon",
            PieceKind::Soldier => "soldier",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// A piece with kind, color and a stable identity.
///
/// `id` tells apart otherwise identical pieces (the five soldiers of one
/// side, say). It is an ordinal per (color, kind) and never affects rule
/// evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub id: u8,
}

impl Piece {
    /// Creates a new piece.
    pub fn new(kind: PieceKind, color: Color, id: u8) -> Self {
        Self { kind, color, id }
    }

    /// Stable label such as `r_chariot_0` or `b_soldier_4`.
    pub fn label(&self) -> String {
        format!("{}_{}_{}", self.color.prefix(), self.kind.name(), self.id)
    }

    /// Converts the piece to its FEN letter.
    /// Uppercase for Red, lowercase for Black.
    pub fn to_fen_char(self) -> char {
        let c = match self.kind {
            PieceKind::General => 'K',
            PieceKind::Advisor => 'A',
            PieceKind::Elephant => 'B',
            PieceKind::Horse => 'N',
            PieceKind::Chariot => 'R',
            PieceKind::Cannon => 'C',
            PieceKind::Soldier => 'P',
        };
        match self.color {
            Color::Red => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// Parses a FEN letter into a color and kind.
    ///
    /// Accepts both the western letters (`b`, `n`) and the common
    /// alternatives (`e`, `h`) for elephant and horse.
    pub fn kind_from_fen_char(c: char) -> Option<(PieceKind, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::Red
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_uppercase() {
            'K' => PieceKind::General,
            'A' => PieceKind::Advisor,
            'B' | 'E' => PieceKind::Elephant,
            'N' | 'H' => PieceKind::Horse,
            'R' => PieceKind::Chariot,
            'C' => PieceKind::Cannon,
            'P' => PieceKind::Soldier,
            _ => return None,
        };
        Some((kind, color))
    }
}

/// Hands out piece ids in placement order, one counter per (color, kind).
#[derive(Debug, Default)]
struct IdAllocator {
    next: [[u8; 7]; 2],
}

impl IdAllocator {
    fn piece(&mut self, kind: PieceKind, color: Color) -> Piece {
        let slot = &mut self.next[color as usize][kind.slot()];
        let piece = Piece::new(kind, color, *slot);
        *slot += 1;
        piece
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cell on the board.
///
/// - `row`: 0 (Black's back rank) to 9 (Red's back rank)
/// - `col`: 0 (file `a`) to 8 (file `i`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    /// Creates a position. Panics in debug builds when out of range.
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < ROWS && col < COLS, "Position out of bounds");
        Self { row, col }
    }

    /// Creates a position from signed coordinates, or `None` if off-board.
    pub fn try_new(row: i32, col: i32) -> Option<Self> {
        if (0..ROWS as i32).contains(&row) && (0..COLS as i32).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Returns a flat index (0..90) for the position.
    pub fn index(self) -> usize {
        self.row as usize * COLS as usize + self.col as usize
    }

    /// Every position on the board in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Position { row, col }))
    }

    /// Parses text such as `"e9"` (file letter, then row digit).
    pub fn from_notation(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let row = bytes[1].wrapping_sub(b'0');
        if row < ROWS && col < COLS {
            Some(Position { row, col })
        } else {
            None
        }
    }

    /// Converts the position to text such as `"e9"`.
    pub fn to_notation(self) -> String {
        format!("{}{}", (b'a' + self.col) as char, self.row)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The 10×9 board as a flat array of optional pieces.
///
/// Index mapping: `row * 9 + col`. Everything inside is a plain value, so
/// `clone()` is a full deep copy and may be used freely for simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub squares: [Option<Piece>; CELLS],
}

impl Default for Board {
    /// Returns an empty board.
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Returns a board with every cell empty.
    pub fn empty() -> Self {
        Self {
            squares: [None; CELLS],
        }
    }

    /// Returns the piece at the given position, if any.
    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.index()]
    }

    /// Sets (or clears) the piece at the given position.
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        self.squares[pos.index()] = piece;
    }

    /// Creates the standard opening position.
    pub fn initial_setup() -> Self {
        let mut board = Board::empty();
        let mut ids = IdAllocator::default();

        const BACK_RANK: [PieceKind; 9] = [
            PieceKind::Chariot,
            PieceKind::Horse,
            PieceKind::Elephant,
            PieceKind::Advisor,
            PieceKind::General,
            PieceKind::Advisor,
            PieceKind::Elephant,
            PieceKind::Horse,
            PieceKind::Chariot,
        ];

        for (color, back, cannons, soldiers) in [(Color::Black, 0, 2, 3), (Color::Red, 9, 7, 6)] {
            for (col, kind) in BACK_RANK.iter().enumerate() {
                board.set(Position::new(back, col as u8), Some(ids.piece(*kind, color)));
            }
            for col in [1, 7] {
                board.set(
                    Position::new(cannons, col),
                    Some(ids.piece(PieceKind::Cannon, color)),
                );
            }
            for col in (0..COLS).step_by(2) {
                board.set(
                    Position::new(soldiers, col),
                    Some(ids.piece(PieceKind::Soldier, color)),
                );
            }
        }

        board
    }

    /// Iterates over every occupied cell in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
    }

    /// Finds the general of the given color (first in row-major order).
    /// Returns `None` if it is missing, which only happens on hand-built boards.
    pub fn find_general(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, p)| p.kind == PieceKind::General && p.color == color)
            .map(|(pos, _)| pos)
    }

    /// Converts the board to the JSON-compatible map format (only occupied cells).
    pub fn to_map(&self) -> HashMap<String, String> {
        self.pieces()
            .map(|(pos, piece)| (pos.to_notation(), piece.to_fen_char().to_string()))
            .collect()
    }

    /// Generates the FEN piece placement, row 0 first.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for row in 0..ROWS {
            let mut empty_count = 0;
            for col in 0..COLS {
                match self.get(Position::new(row, col)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.to_fen_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if row + 1 < ROWS {
                fen.push('/');
            }
        }
        fen
    }

    /// Parses a FEN piece placement. Anything after the first whitespace
    /// (side to move, counters) is ignored.
    ///
    /// Piece ids are assigned in row-major order per color and kind, which
    /// reproduces the ids of [`Board::initial_setup`] for the opening.
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        let placement = fen.split_whitespace().next().ok_or("Empty FEN string")?;
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != ROWS as usize {
            return Err(format!(
                "FEN must have {} rows, found {}",
                ROWS,
                rows.len()
            ));
        }

        let mut board = Board::empty();
        let mut ids = IdAllocator::default();

        for (row, text) in rows.iter().enumerate() {
            let mut col: u8 = 0;
            for ch in text.chars() {
                if let Some(run) = ch.to_digit(10) {
                    if run == 0 {
                        return Err(format!("Empty run '0' in row {}", row));
                    }
                    if col as u32 + run > COLS as u32 {
                        return Err(format!("Row {} has more than {} cells", row, COLS));
                    }
                    col += run as u8;
                    continue;
                }
                let (kind, color) = Piece::kind_from_fen_char(ch)
                    .ok_or_else(|| format!("Invalid piece symbol '{}' in row {}", ch, row))?;
                if col >= COLS {
                    return Err(format!("Row {} has more than {} cells", row, COLS));
                }
                board.set(Position::new(row as u8, col), Some(ids.piece(kind, color)));
                col += 1;
            }
            if col != COLS {
                return Err(format!(
                    "Row {} describes {} cells, expected {}",
                    row, col, COLS
                ));
            }
        }

        Ok(board)
    }
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// The phase of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Idle,
    Playing,
    Check,
    Checkmate,
    /// Terminal state kept for rule extensions; the current rules never reach it.
    Draw,
}

impl GamePhase {
    /// Returns `true` for phases after which no more moves are accepted.
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Checkmate | GamePhase::Draw)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Idle => write!(f, "idle"),
            GamePhase::Playing => write!(f, "playing"),
            GamePhase::Check => write!(f, "check"),
            GamePhase::Checkmate => write!(f, "checkmate"),
            GamePhase::Draw => write!(f, "draw"),
        }
    }
}

/// The result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    RedWins,
    BlackWins,
    Draw,
}

impl GameResult {
    /// The result in which `color` wins.
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::Red => GameResult::RedWins,
            Color::Black => GameResult::BlackWins,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::RedWins => write!(f, "1-0 (Red wins)"),
            GameResult::BlackWins => write!(f, "0-1 (Black wins)"),
            GameResult::Draw => write!(f, "1/2-1/2 (Draw)"),
        }
    }
}

/// Endpoints of the most recently committed move, for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub from: Position,
    pub to: Position,
}

// ---------------------------------------------------------------------------
// JSON read model
// ---------------------------------------------------------------------------

/// Snapshot of a session for frontends (board, status, selection, log).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateJson {
    /// FEN piece placement of the current board.
    pub fen: String,

    /// Map of occupied cells. Key = cell name (e.g. "e9"), value = FEN letter.
    pub board: HashMap<String, String>,

    /// Side to move.
    pub turn: Color,

    pub phase: GamePhase,

    pub result: Option<GameResult>,

    /// Currently selected cell, if any.
    pub selected: Option<Position>,

    /// Legal destinations of the selected piece.
    pub possible_moves: Vec<Position>,

    pub last_move: Option<LastMove>,

    /// Colors whose general is attacked in the current position.
    pub checked_generals: Vec<Color>,

    /// Every committed move, oldest first.
    pub move_log: Vec<crate::game::MoveRecord>,
}
