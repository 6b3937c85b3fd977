//! Game session management for the xiangqi engine.
//!
//! A [`Game`] is the single mutable aggregate of a session: the board, the
//! side to move, the phase, the current selection and the undo history.
//! Frontends drive it with [`Game::select_square`], [`Game::undo`] and
//! [`Game::reset`] and read everything else from its public fields.
//!
//! No command ever fails. An illegal click becomes a reselection or a
//! deselection, and out-of-range coordinates or an empty history make the
//! command a no-op.

use crate::movegen;
use crate::notation;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Game struct
// ---------------------------------------------------------------------------

/// A xiangqi session with selection state and undo history.
#[derive(Debug, Clone)]
pub struct Game {
    /// Unique identifier for the session (used in log lines).
    pub id: Uuid,

    /// Current board position.
    pub board: Board,

    /// Side to move.
    pub turn: Color,

    pub phase: GamePhase,

    /// Set only on checkmate.
    pub result: Option<GameResult>,

    /// The selected cell. Always set together with `possible_moves`.
    pub selected: Option<Position>,

    /// Legal destinations of the selected piece.
    pub possible_moves: Vec<Position>,

    /// Endpoints of the most recently committed move.
    pub last_move: Option<LastMove>,

    /// Colors whose general is attacked in the current position.
    pub checked_generals: Vec<Color>,

    /// Every committed move, oldest first. Kept in step with `history`.
    pub move_log: Vec<MoveRecord>,

    /// Positions before each committed move, most recent last.
    pub history: Vec<Snapshot>,
}

/// Board and side to move before a committed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub turn: Color,
}

/// A record of a single committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 1-based position of the move in the log.
    pub move_number: u32,
    /// Which side made the move.
    pub side: Color,
    pub from: Position,
    pub to: Position,
    /// The moving piece as it stood before the move.
    pub piece: Piece,
    pub captured: Option<Piece>,
    /// Traditional notation, e.g. "炮二平五".
    pub notation: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new session from the opening position, Red to move.
    pub fn new() -> Self {
        Self::from_position(Board::initial_setup(), Color::Red)
    }

    /// Creates a session from an arbitrary position.
    ///
    /// The position is classified right away, so a session started from a
    /// mated position is already over.
    pub fn from_position(board: Board, turn: Color) -> Self {
        let (phase, result, checked_generals) = classify_position(&board, turn.opponent());
        let game = Self {
            id: Uuid::new_v4(),
            board,
            turn,
            phase,
            result,
            selected: None,
            possible_moves: Vec::new(),
            last_move: None,
            checked_generals,
            move_log: Vec::new(),
            history: Vec::new(),
        };
        log::debug!("Session {} started ({} to move, {})", game.id, turn, phase);
        game
    }

    /// Returns `true` if the game has ended (has a result).
    pub fn is_over(&self) -> bool {
        self.result.is_some() || self.phase.is_terminal()
    }

    /// Handles a click on `(row, col)`.
    ///
    /// - With nothing selected, a click on one of the mover's pieces selects
    ///   it; anything else is ignored.
    /// - With a selection, a click on a legal destination commits the move,
    ///   a click on another own piece moves the selection there, and any
    ///   other click clears the selection.
    pub fn select_square(&mut self, row: i32, col: i32) {
        let Some(pos) = Position::try_new(row, col) else {
            log::debug!("Session {}: ignoring click outside the board ({}, {})", self.id, row, col);
            return;
        };
        if self.is_over() {
            return;
        }

        if let Some(from) = self.selected
            && movegen::can_move(&self.board, from, pos, self.turn)
        {
            self.commit_move(from, pos);
            return;
        }

        match self.board.get(pos) {
            Some(piece) if piece.color == self.turn => {
                self.possible_moves = movegen::legal_moves(&self.board, pos);
                self.selected = Some(pos);
                log::debug!(
                    "Session {}: selected {} on {} ({} targets)",
                    self.id,
                    piece.label(),
                    pos,
                    self.possible_moves.len()
                );
            }
            _ => self.clear_selection(),
        }
    }

    /// Returns the cached destinations if `(row, col)` is the live selection,
    /// otherwise an empty list.
    pub fn get_legal_moves(&self, row: i32, col: i32) -> Vec<Position> {
        match Position::try_new(row, col) {
            Some(pos) if self.selected == Some(pos) => self.possible_moves.clone(),
            _ => Vec::new(),
        }
    }

    /// Every move available to the side to move.
    pub fn legal_moves(&self) -> Vec<(Position, Position)> {
        movegen::all_legal_moves(&self.board, self.turn)
    }

    /// Takes back the most recent move. Does nothing without history.
    pub fn undo(&mut self) {
        let Some(snapshot) = self.history.pop() else {
            return;
        };
        self.move_log.pop();

        self.board = snapshot.board;
        self.turn = snapshot.turn;
        self.phase = GamePhase::Playing;
        self.result = None;
        self.last_move = None;
        self.checked_generals.clear();
        self.clear_selection();

        log::info!(
            "Session {}: move taken back, {} to move ({} moves left)",
            self.id,
            self.turn,
            self.history.len()
        );
    }

    /// Returns to the opening position and clears all history.
    pub fn reset(&mut self) {
        self.board = Board::initial_setup();
        self.turn = Color::Red;
        self.phase = GamePhase::Playing;
        self.result = None;
        self.last_move = None;
        self.checked_generals.clear();
        self.move_log.clear();
        self.history.clear();
        self.clear_selection();

        log::info!("Session {} reset to the opening position", self.id);
    }

    /// Returns the current session state as a JSON-compatible object.
    pub fn to_state_json(&self) -> GameStateJson {
        GameStateJson {
            fen: self.board.to_fen(),
            board: self.board.to_map(),
            turn: self.turn,
            phase: self.phase,
            result: self.result,
            selected: self.selected,
            possible_moves: self.possible_moves.clone(),
            last_move: self.last_move,
            checked_generals: self.checked_generals.clone(),
            move_log: self.move_log.clone(),
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.possible_moves.clear();
    }

    /// Plays `from` → `to` for the side to move. The caller has already
    /// checked legality.
    fn commit_move(&mut self, from: Position, to: Position) {
        let Some(piece) = self.board.get(from) else {
            return;
        };
        let mover = self.turn;

        self.history.push(Snapshot {
            board: self.board.clone(),
            turn: mover,
        });

        let mut board = self.board.clone();
        let captured = movegen::apply_move_to_board(&mut board, from, to);
        let (phase, result, checked_generals) = classify_position(&board, mover);

        let record = MoveRecord {
            move_number: self.move_log.len() as u32 + 1,
            side: mover,
            from,
            to,
            piece,
            captured,
            notation: notation::notate(piece, from, to, captured.is_some()),
            timestamp: unix_timestamp_millis(),
        };
        log::info!(
            "Session {}: {}. {} {} ({}{}{})",
            self.id,
            record.move_number,
            mover,
            record.notation,
            from,
            if captured.is_some() { "x" } else { "-" },
            to
        );
        self.move_log.push(record);

        self.board = board;
        self.turn = mover.opponent();
        self.phase = phase;
        self.result = result;
        self.checked_generals = checked_generals;
        self.last_move = Some(LastMove { from, to });
        self.clear_selection();

        match self.phase {
            GamePhase::Checkmate => log::info!("Session {}: checkmate, {} wins", self.id, mover),
            GamePhase::Check => log::info!(
                "Session {}: check on {:?}",
                self.id,
                self.checked_generals
            ),
            _ => {}
        }
    }
}

/// Classifies the position reached after `mover` moved.
///
/// Returns the phase, the result (only on checkmate) and the colors whose
/// general is attacked. The mover's own general counts too: a move that
/// opens the file between the generals leaves both in check.
fn classify_position(board: &Board, mover: Color) -> (GamePhase, Option<GameResult>, Vec<Color>) {
    let next = mover.opponent();
    let checked: Vec<Color> = [Color::Red, Color::Black]
        .into_iter()
        .filter(|&c| movegen::is_in_check(board, c))
        .collect();

    if checked.contains(&next) && movegen::is_checkmate(board, next) {
        (GamePhase::Checkmate, Some(GameResult::win_for(mover)), checked)
    } else if checked.is_empty() {
        (GamePhase::Playing, None, checked)
    } else {
        (GamePhase::Check, None, checked)
    }
}

/// Returns the current Unix timestamp in milliseconds.
fn unix_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
