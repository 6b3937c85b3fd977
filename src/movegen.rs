//! Move validation, enumeration, check and checkmate detection.
//!
//! Legality here is the per-piece movement rule of xiangqi:
//!
//! - Chariot, cannon (with its screen), horse (with its leg)
//! - Elephant (eye point, may not cross the river)
//! - Advisor and general (confined to the palace)
//! - Flying general (capture of the enemy general along a clear file)
//! - Soldier (forward only until it crosses the river)
//!
//! A move that leaves one's own general attacked is still reported as
//! legal by [`can_move`]; the session classifies such positions as check
//! after the fact.

use crate::types::*;

// ---------------------------------------------------------------------------
// Move validation
// ---------------------------------------------------------------------------

/// Returns `true` if the piece of `color` on `from` may move to `to`.
///
/// `from` must hold a piece of `color` and `to` must not hold one; the rest
/// is decided by the rule of the moving piece's kind.
pub fn can_move(board: &Board, from: Position, to: Position, color: Color) -> bool {
    let piece = match board.get(from) {
        Some(p) if p.color == color => p,
        _ => return false,
    };
    if from == to {
        return false;
    }
    if let Some(target) = board.get(to)
        && target.color == color
    {
        return false;
    }

    let dr = from.row.abs_diff(to.row);
    let dc = from.col.abs_diff(to.col);

    match piece.kind {
        PieceKind::Chariot => (dr == 0 || dc == 0) && pieces_between(board, from, to) == Some(0),
        PieceKind::Horse => horse_can_move(board, from, to, dr, dc),
        PieceKind::Elephant => elephant_can_move(board, from, to, color, dr, dc),
        PieceKind::Advisor => dr == 1 && dc == 1 && color.palace_contains(to),
        PieceKind::General => general_can_move(board, from, to, color, dr, dc),
        PieceKind::Cannon => cannon_can_move(board, from, to),
        PieceKind::Soldier => soldier_can_move(from, to, color, dr, dc),
    }
}

/// Counts the pieces strictly between two cells on the same row or column.
/// Returns `None` if the cells do not share a line.
pub fn pieces_between(board: &Board, from: Position, to: Position) -> Option<usize> {
    if from.row == to.row {
        let (lo, hi) = (from.col.min(to.col), from.col.max(to.col));
        Some(
            (lo + 1..hi)
                .filter(|&col| board.get(Position::new(from.row, col)).is_some())
                .count(),
        )
    } else if from.col == to.col {
        let (lo, hi) = (from.row.min(to.row), from.row.max(to.row));
        Some(
            (lo + 1..hi)
                .filter(|&row| board.get(Position::new(row, from.col)).is_some())
                .count(),
        )
    } else {
        None
    }
}

fn horse_can_move(board: &Board, from: Position, to: Position, dr: u8, dc: u8) -> bool {
    let leg = match (dr, dc) {
        (2, 1) => Position::new((from.row + to.row) / 2, from.col),
        (1, 2) => Position::new(from.row, (from.col + to.col) / 2),
        _ => return false,
    };
    board.get(leg).is_none()
}

fn elephant_can_move(
    board: &Board,
    from: Position,
    to: Position,
    color: Color,
    dr: u8,
    dc: u8,
) -> bool {
    if dr != 2 || dc != 2 || !color.owns_row(to.row) {
        return false;
    }
    let eye = Position::new((from.row + to.row) / 2, (from.col + to.col) / 2);
    board.get(eye).is_none()
}

fn general_can_move(
    board: &Board,
    from: Position,
    to: Position,
    color: Color,
    dr: u8,
    dc: u8,
) -> bool {
    if dr + dc == 1 {
        return color.palace_contains(to);
    }

    // Flying general: capture the enemy general along an open file.
    dc == 0
        && matches!(
            board.get(to),
            Some(Piece { kind: PieceKind::General, color: c, .. }) if c != color
        )
        && pieces_between(board, from, to) == Some(0)
}

fn cannon_can_move(board: &Board, from: Position, to: Position) -> bool {
    match pieces_between(board, from, to) {
        Some(screens) if board.get(to).is_some() => screens == 1,
        Some(screens) => screens == 0,
        None => false,
    }
}

fn soldier_can_move(from: Position, to: Position, color: Color, dr: u8, dc: u8) -> bool {
    if dr + dc != 1 {
        return false;
    }
    if dc == 0 {
        return to.row as i8 - from.row as i8 == color.forward();
    }
    // Sideways steps only once the soldier stands across the river.
    !color.owns_row(from.row)
}

// ---------------------------------------------------------------------------
// Move enumeration
// ---------------------------------------------------------------------------

/// Returns every destination of the piece on `pos`, in row-major order.
/// Empty if `pos` holds no piece.
pub fn legal_moves(board: &Board, pos: Position) -> Vec<Position> {
    let Some(piece) = board.get(pos) else {
        return Vec::new();
    };
    Position::all()
        .filter(|&to| can_move(board, pos, to, piece.color))
        .collect()
}

/// Returns every `(from, to)` move available to `color`.
pub fn all_legal_moves(board: &Board, color: Color) -> Vec<(Position, Position)> {
    let mut moves = Vec::with_capacity(64);
    for (from, piece) in board.pieces() {
        if piece.color != color {
            continue;
        }
        moves.extend(legal_moves(board, from).into_iter().map(|to| (from, to)));
    }
    moves
}

/// Moves the piece on `from` to `to`, returning the captured piece.
///
/// Does nothing if `from` is empty.
pub fn apply_move_to_board(board: &mut Board, from: Position, to: Position) -> Option<Piece> {
    let piece = board.get(from)?;
    let captured = board.get(to);
    board.set(from, None);
    board.set(to, Some(piece));
    captured
}

// ---------------------------------------------------------------------------
// Check & checkmate detection
// ---------------------------------------------------------------------------

/// Returns `true` if any piece of `attacker_color` may move onto `sq`.
pub fn is_square_attacked(board: &Board, sq: Position, attacker_color: Color) -> bool {
    board
        .pieces()
        .any(|(from, piece)| piece.color == attacker_color && can_move(board, from, sq, attacker_color))
}

/// Returns `true` if the general of the given color is currently attacked.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    if let Some(general) = board.find_general(color) {
        is_square_attacked(board, general, color.opponent())
    } else {
        // No general — only possible on a hand-built board
        false
    }
}

/// Returns `true` if `color` is in check and no move of any of its pieces
/// gets the general out of it.
///
/// Each candidate is played on a clone; `board` itself is never touched.
pub fn is_checkmate(board: &Board, color: Color) -> bool {
    if !is_in_check(board, color) {
        return false;
    }

    for (from, to) in all_legal_moves(board, color) {
        let mut test_board = board.clone();
        apply_move_to_board(&mut test_board, from, to);
        if !is_in_check(&test_board, color) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn place(board: &mut Board, row: u8, col: u8, kind: PieceKind, color: Color) {
        board.set(pos(row, col), Some(Piece::new(kind, color, 0)));
    }

    /// A board with both generals tucked into their palaces on different files.
    fn generals_only() -> Board {
        let mut board = Board::empty();
        place(&mut board, 9, 3, PieceKind::General, Color::Red);
        place(&mut board, 0, 5, PieceKind::General, Color::Black);
        board
    }

    /// Flips the board top to bottom and swaps every piece's color.
    fn mirrored(board: &Board) -> Board {
        let mut out = Board::empty();
        for (p, piece) in board.pieces() {
            let flipped = Piece::new(piece.kind, piece.color.opponent(), piece.id);
            out.set(pos(ROWS - 1 - p.row, p.col), Some(flipped));
        }
        out
    }

    #[test]
    fn test_opening_moves_per_side() {
        let board = Board::initial_setup();
        assert_eq!(all_legal_moves(&board, Color::Red).len(), 44);
        assert_eq!(all_legal_moves(&board, Color::Black).len(), 44);
    }

    #[test]
    fn test_opening_not_in_check() {
        let board = Board::initial_setup();
        assert!(!is_in_check(&board, Color::Red));
        assert!(!is_in_check(&board, Color::Black));
    }

    #[test]
    fn test_moves_stay_on_board_and_off_own_pieces() {
        let board = Board::initial_setup();
        for (from, piece) in board.pieces() {
            for to in legal_moves(&board, from) {
                assert!(to.row < ROWS && to.col < COLS);
                assert!(
                    board.get(to).is_none_or(|t| t.color != piece.color),
                    "{} may not land on its own piece at {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_wrong_color_or_empty_origin_rejected() {
        let board = Board::initial_setup();
        assert!(!can_move(&board, pos(6, 0), pos(5, 0), Color::Black));
        assert!(!can_move(&board, pos(5, 0), pos(4, 0), Color::Red));
        assert!(can_move(&board, pos(6, 0), pos(5, 0), Color::Red));
        assert!(legal_moves(&board, pos(5, 0)).is_empty());
    }

    #[test]
    fn test_chariot_blocked_path() {
        let mut board = generals_only();
        place(&mut board, 5, 0, PieceKind::Chariot, Color::Red);
        place(&mut board, 5, 4, PieceKind::Soldier, Color::Black);
        place(&mut board, 2, 0, PieceKind::Soldier, Color::Red);

        assert!(can_move(&board, pos(5, 0), pos(5, 3), Color::Red));
        assert!(can_move(&board, pos(5, 0), pos(5, 4), Color::Red));
        assert!(!can_move(&board, pos(5, 0), pos(5, 6), Color::Red));
        assert!(can_move(&board, pos(5, 0), pos(3, 0), Color::Red));
        assert!(!can_move(&board, pos(5, 0), pos(2, 0), Color::Red));
        assert!(!can_move(&board, pos(5, 0), pos(1, 0), Color::Red));
        assert!(!can_move(&board, pos(5, 0), pos(4, 1), Color::Red));
    }

    #[test]
    fn test_horse_leg_blocking() {
        let mut board = generals_only();
        place(&mut board, 5, 4, PieceKind::Horse, Color::Red);
        assert_eq!(legal_moves(&board, pos(5, 4)).len(), 8);

        // Leg toward row 4 blocks both jumps that go two rows up.
        place(&mut board, 4, 4, PieceKind::Soldier, Color::Black);
        assert!(!can_move(&board, pos(5, 4), pos(3, 3), Color::Red));
        assert!(!can_move(&board, pos(5, 4), pos(3, 5), Color::Red));
        assert!(can_move(&board, pos(5, 4), pos(4, 2), Color::Red));
        assert!(can_move(&board, pos(5, 4), pos(7, 5), Color::Red));
        assert_eq!(legal_moves(&board, pos(5, 4)).len(), 6);
    }

    #[test]
    fn test_elephant_river_and_eye() {
        let mut board = generals_only();
        place(&mut board, 5, 2, PieceKind::Elephant, Color::Red);

        let moves = legal_moves(&board, pos(5, 2));
        assert_eq!(moves, vec![pos(7, 0), pos(7, 4)]);
        assert!(moves.iter().all(|m| m.row >= 5));

        place(&mut board, 6, 3, PieceKind::Soldier, Color::Black);
        assert_eq!(legal_moves(&board, pos(5, 2)), vec![pos(7, 0)]);

        let mut board = generals_only();
        place(&mut board, 4, 6, PieceKind::Elephant, Color::Black);
        let moves = legal_moves(&board, pos(4, 6));
        assert_eq!(moves, vec![pos(2, 4), pos(2, 8)]);
    }

    #[test]
    fn test_advisor_confined_to_palace() {
        let mut board = generals_only();
        place(&mut board, 7, 3, PieceKind::Advisor, Color::Red);
        assert_eq!(legal_moves(&board, pos(7, 3)), vec![pos(8, 4)]);

        place(&mut board, 8, 4, PieceKind::Advisor, Color::Red);
        let moves = legal_moves(&board, pos(8, 4));
        assert_eq!(moves, vec![pos(7, 5), pos(9, 5)]);
        assert!(moves.iter().all(|m| Color::Red.palace_contains(*m)));

        place(&mut board, 2, 5, PieceKind::Advisor, Color::Black);
        assert_eq!(legal_moves(&board, pos(2, 5)), vec![pos(1, 4)]);
    }

    #[test]
    fn test_general_palace_steps() {
        let board = generals_only();
        assert_eq!(legal_moves(&board, pos(9, 3)), vec![pos(8, 3), pos(9, 4)]);
        assert!(!can_move(&board, pos(9, 3), pos(9, 2), Color::Red));
        assert!(!can_move(&board, pos(9, 3), pos(8, 4), Color::Red));
    }

    #[test]
    fn test_flying_general() {
        let mut board = Board::empty();
        place(&mut board, 9, 4, PieceKind::General, Color::Red);
        place(&mut board, 0, 4, PieceKind::General, Color::Black);

        assert!(can_move(&board, pos(9, 4), pos(0, 4), Color::Red));
        assert!(can_move(&board, pos(0, 4), pos(9, 4), Color::Black));
        assert!(is_in_check(&board, Color::Red));
        assert!(is_in_check(&board, Color::Black));

        place(&mut board, 4, 4, PieceKind::Soldier, Color::Red);
        assert!(!can_move(&board, pos(9, 4), pos(0, 4), Color::Red));
        assert!(!is_in_check(&board, Color::Black));

        // Long moves onto anything but the enemy general are never allowed.
        assert!(!can_move(&board, pos(9, 4), pos(5, 4), Color::Red));
    }

    #[test]
    fn test_cannon_screens() {
        let mut board = generals_only();
        place(&mut board, 7, 1, PieceKind::Cannon, Color::Red);
        place(&mut board, 0, 1, PieceKind::Horse, Color::Black);

        // Zero pieces between: may move, may not capture.
        assert!(can_move(&board, pos(7, 1), pos(3, 1), Color::Red));
        assert!(!can_move(&board, pos(7, 1), pos(0, 1), Color::Red));

        // One screen: capture allowed, moving past it is not.
        place(&mut board, 3, 1, PieceKind::Soldier, Color::Black);
        assert!(can_move(&board, pos(7, 1), pos(0, 1), Color::Red));
        assert!(!can_move(&board, pos(7, 1), pos(2, 1), Color::Red));
        assert!(!can_move(&board, pos(7, 1), pos(3, 1), Color::Red));
        assert!(can_move(&board, pos(7, 1), pos(4, 1), Color::Red));

        // Two screens: neither.
        place(&mut board, 5, 1, PieceKind::Soldier, Color::Red);
        assert!(!can_move(&board, pos(7, 1), pos(0, 1), Color::Red));
        assert!(!can_move(&board, pos(7, 1), pos(4, 1), Color::Red));
    }

    #[test]
    fn test_cannon_screen_may_be_either_color() {
        let mut board = generals_only();
        place(&mut board, 7, 1, PieceKind::Cannon, Color::Red);
        place(&mut board, 7, 4, PieceKind::Soldier, Color::Red);
        place(&mut board, 7, 7, PieceKind::Chariot, Color::Black);
        assert!(can_move(&board, pos(7, 1), pos(7, 7), Color::Red));
    }

    #[test]
    fn test_red_soldier_before_river() {
        let mut board = generals_only();
        for row in 5..=6 {
            let mut b = board.clone();
            place(&mut b, row, 4, PieceKind::Soldier, Color::Red);
            assert_eq!(legal_moves(&b, pos(row, 4)), vec![pos(row - 1, 4)]);
        }
        place(&mut board, 6, 0, PieceKind::Soldier, Color::Red);
        assert_eq!(legal_moves(&board, pos(6, 0)), vec![pos(5, 0)]);
    }

    #[test]
    fn test_red_soldier_after_river() {
        let mut board = generals_only();
        place(&mut board, 4, 4, PieceKind::Soldier, Color::Red);
        let moves = legal_moves(&board, pos(4, 4));
        assert_eq!(moves, vec![pos(3, 4), pos(4, 3), pos(4, 5)]);
        assert!(!moves.contains(&pos(5, 4)));

        let mut board = generals_only();
        place(&mut board, 2, 8, PieceKind::Soldier, Color::Red);
        assert_eq!(legal_moves(&board, pos(2, 8)), vec![pos(1, 8), pos(2, 7)]);

        // On the last row only sideways steps remain.
        let mut board = generals_only();
        place(&mut board, 0, 1, PieceKind::Soldier, Color::Red);
        assert_eq!(legal_moves(&board, pos(0, 1)), vec![pos(0, 0), pos(0, 2)]);
    }

    #[test]
    fn test_black_soldier_direction() {
        let mut board = generals_only();
        place(&mut board, 3, 2, PieceKind::Soldier, Color::Black);
        assert_eq!(legal_moves(&board, pos(3, 2)), vec![pos(4, 2)]);

        place(&mut board, 5, 6, PieceKind::Soldier, Color::Black);
        assert_eq!(
            legal_moves(&board, pos(5, 6)),
            vec![pos(5, 5), pos(5, 7), pos(6, 6)]
        );
    }

    #[test]
    fn test_check_symmetric_under_recoloring() {
        let mut board = generals_only();
        place(&mut board, 5, 3, PieceKind::Chariot, Color::Black);
        place(&mut board, 2, 6, PieceKind::Horse, Color::Red);
        place(&mut board, 4, 5, PieceKind::Cannon, Color::Red);
        place(&mut board, 2, 5, PieceKind::Soldier, Color::Black);

        let flipped = mirrored(&board);
        for color in [Color::Red, Color::Black] {
            assert_eq!(
                is_in_check(&board, color),
                is_in_check(&flipped, color.opponent()),
                "check status of {} differs from its mirror",
                color
            );
        }
        assert!(is_in_check(&board, Color::Red));
        assert!(is_in_check(&board, Color::Black));
    }

    #[test]
    fn test_check_without_general_is_false() {
        let mut board = Board::empty();
        place(&mut board, 5, 4, PieceKind::Chariot, Color::Black);
        assert!(!is_in_check(&board, Color::Red));
        assert!(!is_checkmate(&board, Color::Red));
    }

    /// Black general cornered on (0,3): its own soldier blocks (1,3) and the
    /// red general watches file 4 across the board.
    fn back_rank_mate() -> Board {
        let mut board = Board::empty();
        place(&mut board, 0, 3, PieceKind::General, Color::Black);
        place(&mut board, 1, 3, PieceKind::Soldier, Color::Black);
        place(&mut board, 9, 4, PieceKind::General, Color::Red);
        place(&mut board, 0, 8, PieceKind::Chariot, Color::Red);
        board
    }

    #[test]
    fn test_back_rank_checkmate() {
        let board = back_rank_mate();
        assert!(is_in_check(&board, Color::Black));
        assert!(is_checkmate(&board, Color::Black));
        assert!(!is_checkmate(&board, Color::Red));

        let mut without_chariot = board.clone();
        without_chariot.set(pos(0, 8), None);
        assert!(!is_in_check(&without_chariot, Color::Black));
        assert!(!is_checkmate(&without_chariot, Color::Black));
    }

    #[test]
    fn test_double_chariot_checkmate() {
        let mut board = Board::empty();
        place(&mut board, 0, 3, PieceKind::General, Color::Black);
        place(&mut board, 9, 5, PieceKind::General, Color::Red);
        place(&mut board, 0, 8, PieceKind::Chariot, Color::Red);
        place(&mut board, 1, 0, PieceKind::Chariot, Color::Red);
        assert!(is_checkmate(&board, Color::Black));

        // A black chariot that can take the checker breaks the mate.
        place(&mut board, 5, 8, PieceKind::Chariot, Color::Black);
        assert!(!is_checkmate(&board, Color::Black));
    }

    #[test]
    fn test_check_escaped_by_blocking() {
        let mut board = back_rank_mate();
        // The horse can jump onto row 0 between chariot and general.
        place(&mut board, 2, 6, PieceKind::Horse, Color::Black);
        assert!(is_in_check(&board, Color::Black));
        assert!(!is_checkmate(&board, Color::Black));
    }

    #[test]
    fn test_checkmate_does_not_mutate_board() {
        let board = back_rank_mate();
        let before = board.clone();
        let _ = is_checkmate(&board, Color::Black);
        assert_eq!(board, before);

        let opening = Board::initial_setup();
        let _ = is_checkmate(&opening, Color::Red);
        assert_eq!(opening, Board::initial_setup());
    }

    #[test]
    fn test_apply_move_returns_capture() {
        let mut board = back_rank_mate();
        let captured = apply_move_to_board(&mut board, pos(0, 8), pos(0, 3));
        assert_eq!(captured.map(|p| p.kind), Some(PieceKind::General));
        assert!(board.get(pos(0, 8)).is_none());
        assert_eq!(board.get(pos(0, 3)).map(|p| p.color), Some(Color::Red));

        let before = board.clone();
        assert_eq!(apply_move_to_board(&mut board, pos(5, 5), pos(4, 5)), None);
        assert_eq!(board, before);
    }
}
