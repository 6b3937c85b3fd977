//! Terminal interface for the xiangqi engine.
//!
//! This module provides a command-line frontend for a local two-player
//! game. It only reads the session's public state and forwards commands:
//!
//! - Colored board display with traditional piece glyphs
//! - Cell input (`e6`, or `6 4` as row and column) standing in for clicks
//! - Selection, legal targets and the last move highlighted on the board
//! - Undo, reset, move history and a JSON dump of the session

use colored::{ColoredString, Colorize};
use std::io::{self, Write};

use crate::game::Game;
use crate::movegen;
use crate::notation::piece_glyph;
use crate::types::*;

/// Renders the board with row numbers on the left and file letters on top.
///
/// The selected piece has a yellow background, legal destinations are
/// marked green, and the last move's endpoints are underlined.
pub fn print_board(game: &Game) {
    println!();
    println!("  a  b  c  d  e  f  g  h  i");

    for row in 0..ROWS {
        if row == 5 {
            println!("   {}", "~~~~~~~~~~~~~~~~~~~~~~~~~~".cyan());
        }
        print!("{} ", row);
        for col in 0..COLS {
            print!("{} ", render_cell(game, Position::new(row, col)));
        }
        println!();
    }
    println!();
}

fn render_cell(game: &Game, pos: Position) -> ColoredString {
    let is_target = game.possible_moves.contains(&pos);
    let is_last = game
        .last_move
        .is_some_and(|m| m.from == pos || m.to == pos);

    let cell = match game.board.get(pos) {
        Some(piece) => {
            let glyph = piece_glyph(piece).to_string();
            let glyph = match piece.color {
                Color::Red => glyph.red().bold(),
                Color::Black => glyph.blue().bold(),
            };
            if game.selected == Some(pos) {
                glyph.on_yellow()
            } else if is_target {
                glyph.on_green()
            } else {
                glyph
            }
        }
        None if is_target => "* ".green().bold(),
        None => "· ".dimmed(),
    };

    if is_last { cell.underline() } else { cell }
}

/// Prints the status line (side to move, check, result).
pub fn print_status(game: &Game) {
    let turn_str = side_label(game.turn);

    print!(
        "{}",
        t!("terminal.move_status", num = game.move_log.len() + 1, color = turn_str)
    );

    if game.phase == GamePhase::Check {
        let sides: Vec<String> = game
            .checked_generals
            .iter()
            .map(|&c| side_label(c).to_string())
            .collect();
        print!(
            "  {}",
            t!("terminal.check", sides = sides.join(", ")).to_string().red().bold()
        );
    }

    println!(
        "  {}",
        t!("terminal.legal_moves_count", count = game.legal_moves().len())
    );

    if let Some(result) = game.result {
        println!();
        println!("{}", "═══════════════════════════════════".yellow());
        println!(
            "  {} — {}",
            t!("terminal.game_over_label").to_string().yellow().bold(),
            t!("terminal.by_checkmate")
        );
        println!(
            "{}",
            t!("terminal.result_label", result = result.to_string().green().bold())
        );
        println!("{}", "═══════════════════════════════════".yellow());
    }

    println!();
}

fn side_label(color: Color) -> ColoredString {
    match color {
        Color::Red => t!("terminal.red").to_string().red().bold(),
        Color::Black => t!("terminal.black").to_string().blue().bold(),
    }
}

/// Prints available commands in the terminal.
pub fn print_help() {
    println!("{}", t!("terminal.cmd_header").to_string().yellow().bold());
    println!("  {}        - {}", "e6".green(), t!("terminal.cmd_square"));
    println!("  {}       - {}", "6 4".green(), t!("terminal.cmd_row_col"));
    println!("  {}     - {}", "moves".green(), t!("terminal.cmd_moves"));
    println!("  {}      - {}", "undo".green(), t!("terminal.cmd_undo"));
    println!("  {}     - {}", "reset".green(), t!("terminal.cmd_reset"));
    println!("  {}     - {}", "board".green(), t!("terminal.cmd_board"));
    println!("  {}   - {}", "history".green(), t!("terminal.cmd_history"));
    println!("  {}      - {}", "json".green(), t!("terminal.cmd_json"));
    println!("  {}      - {}", "help".green(), t!("terminal.cmd_help"));
    println!("  {}      - {}", "quit".green(), t!("terminal.cmd_quit"));
    println!();
}

/// Prints the move log.
pub fn print_history(game: &Game) {
    if game.move_log.is_empty() {
        println!("{}", t!("terminal.no_moves_yet"));
        return;
    }

    println!("{}", t!("terminal.move_history_label").to_string().yellow().bold());
    for record in &game.move_log {
        println!(
            "  {:>3}. {} {}  ({}-{})",
            record.move_number,
            side_label(record.side),
            record.notation,
            record.from,
            record.to
        );
    }
    println!();
}

/// Prints every move of the side to move, eight per line.
pub fn print_moves(game: &Game) {
    let moves = game.legal_moves();
    println!(
        "{} {}",
        t!("terminal.legal_moves_header").to_string().yellow().bold(),
        t!("terminal.moves_count", count = moves.len())
    );
    for (i, (from, to)) in moves.iter().enumerate() {
        if i > 0 && i % 8 == 0 {
            println!();
        }
        print!("  {}", format!("{}-{}", from, to).green());
    }
    println!();
    println!();
}

/// Prints a position with its check status for both sides.
///
/// With `square`, the piece on it is selected (whatever its color) and its
/// destinations are listed; otherwise the move counts per side are shown.
pub fn print_inspection(board: Board, side: Color, square: Option<Position>) {
    let mut game = Game::from_position(board, side);
    if let Some(pos) = square
        && game.board.get(pos).is_some()
    {
        game.possible_moves = movegen::legal_moves(&game.board, pos);
        game.selected = Some(pos);
    }

    print_board(&game);
    println!("FEN: {}", game.board.to_fen());

    for color in [Color::Red, Color::Black] {
        let status = if movegen::is_checkmate(&game.board, color) {
            t!("terminal.status_checkmate").to_string().red().bold()
        } else if movegen::is_in_check(&game.board, color) {
            t!("terminal.status_check").to_string().red()
        } else {
            t!("terminal.status_safe").to_string().green()
        };
        println!(
            "  {}: {}  {}",
            side_label(color),
            status,
            t!(
                "terminal.moves_count",
                count = movegen::all_legal_moves(&game.board, color).len()
            )
        );
    }

    match square {
        Some(pos) if game.possible_moves.is_empty() => {
            println!("{}", t!("terminal.no_moves_from", square = pos));
        }
        Some(pos) => {
            let targets: Vec<String> = game.possible_moves.iter().map(|p| p.to_string()).collect();
            println!(
                "{} {}",
                t!("terminal.moves_from", square = pos).to_string().yellow().bold(),
                targets.join(" ").green()
            );
        }
        None => {}
    }
    println!();
}

/// Runs the interactive terminal game until the players quit.
///
/// Unlike a finished game in a tournament, a mated position stays on
/// screen so the players can take moves back or start over.
pub fn run_terminal_game(mut game: Game) {
    println!();
    println!("{}", "╔═══════════════════════════════════════╗".cyan());
    println!("{}", format!("  {}", t!("terminal.banner_title")).cyan());
    println!("{}", format!("  {}", t!("terminal.banner_subtitle")).cyan());
    println!("{}", "╚═══════════════════════════════════════╝".cyan());
    println!();

    print_help();
    print_board(&game);
    print_status(&game);

    loop {
        let prompt = match game.selected {
            Some(pos) => format!("{} [{}]", side_label(game.turn), pos),
            None => side_label(game.turn).to_string(),
        };
        print!("{} > ", prompt);
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("{}", t!("terminal.input_error"));
                continue;
            }
        }
        let input = input.trim().to_lowercase();

        if input.is_empty() {
            continue;
        }

        match input.as_str() {
            "quit" | "exit" | "q" => break,
            "help" | "h" | "?" => print_help(),
            "board" | "b" => {
                print_board(&game);
                print_status(&game);
            }
            "moves" | "m" => print_moves(&game),
            "undo" | "u" => {
                if game.history.is_empty() {
                    println!("{}", t!("terminal.nothing_to_undo"));
                } else {
                    game.undo();
                    print_board(&game);
                    print_status(&game);
                }
            }
            "reset" => {
                game.reset();
                print_board(&game);
                print_status(&game);
            }
            "history" => print_history(&game),
            "json" | "j" => match serde_json::to_string_pretty(&game.to_state_json()) {
                Ok(json) => println!("{}\n", json),
                Err(e) => println!("{}: {}", t!("terminal.error_label").to_string().red().bold(), e),
            },
            _ => {
                if let Some((row, col)) = parse_square_input(&input) {
                    let moves_before = game.move_log.len();
                    game.select_square(row, col);
                    print_board(&game);
                    if game.move_log.len() != moves_before {
                        print_status(&game);
                    }
                } else {
                    println!(
                        "{}",
                        t!("terminal.unknown_cmd_hint", cmd = &input, help = "help".green())
                    );
                }
            }
        }
    }

    println!("{}", t!("terminal.goodbye"));
}

/// Parses a cell typed by the player into `(row, col)`.
///
/// Accepts formats:
/// - `e6` — file letter and row digit
/// - `6 4` or `6,4` — row and column as numbers (not range-checked; the
///   session ignores clicks off the board)
fn parse_square_input(input: &str) -> Option<(i32, i32)> {
    if let Some(pos) = Position::from_notation(input) {
        return Some((pos.row as i32, pos.col as i32));
    }

    let mut parts = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((row, col))
}
