//! # xiangqi — Chinese chess rule engine
//!
//! A rule engine and turn-based session for xiangqi (Chinese chess), with
//! a terminal frontend for two players sharing one keyboard.
//!
//! ## Features
//!
//! - **Complete rule set**: movement of all seven piece kinds, including
//!   horse leg blocking, the elephant eye and river, the palace, cannon
//!   screens and the flying general.
//!
//! - **Check and checkmate**: attack detection by probing every enemy
//!   piece, checkmate by simulating every reply on a copy of the board.
//!
//! - **Session state machine**: click-driven selection, move commit,
//!   undo history and reset, with traditional move notation.
//!
//! - **Terminal interface**: colored board, highlighted selection and
//!   targets, JSON dump of the session state.
//!
//! ## Usage
//!
//! ```bash
//! # Play a local terminal game
//! xiangqi play
//!
//! # Start from a custom position, Black to move, Chinese messages
//! xiangqi play --fen "3k5/9/9/9/9/9/9/9/9/4K4" --side black --lang zh-CN
//!
//! # Show the opening and the moves of the cannon on b7
//! xiangqi inspect --fen "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR" --square b7
//! ```
//!
//! Set `RUST_LOG=info` to log moves, or `RUST_LOG=debug` to also trace selections.

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

pub mod game;
pub mod i18n;
pub mod movegen;
pub mod notation;
pub mod terminal;
pub mod types;

use clap::{Parser, Subcommand};
use std::io;
use std::str::FromStr;

use crate::game::Game;
use crate::types::{Board, Color, Position, START_FEN};

/// xiangqi — Chinese chess in the terminal.
///
/// Plays local two-player games and inspects positions given in FEN.
#[derive(Parser, Debug)]
#[command(name = "xiangqi")]
#[command(about = "Chinese chess (xiangqi) rule engine and terminal game")]
#[command(version)]
struct Cli {
    /// Language for messages (en, zh-CN). Defaults to XIANGQI_LANG or the system locale.
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a game in the terminal (two players).
    Play {
        /// Starting position as FEN piece placement.
        #[arg(long, default_value = START_FEN)]
        fen: String,

        /// Side to move first: red or black.
        #[arg(long, default_value = "red")]
        side: String,
    },

    /// Print a position, its check status and legal moves.
    Inspect {
        /// Position as FEN piece placement.
        #[arg(long, default_value = START_FEN)]
        fen: String,

        /// Side to move: red or black.
        #[arg(long, default_value = "red")]
        side: String,

        /// Cell whose moves to list (e.g. "b7").
        #[arg(long)]
        square: Option<String>,
    },
}

fn main() -> io::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    i18n::init_locale(cli.lang.as_deref());

    match cli.command {
        Commands::Play { fen, side } => {
            let (board, side) = parse_position(&fen, &side)?;
            terminal::run_terminal_game(Game::from_position(board, side));
            Ok(())
        }
        Commands::Inspect { fen, side, square } => {
            let (board, side) = parse_position(&fen, &side)?;
            let square = square
                .map(|s| {
                    Position::from_notation(&s)
                        .ok_or_else(|| invalid_input(format!("Invalid square: {}", s)))
                })
                .transpose()?;
            terminal::print_inspection(board, side, square);
            Ok(())
        }
    }
}

/// Parses the `--fen` and `--side` arguments.
fn parse_position(fen: &str, side: &str) -> io::Result<(Board, Color)> {
    let board = Board::from_fen(fen).map_err(invalid_input)?;
    let side = Color::from_str(side).map_err(invalid_input)?;
    for color in [Color::Red, Color::Black] {
        if board.find_general(color).is_none() {
            log::warn!("Position has no {} general; check detection will treat it as safe", color);
        }
    }
    Ok((board, side))
}

fn invalid_input(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}
