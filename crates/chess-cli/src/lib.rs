//! Command line front end for the chess engine.
//!
//! - [`config`] - `engine.toml` loading
//! - [`report`] - text and JSON output for search and perft results

pub mod config;
pub mod report;

use chess_engine::{Game, GameError, SearchConfig};

/// Builds a game from an optional FEN (start position when `None`) and a
/// sequence of coordinate moves played on top of it.
pub fn setup_game(
    fen: Option<&str>,
    moves: &[String],
    config: SearchConfig,
) -> Result<Game, GameError> {
    let mut game = match fen {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::new(),
    }
    .with_config(config);
    for text in moves {
        game.move_coordinate(text)?;
    }
    Ok(game)
}
