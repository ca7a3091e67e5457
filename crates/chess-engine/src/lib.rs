//! Textbook chess engine on an 8x8 mailbox board.
//!
//! This crate provides:
//! - [`Board`] - the piece grid with reversible make/undo ([`MoveContext`])
//! - [`Position`] - board plus side to move, castling rights, en passant and clocks
//! - [`Game`] - the commit path, history, snapshots and [`GameState`]
//! - Move generation with a make/test/undo legality filter, and perft
//! - Material plus piece-square evaluation and MVV-LVA ordering
//! - Alpha-beta search with quiescence and cooperative cancellation
//!
//! # Example
//!
//! ```
//! use chess_engine::{Game, GameState};
//! use chess_core::Color;
//!
//! let mut game = Game::new();
//! assert_eq!(game.all_moves(Color::White).len(), 20);
//!
//! game.move_coordinate("e2e4").unwrap();
//! game.move_coordinate("e7e5").unwrap();
//! assert_eq!(game.game_state(), GameState::Playing);
//!
//! let result = game.find_best_move(2);
//! assert!(game.all_moves(game.side_to_move()).contains(&result.best_move.unwrap()));
//! ```

mod board;
pub mod eval;
mod game;
pub mod movegen;
pub mod ordering;
mod position;
pub mod search;

pub use board::{Board, MoveContext, Placed};
pub use game::{Game, GameError, GameSnapshot, GameState};
pub use movegen::{
    is_king_in_check, is_square_attacked, legal_moves, perft::perft, perft::perft_divide, MoveList,
};
pub use position::{Position, Rights};
pub use search::{spawn_search, SearchConfig, SearchHandle, SearchLimits, SearchResult, Searcher};
