//! Game management: the commit path, history and state classification.
//!
//! [`Game`] is the only place where moves become permanent. Queries such as
//! [`Game::valid_moves`] or [`Game::find_best_move`] work on a scratch copy of
//! the board, so they never change what [`Game::to_fen`] reports.

use crate::eval;
use crate::movegen::{is_king_in_check, is_square_attacked, legal_moves, legal_moves_from};
use crate::search::{SearchConfig, SearchLimits, SearchResult, Searcher};
use crate::Position;
use chess_core::{Color, FenError, Move, Piece, Square};
use std::fmt;
use thiserror::Error;

/// Error type for game operations. A failed operation leaves the game
/// unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("no piece on {0}")]
    NoPieceAt(Square),

    #[error("piece on {square} is {owner}, but {to_move} is to move")]
    WrongSide {
        square: Square,
        owner: Color,
        to_move: Color,
    },

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error(transparent)]
    InvalidFen(#[from] FenError),

    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

/// Classification of the position for the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Playing,
    Check,
    Checkmate,
    Stalemate,
}

impl GameState {
    /// True for checkmate and stalemate.
    pub fn is_over(self) -> bool {
        matches!(self, GameState::Checkmate | GameState::Stalemate)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameState::Playing => "playing",
            GameState::Check => "check",
            GameState::Checkmate => "checkmate",
            GameState::Stalemate => "stalemate",
        };
        f.write_str(s)
    }
}

/// Deep copy of a game, for hints, takebacks and what-if analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    position: Position,
    history: Vec<Move>,
    undo: Vec<Position>,
}

impl GameSnapshot {
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }
}

/// A chess game with move history.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    /// Committed moves, oldest first.
    history: Vec<Move>,
    /// Position before each committed move.
    undo: Vec<Position>,
    config: SearchConfig,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    fn from_position(position: Position) -> Self {
        Game {
            position,
            history: Vec::new(),
            undo: Vec::new(),
            config: SearchConfig::default(),
        }
    }

    /// Creates a game from a FEN string.
    ///
    /// Besides FEN syntax and the one-king-per-side rule, rejects positions
    /// where the side that just moved is still in check.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let position = Position::from_fen(fen)?;
        let waiting = position.side_to_move.opposite();
        if is_king_in_check(&position.board, waiting) {
            return Err(GameError::InvalidPosition(format!(
                "{} is in check but not to move",
                waiting
            )));
        }
        Ok(Self::from_position(position))
    }

    /// Resets to the standard starting position and clears the history.
    pub fn reset(&mut self) {
        self.position = Position::startpos();
        self.history.clear();
        self.undo.clear();
        tracing::info!("game reset");
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns a reference to the current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    /// Committed moves, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Piece on `square`, if any.
    pub fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        self.position.piece_at(square)
    }

    /// Legal moves of the piece on `square`. Empty when the square is empty
    /// or holds a piece of the side not to move.
    pub fn valid_moves(&self, square: Square) -> Vec<Move> {
        let mut board = self.position.board.clone();
        legal_moves_from(
            &mut board,
            square,
            self.position.side_to_move,
            self.position.rights(),
        )
        .as_slice()
        .to_vec()
    }

    /// Legal moves of `color`, best-first. Empty unless `color` is to move.
    pub fn all_moves(&self, color: Color) -> Vec<Move> {
        if color != self.position.side_to_move {
            return Vec::new();
        }
        let mut board = self.position.board.clone();
        Searcher::new(self.config, SearchLimits::none())
            .all_moves(&mut board, color, self.position.rights())
            .as_slice()
            .to_vec()
    }

    /// Commits the move from `from` to `to` for the side to move.
    ///
    /// Castling is requested by moving the king two files. A pawn reaching
    /// the last rank always becomes a queen.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Result<Move, GameError> {
        let to_move = self.position.side_to_move;
        match self.position.piece_at(from) {
            None => {
                tracing::debug!(%from, %to, "rejected move from empty square");
                return Err(GameError::NoPieceAt(from));
            }
            Some((_, owner)) if owner != to_move => {
                tracing::debug!(%from, %to, %owner, "rejected move out of turn");
                return Err(GameError::WrongSide {
                    square: from,
                    owner,
                    to_move,
                });
            }
            Some(_) => {}
        }

        let Some(m) = self
            .valid_moves(from)
            .into_iter()
            .find(|m| m.to == to)
        else {
            tracing::debug!(%from, %to, "rejected illegal move");
            return Err(GameError::IllegalMove(format!("{}{}", from, to)));
        };

        self.undo.push(self.position.clone());
        self.position.play(m);
        self.history.push(m);
        Ok(m)
    }

    /// Commits a move given in coordinate notation ("e2e4", "e7e8q").
    pub fn move_coordinate(&mut self, text: &str) -> Result<Move, GameError> {
        let (from, to) = Move::parse_coordinate(text)
            .ok_or_else(|| GameError::IllegalMove(text.to_string()))?;
        self.move_piece(from, to)
    }

    /// Takes back the last committed move.
    pub fn undo_last(&mut self) -> Option<Move> {
        let previous = self.undo.pop()?;
        self.position = previous;
        self.history.pop()
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Static evaluation in centipawns; positive favours white.
    pub fn evaluate(&self) -> i32 {
        eval::evaluate(&self.position.board)
    }

    /// Best move for the side to move at `depth` plies, using the game's
    /// other search settings.
    pub fn find_best_move(&self, depth: u32) -> SearchResult {
        let config = SearchConfig {
            depth,
            ..self.config
        };
        self.search(config, SearchLimits::from_config(&config))
    }

    /// Runs a search with explicit settings and limits.
    pub fn search(&self, config: SearchConfig, limits: SearchLimits) -> SearchResult {
        let mut board = self.position.board.clone();
        Searcher::new(config, limits).find_best_move(
            &mut board,
            self.position.side_to_move,
            self.position.rights(),
            config.depth,
        )
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        is_king_in_check(&self.position.board, self.position.side_to_move)
    }

    /// Classifies the position for the side to move.
    pub fn game_state(&self) -> GameState {
        let mut board = self.position.board.clone();
        let no_moves = legal_moves(
            &mut board,
            self.position.side_to_move,
            self.position.rights(),
        )
        .is_empty();
        match (no_moves, self.is_check()) {
            (true, true) => GameState::Checkmate,
            (true, false) => GameState::Stalemate,
            (false, true) => GameState::Check,
            (false, false) => GameState::Playing,
        }
    }

    /// Squares holding pieces of `color` that the opponent attacks.
    pub fn threats(&self, color: Color) -> Vec<Square> {
        let board = &self.position.board;
        board
            .pieces(color)
            .filter(|&(square, _)| is_square_attacked(board, square, color.opposite()))
            .map(|(square, _)| square)
            .collect()
    }

    /// Deep copy of the whole game.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            position: self.position.clone(),
            history: self.history.clone(),
            undo: self.undo.clone(),
        }
    }

    /// Replaces the game with a snapshot taken earlier.
    pub fn restore_snapshot(&mut self, snapshot: GameSnapshot) {
        self.position = snapshot.position;
        self.history = snapshot.history;
        self.undo = snapshot.undo;
        tracing::info!(plies = self.history.len(), "snapshot restored");
    }
}
