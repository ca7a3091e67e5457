//! Core types for chess.
//!
//! This crate provides the vocabulary shared by the engine and its front ends:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`], [`MoveKind`] and [`CastleSide`] for tagged moves
//! - [`CastlingRights`] for castling availability
//! - [`Fen`] parsing

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castling::CastlingRights;
pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{CastleSide, Move, MoveKind};
pub use piece::Piece;
pub use square::{File, Rank, Square};
