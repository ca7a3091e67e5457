//! Move representation.
//!
//! A [`Move`] is produced once by the move generator and carries a
//! [`MoveKind`] tag, so board mutation, undo, ordering and the commit path
//! all interpret special moves the same way.

use crate::{Color, Piece, Square};
use std::fmt;

/// Which side of the board a castle goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    /// O-O, king towards the h-file.
    Kingside,
    /// O-O-O, king towards the a-file.
    Queenside,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::Kingside, CastleSide::Queenside];

    /// King destination for this side.
    pub const fn king_target(self, color: Color) -> Square {
        match (color, self) {
            (Color::White, CastleSide::Kingside) => Square::G1,
            (Color::White, CastleSide::Queenside) => Square::C1,
            (Color::Black, CastleSide::Kingside) => Square::G8,
            (Color::Black, CastleSide::Queenside) => Square::C8,
        }
    }

    /// Rook origin and destination for this side.
    pub const fn rook_squares(self, color: Color) -> (Square, Square) {
        match (color, self) {
            (Color::White, CastleSide::Kingside) => (Square::H1, Square::F1),
            (Color::White, CastleSide::Queenside) => (Square::A1, Square::D1),
            (Color::Black, CastleSide::Kingside) => (Square::H8, Square::F8),
            (Color::Black, CastleSide::Queenside) => (Square::A8, Square::D8),
        }
    }
}

/// Tag describing what a move does beyond relocating one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Move onto an empty square.
    Quiet,
    /// Pawn advancing two squares from its start rank.
    DoublePush,
    /// Capture of the piece standing on the destination.
    Capture,
    /// Pawn capture of a double-pushed pawn through the skipped square.
    EnPassant,
    /// King moving two files; the rook jumps over it.
    Castle(CastleSide),
    /// Pawn reaching the last rank.
    Promotion { piece: Piece, capture: bool },
}

/// A chess move.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
}

impl Move {
    /// Creates a new move.
    #[inline]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Move { from, to, kind }
    }

    /// Creates a quiet move (no special flags).
    #[inline]
    pub const fn quiet(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveKind::Quiet)
    }

    /// Returns true if the move removes an enemy piece.
    #[inline]
    pub const fn is_capture(self) -> bool {
        matches!(
            self.kind,
            MoveKind::Capture | MoveKind::EnPassant | MoveKind::Promotion { capture: true, .. }
        )
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(self.kind, MoveKind::Castle(_))
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    /// Returns the promotion piece if this is a promotion move.
    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        match self.kind {
            MoveKind::Promotion { piece, .. } => Some(piece),
            _ => None,
        }
    }

    /// Coordinate notation, e.g. "e2e4" or "e7e8q".
    pub fn to_coordinate(self) -> String {
        match self.promotion() {
            Some(piece) => format!("{}{}{}", self.from, self.to, piece.letter()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parses the squares out of coordinate notation.
    ///
    /// The kind of the move depends on the position, so only the origin and
    /// destination are returned; a trailing promotion letter is accepted and
    /// must name a piece a pawn can promote to.
    pub fn parse_coordinate(s: &str) -> Option<(Square, Square)> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        if let Some(c) = s[4..].chars().next() {
            match Piece::from_fen_char(c) {
                Some((Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen, _)) => {}
                _ => return None,
            }
        }
        Some((from, to))
    }

    /// Placeholder used to fill fixed-capacity move buffers.
    pub const NULL: Move = Move::quiet(Square::A1, Square::A1);
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}, {:?})", self.to_coordinate(), self.kind)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_coordinate())
    }
}
