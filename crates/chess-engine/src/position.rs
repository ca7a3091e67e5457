//! Chess position representation.

use chess_core::{CastleSide, CastlingRights, Color, Fen, FenError, Move, MoveKind, Piece, Square};
use std::fmt;

use crate::Board;

/// Castling rights and en passant target, the state a move depends on besides
/// the board and the mover's color.
///
/// Search threads this value through its recursion instead of mutating the
/// position, so nothing needs restoring when a line is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rights {
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
}

impl Rights {
    /// Rights after `m` is played on `board`, which must still hold the
    /// position before the move.
    pub fn after(self, board: &Board, m: Move) -> Rights {
        let mut castling = self.castling;

        if let Some((Piece::King, color)) = board.piece_at(m.from) {
            castling.revoke_color(color);
        }
        // A rook leaving its home square, or being captured on it, ends that
        // side's castling for good.
        for color in Color::ALL {
            for side in CastleSide::ALL {
                let (rook_home, _) = side.rook_squares(color);
                if m.from == rook_home || m.to == rook_home {
                    castling.revoke(color, side);
                }
            }
        }

        let en_passant = match (m.kind, board.piece_at(m.from)) {
            (MoveKind::DoublePush, Some((_, color))) => m.from.offset(0, color.pawn_direction()),
            _ => None,
        };

        Rights {
            castling,
            en_passant,
        }
    }
}

/// Complete chess position state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub board: Board,

    /// The side to move.
    pub side_to_move: Color,

    /// Castling rights.
    pub castling: CastlingRights,

    /// En passant target square (if any).
    pub en_passant: Option<Square>,

    /// Halfmove clock for 50-move rule.
    pub halfmove_clock: u32,

    /// Fullmove number (starts at 1, increments after Black's move).
    pub fullmove_number: u32,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(Fen::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = Fen::parse(fen)?;
        let mut board = Board::empty();
        for (square, piece, color) in parsed.placement {
            board.set(square, Some((piece, color)));
        }

        Ok(Position {
            board,
            side_to_move: parsed.side_to_move,
            castling: parsed.castling,
            en_passant: parsed.en_passant,
            halfmove_clock: parsed.halfmove_clock,
            fullmove_number: parsed.fullmove_number,
        })
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                if let Some((piece, color)) = self.board.piece_at_coords(file, rank) {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece.to_fen_char(color));
                } else {
                    empty_count += 1;
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(self.side_to_move.to_fen_char());
        fen.push(' ');
        fen.push_str(&self.castling.to_fen());
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));

        fen
    }

    /// Returns the piece and color at the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        self.board.piece_at(sq)
    }

    /// The castling rights and en passant target as one value.
    #[inline]
    pub fn rights(&self) -> Rights {
        Rights {
            castling: self.castling,
            en_passant: self.en_passant,
        }
    }

    /// Commits a move: updates rights and clocks, auto-promotes and passes
    /// the turn. The move must be legal for the side to move.
    pub fn play(&mut self, m: Move) {
        let rights = self.rights().after(&self.board, m);
        let pawn_move = matches!(self.board.piece_at(m.from), Some((Piece::Pawn, _)));

        self.board.apply_move_promoting(m);

        self.castling = rights.castling;
        self.en_passant = rights.en_passant;
        if pawn_move || m.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.opposite();
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

/// ASCII diagram, rank 8 at the top.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = match self.board.piece_at_coords(file, rank) {
                    Some((piece, color)) => piece.to_fen_char(color),
                    None => '.',
                };
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
