//! Mailbox board and the make/undo mutation engine.
//!
//! The same [`Board::apply_move`] / [`Board::undo_move`] pair backs the
//! legality filter, the search and the commit path. Castling rights, the
//! en passant target and the side to move live on [`Position`](crate::Position),
//! never on the board, so an ephemeral apply and undo cannot disturb them.

use chess_core::{Color, Move, MoveKind, Piece, Square};

/// A piece standing on a square.
pub type Placed = (Piece, Color);

/// Fixed 8x8 grid of optional pieces, indexed a1 = 0 .. h8 = 63.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Placed>; 64],
}

/// Everything [`Board::undo_move`] needs to restore the board exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveContext {
    /// The moving piece as it stood on the origin square; `None` if the
    /// origin was empty and nothing moved.
    pub mover: Option<Placed>,
    /// Whatever stood on the destination square.
    pub captured: Option<Placed>,
    /// Pawn removed by an en passant capture, with the square it stood on.
    pub en_passant: Option<(Square, Placed)>,
    /// Rook origin and destination of a castle.
    pub rook: Option<(Square, Square)>,
}

impl Board {
    /// An empty board.
    pub const fn empty() -> Self {
        Board {
            squares: [None; 64],
        }
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Placed> {
        self.squares[square.index() as usize]
    }

    /// Looks up a square by signed coordinates; off-board yields `None`.
    #[inline]
    pub fn piece_at_coords(&self, file: i8, rank: i8) -> Option<Placed> {
        Square::from_coords(file, rank).and_then(|sq| self.piece_at(sq))
    }

    #[inline]
    pub fn set(&mut self, square: Square, piece: Option<Placed>) {
        self.squares[square.index() as usize] = piece;
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Returns true if `square` holds a piece of `color`.
    #[inline]
    pub fn is_color(&self, square: Square, color: Color) -> bool {
        matches!(self.piece_at(square), Some((_, c)) if c == color)
    }

    /// Square of the king of `color`, if it has one.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| self.piece_at(sq) == Some((Piece::King, color)))
    }

    /// Every piece of `color` with its square, a1 first.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some((piece, c)) if c == color => Some((sq, piece)),
            _ => None,
        })
    }

    /// Every occupied square.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Placed)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Applies `m` in place and returns the undo token.
    ///
    /// Promotions are not performed: a pawn reaching the last rank stays a
    /// pawn. Use [`Board::apply_move_promoting`] to replace it.
    #[inline]
    pub fn apply_move(&mut self, m: Move) -> MoveContext {
        self.make(m, false)
    }

    /// Like [`Board::apply_move`], but a promotion move leaves the promoted
    /// piece on the destination.
    #[inline]
    pub fn apply_move_promoting(&mut self, m: Move) -> MoveContext {
        self.make(m, true)
    }

    fn make(&mut self, m: Move, promote: bool) -> MoveContext {
        let Some(mover) = self.piece_at(m.from) else {
            return MoveContext {
                mover: None,
                captured: None,
                en_passant: None,
                rook: None,
            };
        };
        let (_, color) = mover;

        let captured = self.piece_at(m.to);
        let mut en_passant = None;
        let mut rook = None;

        match m.kind {
            MoveKind::EnPassant => {
                // The captured pawn sits beside the mover: origin rank, target file.
                let victim_square = Square::new(m.to.file(), m.from.rank());
                if let Some(victim) = self.piece_at(victim_square) {
                    self.set(victim_square, None);
                    en_passant = Some((victim_square, victim));
                }
            }
            MoveKind::Castle(side) => {
                let (rook_from, rook_to) = side.rook_squares(color);
                let piece = self.piece_at(rook_from);
                self.set(rook_from, None);
                self.set(rook_to, piece);
                rook = Some((rook_from, rook_to));
            }
            _ => {}
        }

        let placed = match m.kind {
            MoveKind::Promotion { piece, .. } if promote => (piece, color),
            _ => mover,
        };
        self.set(m.from, None);
        self.set(m.to, Some(placed));

        MoveContext {
            mover: Some(mover),
            captured,
            en_passant,
            rook,
        }
    }

    /// Reverses `m` using the token returned when it was applied.
    pub fn undo_move(&mut self, m: Move, context: MoveContext) {
        let Some(mover) = context.mover else {
            return;
        };
        if let Some((rook_from, rook_to)) = context.rook {
            let piece = self.piece_at(rook_to);
            self.set(rook_to, None);
            self.set(rook_from, piece);
        }
        self.set(m.from, Some(mover));
        self.set(m.to, context.captured);
        if let Some((square, victim)) = context.en_passant {
            self.set(square, Some(victim));
        }
    }

    /// Applies `m`, runs `f` on the mutated board and always undoes.
    ///
    /// This is the only way search and legality testing touch the board, so
    /// every apply is paired with exactly one undo.
    pub fn probe<R>(&mut self, m: Move, promote: bool, f: impl FnOnce(&mut Board) -> R) -> R {
        let context = self.make(m, promote);
        let result = f(self);
        self.undo_move(m, context);
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Board {{")?;
        for rank in (0..8).rev() {
            write!(f, "  ")?;
            for file in 0..8 {
                let c = match self.piece_at_coords(file, rank) {
                    Some((piece, color)) => piece.to_fen_char(color),
                    None => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::CastleSide;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn board_with(pieces: &[(&str, Piece, Color)]) -> Board {
        let mut board = Board::empty();
        for &(s, piece, color) in pieces {
            board.set(sq(s), Some((piece, color)));
        }
        board
    }

    #[test]
    fn quiet_move_round_trip() {
        let mut board = board_with(&[("g1", Piece::Knight, Color::White)]);
        let before = board.clone();
        let m = Move::quiet(sq("g1"), sq("f3"));
        let ctx = board.apply_move(m);
        assert_eq!(board.piece_at(sq("f3")), Some((Piece::Knight, Color::White)));
        assert!(board.is_empty(sq("g1")));
        board.undo_move(m, ctx);
        assert_eq!(board, before);
    }

    #[test]
    fn capture_records_victim() {
        let mut board = board_with(&[
            ("e4", Piece::Pawn, Color::White),
            ("d5", Piece::Knight, Color::Black),
        ]);
        let before = board.clone();
        let m = Move::new(sq("e4"), sq("d5"), MoveKind::Capture);
        let ctx = board.apply_move(m);
        assert_eq!(ctx.captured, Some((Piece::Knight, Color::Black)));
        board.undo_move(m, ctx);
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_removes_and_restores_pawn() {
        let mut board = board_with(&[
            ("e5", Piece::Pawn, Color::White),
            ("d5", Piece::Pawn, Color::Black),
        ]);
        let before = board.clone();
        let m = Move::new(sq("e5"), sq("d6"), MoveKind::EnPassant);
        let ctx = board.apply_move(m);
        assert!(board.is_empty(sq("d5")));
        assert_eq!(ctx.en_passant, Some((sq("d5"), (Piece::Pawn, Color::Black))));
        assert_eq!(ctx.captured, None);
        board.undo_move(m, ctx);
        assert_eq!(board, before);
    }

    #[test]
    fn castle_moves_rook() {
        let mut board = board_with(&[
            ("e8", Piece::King, Color::Black),
            ("a8", Piece::Rook, Color::Black),
        ]);
        let before = board.clone();
        let m = Move::new(sq("e8"), sq("c8"), MoveKind::Castle(CastleSide::Queenside));
        let ctx = board.apply_move(m);
        assert_eq!(board.piece_at(sq("d8")), Some((Piece::Rook, Color::Black)));
        assert_eq!(board.piece_at(sq("c8")), Some((Piece::King, Color::Black)));
        assert!(board.is_empty(sq("a8")));
        assert_eq!(ctx.rook, Some((sq("a8"), sq("d8"))));
        board.undo_move(m, ctx);
        assert_eq!(board, before);
    }

    #[test]
    fn promotion_only_when_asked() {
        let promo = Move::new(
            sq("b7"),
            sq("a8"),
            MoveKind::Promotion {
                piece: Piece::Queen,
                capture: true,
            },
        );
        let mut board = board_with(&[
            ("b7", Piece::Pawn, Color::White),
            ("a8", Piece::Rook, Color::Black),
        ]);
        let before = board.clone();

        let ctx = board.apply_move(promo);
        assert_eq!(board.piece_at(sq("a8")), Some((Piece::Pawn, Color::White)));
        board.undo_move(promo, ctx);
        assert_eq!(board, before);

        let ctx = board.apply_move_promoting(promo);
        assert_eq!(board.piece_at(sq("a8")), Some((Piece::Queen, Color::White)));
        board.undo_move(promo, ctx);
        assert_eq!(board, before);
        assert_eq!(board.piece_at(sq("b7")), Some((Piece::Pawn, Color::White)));
    }

    #[test]
    fn probe_always_undoes() {
        let mut board = board_with(&[("a1", Piece::Rook, Color::White)]);
        let before = board.clone();
        let seen = board.probe(Move::quiet(sq("a1"), sq("a7")), false, |b| {
            b.piece_at(sq("a7"))
        });
        assert_eq!(seen, Some((Piece::Rook, Color::White)));
        assert_eq!(board, before);
    }

    #[test]
    fn empty_origin_is_a_no_op() {
        let mut board = board_with(&[("h8", Piece::King, Color::Black)]);
        let before = board.clone();
        let m = Move::quiet(sq("a1"), sq("a2"));
        let ctx = board.apply_move(m);
        assert_eq!(ctx.mover, None);
        assert_eq!(board, before);
        board.undo_move(m, ctx);
        assert_eq!(board, before);
    }

    #[test]
    fn king_lookup() {
        let board = board_with(&[
            ("g1", Piece::King, Color::White),
            ("a1", Piece::Rook, Color::White),
        ]);
        assert_eq!(board.king_square(Color::White), Some(sq("g1")));
        assert_eq!(board.king_square(Color::Black), None);
        assert_eq!(board.pieces(Color::White).count(), 2);
        assert_eq!(board.pieces(Color::Black).count(), 0);
        assert_eq!(board.piece_at_coords(8, 0), None);
    }

    #[test]
    fn color_lookup() {
        let board = board_with(&[("d4", Piece::Knight, Color::Black)]);
        assert!(board.is_color(sq("d4"), Color::Black));
        assert!(!board.is_color(sq("d4"), Color::White));
        assert!(!board.is_color(sq("d5"), Color::Black));
    }
}
