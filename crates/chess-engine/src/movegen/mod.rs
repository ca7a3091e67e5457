//! Move generation.
//!
//! Candidates are generated per square from the mailbox board and filtered
//! for king safety by applying each one, testing for check and undoing. The
//! color to move and the [`Rights`] in force are explicit arguments, so the
//! search can generate moves deep in a line without touching the position.

mod attacks;
pub mod perft;

use crate::{Board, Rights};
use chess_core::{CastleSide, Color, File, Move, MoveKind, Piece, Square};

pub use attacks::{is_king_in_check, is_square_attacked};
use attacks::{DIAGONAL_RAYS, KING_OFFSETS, KNIGHT_OFFSETS, STRAIGHT_RAYS};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves held.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Mutable view, used for in-place ordering.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    pub fn contains(&self, m: &Move) -> bool {
        self.as_slice().contains(m)
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Pushes the pseudo-legal moves of the piece on `from`.
///
/// Nothing is pushed if `from` does not hold a piece of `color`. King safety
/// is not checked, except that castling never starts from, passes through or
/// lands on an attacked square.
pub fn candidates(board: &Board, from: Square, color: Color, rights: Rights, moves: &mut MoveList) {
    let piece = match board.piece_at(from) {
        Some((piece, c)) if c == color => piece,
        _ => return,
    };

    match piece {
        Piece::Pawn => pawn_candidates(board, from, color, rights, moves),
        Piece::Knight => leaper_candidates(board, from, color, &KNIGHT_OFFSETS, moves),
        Piece::Bishop => slider_candidates(board, from, color, &DIAGONAL_RAYS, moves),
        Piece::Rook => slider_candidates(board, from, color, &STRAIGHT_RAYS, moves),
        Piece::Queen => {
            slider_candidates(board, from, color, &STRAIGHT_RAYS, moves);
            slider_candidates(board, from, color, &DIAGONAL_RAYS, moves);
        }
        Piece::King => {
            leaper_candidates(board, from, color, &KING_OFFSETS, moves);
            castling_candidates(board, from, color, rights, moves);
        }
    }
}

fn pawn_candidates(board: &Board, from: Square, color: Color, rights: Rights, moves: &mut MoveList) {
    let dir = color.pawn_direction();
    let promotes = |to: Square| to.rank() == color.promotion_rank();

    if let Some(one) = from.offset(0, dir).filter(|&sq| board.is_empty(sq)) {
        let kind = if promotes(one) {
            MoveKind::Promotion {
                piece: Piece::Queen,
                capture: false,
            }
        } else {
            MoveKind::Quiet
        };
        moves.push(Move::new(from, one, kind));

        if from.rank() == color.pawn_rank() {
            if let Some(two) = from.offset(0, 2 * dir).filter(|&sq| board.is_empty(sq)) {
                moves.push(Move::new(from, two, MoveKind::DoublePush));
            }
        }
    }

    for df in [-1, 1] {
        let Some(to) = from.offset(df, dir) else {
            continue;
        };
        if board.is_color(to, color.opposite()) {
            let kind = if promotes(to) {
                MoveKind::Promotion {
                    piece: Piece::Queen,
                    capture: true,
                }
            } else {
                MoveKind::Capture
            };
            moves.push(Move::new(from, to, kind));
        } else if board.is_empty(to) && rights.en_passant == Some(to) {
            // Only a pawn that just double-pushed past `to` can be taken.
            let victim = Square::new(to.file(), from.rank());
            if board.piece_at(victim) == Some((Piece::Pawn, color.opposite())) {
                moves.push(Move::new(from, to, MoveKind::EnPassant));
            }
        }
    }
}

fn leaper_candidates(
    board: &Board,
    from: Square,
    color: Color,
    offsets: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for &(df, dr) in offsets {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        if board.is_empty(to) {
            moves.push(Move::quiet(from, to));
        } else if board.is_color(to, color.opposite()) {
            moves.push(Move::new(from, to, MoveKind::Capture));
        }
    }
}

fn slider_candidates(
    board: &Board,
    from: Square,
    color: Color,
    rays: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for &(df, dr) in rays {
        let mut current = from;
        while let Some(to) = current.offset(df, dr) {
            match board.piece_at(to) {
                None => moves.push(Move::quiet(from, to)),
                Some((_, c)) => {
                    if c != color {
                        moves.push(Move::new(from, to, MoveKind::Capture));
                    }
                    break;
                }
            }
            current = to;
        }
    }
}

fn castling_candidates(
    board: &Board,
    from: Square,
    color: Color,
    rights: Rights,
    moves: &mut MoveList,
) {
    let home = Square::new(File::E, color.back_rank());
    if from != home {
        return;
    }

    let them = color.opposite();
    let mut in_check = None;

    for side in CastleSide::ALL {
        if !rights.castling.has(color, side) {
            continue;
        }
        let (rook_home, _) = side.rook_squares(color);
        if board.piece_at(rook_home) != Some((Piece::Rook, color)) {
            continue;
        }

        let (low, high) = if rook_home < home {
            (rook_home.index(), home.index())
        } else {
            (home.index(), rook_home.index())
        };
        let path_clear = (low + 1..high)
            .filter_map(Square::from_index)
            .all(|sq| board.is_empty(sq));
        if !path_clear {
            continue;
        }

        if *in_check.get_or_insert_with(|| is_square_attacked(board, home, them)) {
            return;
        }

        let target = side.king_target(color);
        let step = if target > home { 1 } else { -1 };
        let transit_safe = (1..=2)
            .filter_map(|n| home.offset(step * n, 0))
            .all(|sq| !is_square_attacked(board, sq, them));
        if transit_safe {
            moves.push(Move::new(home, target, MoveKind::Castle(side)));
        }
    }
}

/// All pseudo-legal moves of `color`.
pub fn pseudo_legal_moves(board: &Board, color: Color, rights: Rights) -> MoveList {
    let mut moves = MoveList::new();
    for (from, _) in board.pieces(color) {
        candidates(board, from, color, rights, &mut moves);
    }
    moves
}

/// Returns true if playing `m` does not leave the king of `color` in check.
#[inline]
pub fn is_legal(board: &mut Board, m: Move, color: Color) -> bool {
    board.probe(m, false, |b| !is_king_in_check(b, color))
}

/// All legal moves of `color`.
pub fn legal_moves(board: &mut Board, color: Color, rights: Rights) -> MoveList {
    let mut moves = pseudo_legal_moves(board, color, rights);
    moves.retain(|&m| is_legal(board, m, color));
    moves
}

/// Legal moves of the piece on `from`; empty if it is not a piece of `color`.
pub fn legal_moves_from(board: &mut Board, from: Square, color: Color, rights: Rights) -> MoveList {
    let mut moves = MoveList::new();
    candidates(board, from, color, rights, &mut moves);
    moves.retain(|&m| is_legal(board, m, color));
    moves
}

/// Legal captures of `color`, including en passant and capturing promotions.
pub fn legal_captures(board: &mut Board, color: Color, rights: Rights) -> MoveList {
    let mut moves = pseudo_legal_moves(board, color, rights);
    moves.retain(|&m| m.is_capture() && is_legal(board, m, color));
    moves
}
