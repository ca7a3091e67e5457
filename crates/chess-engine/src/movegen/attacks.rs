//! Attack detection on the mailbox board.

use crate::Board;
use chess_core::{Color, Piece, Square};

/// Knight jumps as (file, rank) deltas.
pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// King steps as (file, rank) deltas.
pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub(crate) const STRAIGHT_RAYS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub(crate) const DIAGONAL_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Returns true if any piece of `by` attacks `square`.
///
/// The square's own occupant is irrelevant; only the attackers and the
/// pieces blocking their rays matter.
pub fn is_square_attacked(board: &Board, square: Square, by: Color) -> bool {
    let hits = |df: i8, dr: i8, piece: Piece| {
        square
            .offset(df, dr)
            .and_then(|sq| board.piece_at(sq))
            .is_some_and(|p| p == (piece, by))
    };

    // A pawn attacks one rank ahead of itself, so look one rank behind.
    let back = -by.pawn_direction();
    if hits(-1, back, Piece::Pawn) || hits(1, back, Piece::Pawn) {
        return true;
    }

    if KNIGHT_OFFSETS
        .iter()
        .any(|&(df, dr)| hits(df, dr, Piece::Knight))
    {
        return true;
    }

    if KING_OFFSETS.iter().any(|&(df, dr)| hits(df, dr, Piece::King)) {
        return true;
    }

    ray_hits(board, square, by, &STRAIGHT_RAYS, Piece::slides_straight)
        || ray_hits(board, square, by, &DIAGONAL_RAYS, Piece::slides_diagonally)
}

/// Walks each ray from `square` and reports whether the first piece met is a
/// slider of `by` moving along that kind of ray.
fn ray_hits(
    board: &Board,
    square: Square,
    by: Color,
    rays: &[(i8, i8)],
    slides: fn(Piece) -> bool,
) -> bool {
    rays.iter().any(|&(df, dr)| {
        let mut current = square;
        while let Some(next) = current.offset(df, dr) {
            if let Some((piece, color)) = board.piece_at(next) {
                return color == by && slides(piece);
            }
            current = next;
        }
        false
    })
}

/// Returns true if the king of `color` is attacked.
///
/// A side without a king counts as in check, so a search line that somehow
/// lost the king is never scored as safe.
pub fn is_king_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => is_square_attacked(board, king, color.opposite()),
        None => true,
    }
}
