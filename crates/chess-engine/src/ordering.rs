//! MVV-LVA move ordering.

use crate::eval::piece_value;
use crate::Board;
use chess_core::{Move, MoveKind, Piece};

/// Most valuable victim, least valuable aggressor; 0 for non-captures.
pub fn mvv_lva(board: &Board, m: Move) -> i32 {
    let victim = match m.kind {
        MoveKind::EnPassant => Some(Piece::Pawn),
        MoveKind::Capture | MoveKind::Promotion { capture: true, .. } => {
            board.piece_at(m.to).map(|(piece, _)| piece)
        }
        _ => None,
    };
    match (victim, board.piece_at(m.from)) {
        (Some(victim), Some((aggressor, _))) => 10 * piece_value(victim) - piece_value(aggressor),
        _ => 0,
    }
}

/// Sorts `moves` best-first. Equal scores keep generation order.
pub fn order_moves(board: &Board, moves: &mut [Move]) {
    moves.sort_by_cached_key(|&m| std::cmp::Reverse(mvv_lva(board, m)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::legal_moves;
    use crate::Position;

    #[test]
    fn pawn_takes_queen_first() {
        let mut position =
            Position::from_fen("4k3/8/2q1r3/3P4/8/8/8/Q6K w - - 0 1").unwrap();
        let rights = position.rights();
        let mut moves = legal_moves(&mut position.board, position.side_to_move, rights);
        order_moves(&position.board, moves.as_mut_slice());

        assert_eq!(moves[0].to_coordinate(), "d5c6");
        assert_eq!(moves[1].to_coordinate(), "d5e6");
        let first_quiet = moves.iter().position(|m| !m.is_capture()).unwrap();
        assert!(moves.as_slice()[first_quiet..].iter().all(|m| !m.is_capture()));
    }

    #[test]
    fn scores() {
        let position = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let m = Move::new(
            chess_core::Square::from_algebraic("e4").unwrap(),
            chess_core::Square::from_algebraic("d5").unwrap(),
            MoveKind::Capture,
        );
        assert_eq!(mvv_lva(&position.board, m), 10 * 900 - 100);
        let quiet = Move::quiet(chess_core::Square::E1, chess_core::Square::D1);
        assert_eq!(mvv_lva(&position.board, quiet), 0);
    }

    #[test]
    fn ordering_keeps_every_move() {
        let mut position = Position::startpos();
        let rights = position.rights();
        let moves = legal_moves(&mut position.board, position.side_to_move, rights);
        let mut ordered = moves.clone();
        order_moves(&position.board, ordered.as_mut_slice());
        assert_eq!(ordered.as_slice(), moves.as_slice());
    }
}
