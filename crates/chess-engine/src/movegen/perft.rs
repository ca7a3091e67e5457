//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.

use super::legal_moves;
use crate::{Board, Position, Rights};
use chess_core::Color;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(position: &Position, depth: u32) -> u64 {
    let mut board = position.board.clone();
    count(&mut board, position.side_to_move, position.rights(), depth)
}

fn count(board: &mut Board, color: Color, rights: Rights, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(board, color, rights);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &m in &moves {
        let next = rights.after(board, m);
        nodes += board.probe(m, true, |b| count(b, color.opposite(), next, depth - 1));
    }
    nodes
}

/// Perft with divide - node count below each root move, sorted by move text.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let mut board = position.board.clone();
    let color = position.side_to_move;
    let rights = position.rights();
    let moves = legal_moves(&mut board, color, rights);
    let mut results = Vec::with_capacity(moves.len());

    for &m in &moves {
        let next = rights.after(&board, m);
        let nodes = if depth > 1 {
            board.probe(m, true, |b| count(b, color.opposite(), next, depth - 1))
        } else {
            1
        };
        results.push((m.to_coordinate(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
