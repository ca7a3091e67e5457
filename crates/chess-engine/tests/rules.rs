//! End-to-end checks of the rules and search through the public API.

use chess_core::{Color, Fen, Move, Square};
use chess_engine::{
    legal_moves, perft, Board, Game, GameState, Position, SearchConfig, SearchLimits,
};

fn sq(s: &str) -> Square {
    Square::from_algebraic(s).unwrap()
}

fn play(game: &mut Game, moves: &[&str]) {
    for m in moves {
        game.move_coordinate(m)
            .unwrap_or_else(|e| panic!("{} rejected: {}", m, e));
    }
}

#[test]
fn initial_position_has_twenty_white_moves() {
    let game = Game::new();
    assert_eq!(game.all_moves(Color::White).len(), 20);
    assert_eq!(game.evaluate(), 0);
}

#[test]
fn en_passant_target_set_then_cleared() {
    let mut game = Game::new();
    play(&mut game, &["e2e4"]);
    assert_eq!(game.position().en_passant, Some(sq("e3")));
    assert!(game.to_fen().contains(" e3 "));

    play(&mut game, &["c7c5"]);
    assert_eq!(game.position().en_passant, Some(sq("c6")));

    play(&mut game, &["g1f3"]);
    assert_eq!(game.position().en_passant, None);
}

#[test]
fn castling_rejected_in_check() {
    let game = Game::from_fen("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1").unwrap();
    assert!(!game.valid_moves(Square::E1).iter().any(|m| m.is_castle()));
}

#[test]
fn castling_rejected_when_path_occupied() {
    let game = Game::from_fen("4k3/8/8/8/8/8/8/R2QK1NR w KQ - 0 1").unwrap();
    assert!(!game.valid_moves(Square::E1).iter().any(|m| m.is_castle()));
}

#[test]
fn castling_rejected_when_transit_or_target_attacked() {
    // d1 covered by the rook on d8: queenside illegal, kingside fine.
    let game = Game::from_fen("3rk3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    let moves = game.valid_moves(Square::E1);
    assert!(!moves.iter().any(|m| m.to == Square::C1));
    assert!(moves.iter().any(|m| m.to == Square::G1));

    // g1 covered by the bishop on c5.
    let game = Game::from_fen("4k3/8/8/2b5/8/8/8/R3K2R w KQ - 0 1").unwrap();
    let moves = game.valid_moves(Square::E1);
    assert!(!moves.iter().any(|m| m.to == Square::G1));
    assert!(moves.iter().any(|m| m.to == Square::C1));
}

#[test]
fn castling_right_lost_for_good_after_rook_returns() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    play(&mut game, &["h1h2", "e8e7", "h2h1", "e7e8"]);
    let moves = game.valid_moves(Square::E1);
    assert!(!moves.iter().any(|m| m.to == Square::G1));
    assert!(moves.iter().any(|m| m.to == Square::C1));
}

#[test]
fn fools_mate_is_checkmate() {
    let mut game = Game::new();
    play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(game.side_to_move(), Color::White);
    assert_eq!(game.game_state(), GameState::Checkmate);
    assert!(game.all_moves(Color::White).is_empty());
    assert_eq!(game.find_best_move(2).best_move, None);
}

#[test]
fn stalemate_and_checkmate_classification() {
    let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(game.game_state(), GameState::Stalemate);

    let game = Game::from_fen("6rk/5Npp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
    assert_eq!(game.game_state(), GameState::Checkmate);
}

#[test]
fn best_move_is_legal_at_shallow_depths() {
    let fens = [
        Fen::STARTPOS,
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b KQkq - 0 1",
    ];
    for fen in fens {
        let game = Game::from_fen(fen).unwrap();
        let legal = game.all_moves(game.side_to_move());
        for depth in [1, 2] {
            let result = game.find_best_move(depth);
            let best = result.best_move.expect("position has moves");
            assert!(legal.contains(&best), "{} at depth {} in {}", best, depth, fen);
        }
    }
}

#[test]
fn apply_undo_restores_every_candidate() {
    let fens = [
        Fen::STARTPOS,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 1",
        "1r5k/P7/8/8/8/8/8/4K3 w - - 0 1",
    ];
    for fen in fens {
        let position = Position::from_fen(fen).unwrap();
        let mut board: Board = position.board.clone();
        let moves = chess_engine::movegen::pseudo_legal_moves(
            &board,
            position.side_to_move,
            position.rights(),
        );
        for &m in &moves {
            let context = board.apply_move(m);
            board.undo_move(m, context);
            assert_eq!(board, position.board, "{:?} in {}", m, fen);

            let context = board.apply_move_promoting(m);
            board.undo_move(m, context);
            assert_eq!(board, position.board, "{:?} in {}", m, fen);
        }
    }
}

#[test]
fn search_leaves_game_untouched() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "e7e5", "g1f3", "b8c6"]);
    let before = game.snapshot();
    let config = SearchConfig {
        depth: 3,
        ..SearchConfig::default()
    };
    game.search(config, SearchLimits::none());
    assert_eq!(game.snapshot(), before);
}

#[test]
fn engine_self_play_stays_consistent() {
    let mut game = Game::new();
    for _ in 0..12 {
        if game.game_state().is_over() {
            break;
        }
        let result = game.find_best_move(1);
        let m: Move = result.best_move.unwrap();
        game.move_piece(m.from, m.to).unwrap();
        assert!(Position::from_fen(&game.to_fen()).is_ok());
    }
    assert_eq!(game.history().len() % 2, game.position().side_to_move as usize);
}

#[test]
fn perft_through_public_api() {
    let mut position = Position::startpos();
    assert_eq!(perft(&position, 2), 400);
    let rights = position.rights();
    let side = position.side_to_move;
    assert_eq!(legal_moves(&mut position.board, side, rights).len(), 20);
}
