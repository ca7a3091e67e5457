//! Alpha-beta search with quiescence.
//!
//! The search is written in minimax form: white maximises, black minimises
//! and every score is from white's point of view, the same convention as
//! [`evaluate`](crate::eval::evaluate). The board is mutated in place through
//! [`Board::probe`], so every explored line is undone before the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chess_core::{Color, Move};

use crate::eval::evaluate;
use crate::movegen::{is_king_in_check, legal_captures, legal_moves, MoveList};
use crate::ordering::order_moves;
use crate::{Board, Position, Rights};

/// Score of a side that is checkmated at the root; mates further away score
/// slightly less so the shortest mate is preferred.
pub const MATE: i32 = 100_000;

/// Bound larger than any reachable score.
pub const INFINITY: i32 = 1_000_000;

/// Limits are sampled once per this many nodes.
const CHECK_INTERVAL: u64 = 2048;

/// Tunable search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Main search depth in plies.
    pub depth: u32,
    /// Extra plies of capture-only search past the main depth.
    pub quiescence_horizon: u32,
    /// Stop after roughly this many nodes.
    pub node_budget: Option<u64>,
    /// Stop after this many milliseconds.
    pub movetime_ms: Option<u64>,
    /// Place the promoted piece while searching. Off by default: search and
    /// legality testing leave a promoting pawn as a pawn, only committed
    /// moves promote.
    pub promote_in_search: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: 3,
            quiescence_horizon: 8,
            node_budget: None,
            movetime_ms: None,
            promote_in_search: false,
        }
    }
}

/// Cooperative cancellation for a running search.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    pub stop: Option<Arc<AtomicBool>>,
    pub deadline: Option<Instant>,
    pub node_budget: Option<u64>,
}

impl SearchLimits {
    /// No limits at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Limits derived from a config, with the deadline counted from now.
    pub fn from_config(config: &SearchConfig) -> Self {
        SearchLimits {
            stop: None,
            deadline: config
                .movetime_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
            node_budget: config.node_budget,
        }
    }

    pub fn with_stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Outcome of a root search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` only when the side to move has no legal move.
    pub best_move: Option<Move>,
    /// White-positive score of `best_move`.
    pub value: i32,
    pub nodes: u64,
    /// True if a limit cut the search short; the move is then the best among
    /// the root moves searched completely.
    pub aborted: bool,
}

/// Search state for one root search.
pub struct Searcher {
    config: SearchConfig,
    limits: SearchLimits,
    nodes: u64,
    aborted: bool,
}

impl Searcher {
    pub fn new(config: SearchConfig, limits: SearchLimits) -> Self {
        Searcher {
            config,
            limits,
            nodes: 0,
            aborted: false,
        }
    }

    /// Nodes visited so far.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn check_limits(&mut self) {
        if let Some(budget) = self.limits.node_budget {
            if self.nodes >= budget {
                self.aborted = true;
            }
        }
        if self.nodes % CHECK_INTERVAL == 0 {
            if let Some(stop) = &self.limits.stop {
                if stop.load(Ordering::Relaxed) {
                    self.aborted = true;
                }
            }
            if let Some(deadline) = self.limits.deadline {
                if Instant::now() >= deadline {
                    self.aborted = true;
                }
            }
        }
    }

    /// Legal moves of `color`, best-first by MVV-LVA.
    pub fn all_moves(&self, board: &mut Board, color: Color, rights: Rights) -> MoveList {
        let mut moves = legal_moves(board, color, rights);
        order_moves(board, moves.as_mut_slice());
        moves
    }

    /// Searches every root move to `depth` plies and returns the best one
    /// for `color`. `board` is left exactly as it was.
    pub fn find_best_move(
        &mut self,
        board: &mut Board,
        color: Color,
        rights: Rights,
        depth: u32,
    ) -> SearchResult {
        let started = Instant::now();
        let depth = depth.max(1);
        let maximizing = color == Color::White;
        let moves = self.all_moves(board, color, rights);

        if moves.is_empty() {
            let value = terminal_score(board, color, 0);
            return SearchResult {
                best_move: None,
                value,
                nodes: self.nodes,
                aborted: false,
            };
        }

        let promote = self.config.promote_in_search;
        let mut best: Option<(Move, i32)> = None;
        for &m in &moves {
            let next = rights.after(board, m);
            let value = board.probe(m, promote, |b| {
                self.alpha_beta(b, color.opposite(), next, depth - 1, 1, -INFINITY, INFINITY)
            });
            if self.aborted {
                break;
            }
            tracing::trace!(mv = %m, value, "root move searched");

            let improves = match best {
                None => true,
                Some((_, best_value)) if maximizing => value > best_value,
                Some((_, best_value)) => value < best_value,
            };
            if improves {
                best = Some((m, value));
            }
        }

        // Aborted before the first root move finished: fall back to the
        // best-ordered move so callers always get something playable.
        let (best_move, value) = best.unwrap_or((moves[0], evaluate(board)));

        tracing::debug!(
            depth,
            best = %best_move,
            value,
            nodes = self.nodes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            aborted = self.aborted,
            "search finished"
        );

        SearchResult {
            best_move: Some(best_move),
            value,
            nodes: self.nodes,
            aborted: self.aborted,
        }
    }

    /// Minimax alpha-beta; `color` is to move, `ply` counts from the root.
    #[allow(clippy::too_many_arguments)]
    pub fn alpha_beta(
        &mut self,
        board: &mut Board,
        color: Color,
        rights: Rights,
        depth: u32,
        ply: u32,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;
        self.check_limits();
        if self.aborted {
            return 0;
        }

        if depth == 0 {
            return self.quiescence(board, color, rights, self.config.quiescence_horizon, alpha, beta);
        }

        let moves = self.all_moves(board, color, rights);
        if moves.is_empty() {
            return terminal_score(board, color, ply);
        }

        let promote = self.config.promote_in_search;
        let maximizing = color == Color::White;
        let mut best = if maximizing { -INFINITY } else { INFINITY };

        for &m in &moves {
            let next = rights.after(board, m);
            let score = board.probe(m, promote, |b| {
                self.alpha_beta(b, color.opposite(), next, depth - 1, ply + 1, alpha, beta)
            });
            if self.aborted {
                return 0;
            }

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        best
    }

    /// Capture-only search with stand-pat; `horizon` plies remain before the
    /// static evaluation is returned unconditionally.
    pub fn quiescence(
        &mut self,
        board: &mut Board,
        color: Color,
        rights: Rights,
        horizon: u32,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;
        self.check_limits();
        if self.aborted {
            return 0;
        }

        let stand_pat = evaluate(board);
        if horizon == 0 {
            return stand_pat;
        }

        let maximizing = color == Color::White;
        if maximizing {
            if stand_pat >= beta {
                return beta;
            }
            alpha = alpha.max(stand_pat);
        } else {
            if stand_pat <= alpha {
                return alpha;
            }
            beta = beta.min(stand_pat);
        }

        let mut captures = legal_captures(board, color, rights);
        order_moves(board, captures.as_mut_slice());
        let promote = self.config.promote_in_search;

        for &m in &captures {
            let next = rights.after(board, m);
            let score = board.probe(m, promote, |b| {
                self.quiescence(b, color.opposite(), next, horizon - 1, alpha, beta)
            });
            if self.aborted {
                return 0;
            }

            if maximizing {
                if score >= beta {
                    return beta;
                }
                alpha = alpha.max(score);
            } else {
                if score <= alpha {
                    return alpha;
                }
                beta = beta.min(score);
            }
        }

        if maximizing {
            alpha
        } else {
            beta
        }
    }
}

/// Score when `color` has no legal move: mated, or a stalemate draw.
fn terminal_score(board: &Board, color: Color, ply: u32) -> i32 {
    if is_king_in_check(board, color) {
        // Being mated is worst for the mated side.
        -color.sign() * (MATE - ply as i32)
    } else {
        0
    }
}

/// Searches `position` for its side to move with the given config.
pub fn search(position: &Position, config: SearchConfig, limits: SearchLimits) -> SearchResult {
    let mut board = position.board.clone();
    Searcher::new(config, limits).find_best_move(
        &mut board,
        position.side_to_move,
        position.rights(),
        config.depth,
    )
}

/// A search running on a background thread.
pub struct SearchHandle {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<SearchResult>,
}

impl SearchHandle {
    /// Asks the search to stop; it finishes within a few thousand nodes.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the result. Errors only if the search thread panicked.
    pub fn join(self) -> thread::Result<SearchResult> {
        self.handle.join()
    }
}

/// Starts a search of `position` on its own thread. The position is moved
/// into the worker, so the caller keeps no shared state with it.
pub fn spawn_search(position: Position, config: SearchConfig) -> SearchHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let limits = SearchLimits::from_config(&config).with_stop(Arc::clone(&stop));
    let handle = thread::spawn(move || search(&position, config, limits));
    SearchHandle { stop, handle }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn best(fen: &str, depth: u32) -> SearchResult {
        let position = Position::from_fen(fen).unwrap();
        let config = SearchConfig {
            depth,
            ..SearchConfig::default()
        };
        search(&position, config, SearchLimits::none())
    }

    #[test]
    fn default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.depth, 3);
        assert_eq!(config.quiescence_horizon, 8);
        assert!(!config.promote_in_search);
    }

    #[test]
    fn takes_hanging_queen() {
        let result = best("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", 1);
        assert_eq!(result.best_move.unwrap().to_coordinate(), "e4d5");
        assert!(result.value > 0);
        assert!(!result.aborted);
    }

    #[test]
    fn black_minimises() {
        let result = best("4k3/8/8/3p4/4Q3/8/8/4K3 b - - 0 1", 1);
        assert_eq!(result.best_move.unwrap().to_coordinate(), "d5e4");
        assert!(result.value < 0);
    }

    #[test]
    fn finds_mate_in_one() {
        // Back-rank mate.
        let result = best("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 2);
        assert_eq!(result.best_move.unwrap().to_coordinate(), "a1a8");
        assert_eq!(result.value, MATE - 1);
    }

    #[test]
    fn black_finds_mate_in_one() {
        let result = best("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1", 2);
        assert_eq!(result.best_move.unwrap().to_coordinate(), "a8a1");
        assert_eq!(result.value, -(MATE - 1));
    }

    #[test]
    fn no_moves_yields_no_best_move() {
        // Black is stalemated.
        let result = best("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 2);
        assert_eq!(result.best_move, None);
        assert_eq!(result.value, 0);

        // Black is checkmated.
        let result = best("R6k/6pp/8/8/8/8/8/6K1 b - - 0 1", 2);
        assert_eq!(result.best_move, None);
        assert_eq!(result.value, MATE);
    }

    #[test]
    fn search_restores_board() {
        let position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let mut board = position.board.clone();
        let mut searcher = Searcher::new(SearchConfig::default(), SearchLimits::none());
        searcher.find_best_move(&mut board, position.side_to_move, position.rights(), 2);
        assert_eq!(board, position.board);
        assert!(searcher.nodes() > 0);
    }

    #[test]
    fn node_budget_aborts() {
        let position = Position::startpos();
        let config = SearchConfig {
            depth: 4,
            node_budget: Some(100),
            ..SearchConfig::default()
        };
        let result = search(&position, config, SearchLimits::from_config(&config));
        assert!(result.aborted);
        assert!(result.best_move.is_some());
        assert!(result.nodes <= 101);
    }

    #[test]
    fn stop_flag_aborts() {
        let stop = Arc::new(AtomicBool::new(true));
        let limits = SearchLimits::none().with_stop(stop);
        let config = SearchConfig {
            depth: 4,
            ..SearchConfig::default()
        };
        let result = search(&Position::startpos(), config, limits);
        assert!(result.aborted);
        assert!(result.nodes <= CHECK_INTERVAL);
    }

    #[test]
    fn spawned_search_can_be_stopped() {
        let config = SearchConfig {
            depth: 6,
            ..SearchConfig::default()
        };
        let handle = spawn_search(Position::startpos(), config);
        handle.stop();
        let result = handle.join().unwrap();
        assert!(result.aborted);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn spawned_search_completes() {
        let config = SearchConfig {
            depth: 1,
            ..SearchConfig::default()
        };
        let handle = spawn_search(Position::startpos(), config);
        let result = handle.join().unwrap();
        assert!(!result.aborted);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn promotion_in_search_is_optional() {
        let fen = "7k/P7/8/8/8/8/8/K7 w - - 0 1";
        let position = Position::from_fen(fen).unwrap();

        let plain = search(
            &position,
            SearchConfig {
                depth: 1,
                ..SearchConfig::default()
            },
            SearchLimits::none(),
        );
        let promoting = search(
            &position,
            SearchConfig {
                depth: 1,
                promote_in_search: true,
                ..SearchConfig::default()
            },
            SearchLimits::none(),
        );
        assert_eq!(promoting.best_move.unwrap().to_coordinate(), "a7a8q");
        assert!(promoting.value > plain.value + 500);
    }

    const DEFENDED_PAWN: &str = "4k3/8/4p3/3p4/8/8/8/3QK3 w - - 0 1";

    fn best_with_horizon(fen: &str, depth: u32, horizon: u32) -> SearchResult {
        let position = Position::from_fen(fen).unwrap();
        let config = SearchConfig {
            depth,
            quiescence_horizon: horizon,
            ..SearchConfig::default()
        };
        search(&position, config, SearchLimits::none())
    }

    #[test]
    fn quiescence_refuses_defended_pawn() {
        let result = best_with_horizon(DEFENDED_PAWN, 1, 8);
        assert_ne!(result.best_move.unwrap().to_coordinate(), "d1d5");
        // No piece is lost, so white stays roughly a queen up.
        assert!(result.value > 500);
    }

    #[test]
    fn zero_horizon_stands_pat_after_capture() {
        let greedy = best_with_horizon(DEFENDED_PAWN, 1, 0);
        assert_eq!(greedy.best_move.unwrap().to_coordinate(), "d1d5");

        let careful = best_with_horizon(DEFENDED_PAWN, 1, 8);
        assert!(greedy.value > careful.value);
    }

    #[test]
    fn quiescence_stand_pat_cuts_at_beta() {
        let mut position = Position::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        let rights = position.rights();
        let before = position.clone();
        let mut searcher = Searcher::new(SearchConfig::default(), SearchLimits::none());

        let score =
            searcher.quiescence(&mut position.board, Color::White, rights, 8, -INFINITY, 100);
        assert_eq!(score, 100);
        assert_eq!(searcher.nodes(), 1);
        assert_eq!(position, before);
    }

    #[test]
    fn quiescence_stand_pat_cuts_at_alpha_for_black() {
        let mut position = Position::from_fen("q3k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        let rights = position.rights();
        let mut searcher = Searcher::new(SearchConfig::default(), SearchLimits::none());

        let score =
            searcher.quiescence(&mut position.board, Color::Black, rights, 8, -100, INFINITY);
        assert_eq!(score, -100);
        assert_eq!(searcher.nodes(), 1);
    }

    #[test]
    fn quiescence_horizon_returns_static_eval() {
        let mut position = Position::from_fen(DEFENDED_PAWN).unwrap();
        let rights = position.rights();
        let mut searcher = Searcher::new(SearchConfig::default(), SearchLimits::none());

        let score = searcher.quiescence(
            &mut position.board,
            Color::White,
            rights,
            0,
            -INFINITY,
            INFINITY,
        );
        assert_eq!(score, evaluate(&position.board));
        assert_eq!(searcher.nodes(), 1);
    }
}
