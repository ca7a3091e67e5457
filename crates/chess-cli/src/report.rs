//! Printable results for the `best` and `perft` commands.
//!
//! Each report renders either as plain text for a terminal or as pretty
//! JSON for scripts.

use chess_engine::SearchResult;
use serde::Serialize;
use std::fmt;

/// Result of a `best` search.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BestMoveReport {
    pub fen: String,
    pub depth: u32,
    /// Coordinate notation, `None` when the side to move has no legal move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_move: Option<String>,
    /// White-positive score in centipawns.
    pub value: i32,
    pub nodes: u64,
    pub aborted: bool,
    pub elapsed_ms: u64,
}

impl BestMoveReport {
    pub fn new(fen: String, depth: u32, result: &SearchResult, elapsed_ms: u64) -> Self {
        BestMoveReport {
            fen,
            depth,
            best_move: result.best_move.map(|m| m.to_coordinate()),
            value: result.value,
            nodes: result.nodes,
            aborted: result.aborted,
            elapsed_ms,
        }
    }
}

impl fmt::Display for BestMoveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.best_move {
            Some(m) => writeln!(f, "bestmove {}", m)?,
            None => writeln!(f, "bestmove (none)")?,
        }
        write!(
            f,
            "depth {} value {} nodes {} time {}ms",
            self.depth, self.value, self.nodes, self.elapsed_ms
        )?;
        if self.aborted {
            write!(f, " (aborted)")?;
        }
        Ok(())
    }
}

/// Node count below one root move.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DivideEntry {
    #[serde(rename = "move")]
    pub mv: String,
    pub nodes: u64,
}

/// Result of a `perft` run.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PerftReport {
    pub fen: String,
    pub depth: u32,
    pub nodes: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub divide: Vec<DivideEntry>,
    pub elapsed_ms: u64,
}

impl PerftReport {
    pub fn new(fen: String, depth: u32, divide: Vec<(String, u64)>, elapsed_ms: u64) -> Self {
        let divide: Vec<DivideEntry> = divide
            .into_iter()
            .map(|(mv, nodes)| DivideEntry { mv, nodes })
            .collect();
        PerftReport {
            fen,
            depth,
            nodes: divide.iter().map(|entry| entry.nodes).sum(),
            divide,
            elapsed_ms,
        }
    }

    /// A report without the per-move breakdown.
    pub fn total(fen: String, depth: u32, nodes: u64, elapsed_ms: u64) -> Self {
        PerftReport {
            fen,
            depth,
            nodes,
            divide: Vec::new(),
            elapsed_ms,
        }
    }
}

impl fmt::Display for PerftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.divide {
            writeln!(f, "{}: {}", entry.mv, entry.nodes)?;
        }
        if !self.divide.is_empty() {
            writeln!(f)?;
        }
        write!(
            f,
            "perft({}) = {} in {}ms",
            self.depth, self.nodes, self.elapsed_ms
        )
    }
}

/// Renders `report` as text, or as pretty JSON when `json` is set.
pub fn render<R: Serialize + fmt::Display>(report: &R, json: bool) -> serde_json::Result<String> {
    if json {
        serde_json::to_string_pretty(report)
    } else {
        Ok(report.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Move, Square};

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_best_move_text() {
        let result = SearchResult {
            best_move: Some(Move::quiet(
                Square::from_algebraic("g1").unwrap(),
                Square::from_algebraic("f3").unwrap(),
            )),
            value: 50,
            nodes: 1234,
            aborted: false,
        };
        let report = BestMoveReport::new(START.to_string(), 3, &result, 12);
        let text = render(&report, false).unwrap();
        assert!(text.starts_with("bestmove g1f3\n"));
        assert!(text.contains("nodes 1234"));
        assert!(!text.contains("aborted"));
    }

    #[test]
    fn test_best_move_json_without_move() {
        let result = SearchResult {
            best_move: None,
            value: -100_000,
            nodes: 1,
            aborted: false,
        };
        let report = BestMoveReport::new(START.to_string(), 2, &result, 0);
        let value: serde_json::Value = serde_json::from_str(&render(&report, true).unwrap()).unwrap();
        assert_eq!(value["depth"], 2);
        assert_eq!(value["value"], -100_000);
        assert!(value.get("best_move").is_none());
    }

    #[test]
    fn test_perft_sums_divide() {
        let report = PerftReport::new(
            START.to_string(),
            1,
            vec![("a2a3".to_string(), 1), ("e2e4".to_string(), 1)],
            3,
        );
        assert_eq!(report.nodes, 2);

        let value: serde_json::Value = serde_json::from_str(&render(&report, true).unwrap()).unwrap();
        assert_eq!(value["nodes"], 2);
        assert_eq!(value["divide"][1]["move"], "e2e4");

        let text = render(&report, false).unwrap();
        assert!(text.starts_with("a2a3: 1\ne2e4: 1\n\n"));
        assert!(text.ends_with("perft(1) = 2 in 3ms"));
    }

    #[test]
    fn test_perft_total_omits_divide() {
        let report = PerftReport::total(START.to_string(), 3, 8902, 40);
        let value: serde_json::Value = serde_json::from_str(&render(&report, true).unwrap()).unwrap();
        assert_eq!(value["nodes"], 8902);
        assert!(value.get("divide").is_none());
    }
}
