//! FEN (Forsyth-Edwards Notation) parsing.

use crate::{CastleSide, CastlingRights, Color, Piece, Rank, Square};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 4 or 6 fields, got {0}")]
    InvalidFieldCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    #[error("expected exactly one {color} king, found {count}")]
    KingCount { color: Color, count: usize },
}

/// A decoded FEN record.
///
/// The engine turns this into its own board representation; this type only
/// guarantees the text was well formed and names a position with one king
/// per side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Every occupied square.
    pub placement: Vec<(Square, Piece, Color)>,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    /// Half-moves since the last capture or pawn move.
    pub halfmove_clock: u32,
    /// Starts at 1, incremented after each black move.
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string. The two move counters may be omitted, in which
    /// case they default to `0 1`.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 && fields.len() != 4 {
            return Err(FenError::InvalidFieldCount(fields.len()));
        }

        let placement = Self::parse_placement(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = Self::parse_castling(fields[2])?;
        let en_passant = Self::parse_en_passant(fields[3])?;

        let (halfmove_clock, fullmove_number) = if fields.len() == 6 {
            let halfmove = fields[4]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(fields[4].to_string()))?;
            let fullmove = fields[5]
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| FenError::InvalidFullmoveNumber(fields[5].to_string()))?;
            (halfmove, fullmove)
        } else {
            (0, 1)
        };

        Ok(Fen {
            placement,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(field: &str) -> Result<Vec<(Square, Piece, Color)>, FenError> {
        let rows: Vec<&str> = field.split('/').collect();
        if rows.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                rows.len()
            )));
        }

        let mut placement = Vec::with_capacity(32);
        for (row, text) in rows.iter().enumerate() {
            // FEN lists rank 8 first.
            let rank = 7 - row as i8;
            let mut file = 0i8;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as i8;
                } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                    let square = Square::from_coords(file, rank).ok_or_else(|| {
                        FenError::InvalidPiecePlacement(format!("rank {} overflows", rank + 1))
                    })?;
                    placement.push((square, piece, color));
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        rank + 1
                    )));
                }
                if file > 8 {
                    break;
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    rank + 1,
                    file
                )));
            }
        }

        for color in Color::ALL {
            let count = placement
                .iter()
                .filter(|(_, piece, c)| *piece == Piece::King && *c == color)
                .count();
            if count != 1 {
                return Err(FenError::KingCount { color, count });
            }
        }

        Ok(placement)
    }

    fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
        if field == "-" {
            return Ok(CastlingRights::NONE);
        }

        let mut rights = CastlingRights::NONE;
        for c in field.chars() {
            let (color, side) = match c {
                'K' => (Color::White, CastleSide::Kingside),
                'Q' => (Color::White, CastleSide::Queenside),
                'k' => (Color::Black, CastleSide::Kingside),
                'q' => (Color::Black, CastleSide::Queenside),
                _ => {
                    return Err(FenError::InvalidCastlingRights(format!(
                        "invalid character '{}' in '{}'",
                        c, field
                    )))
                }
            };
            rights = rights.with(color, side);
        }
        Ok(rights)
    }

    fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
        if field == "-" {
            return Ok(None);
        }
        match Square::from_algebraic(field) {
            Some(square) if matches!(square.rank(), Rank::R3 | Rank::R6) => Ok(Some(square)),
            _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
        }
    }
}
