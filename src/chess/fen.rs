use std::{num::NonZeroUsize, str::SplitWhitespace};

use arrayvec::ArrayVec;

use crate::{
    chess::{
        piece::{Colour, Piece, PieceType},
        piecelayout::PieceLayout,
        types::{CastlingRights, CastlingSide, File, Rank, Square},
    },
    errors::FenParseError,
};

/// A parsed FEN representation.
///
/// Castling rights are resolved against the board while parsing, so each
/// right carries the square of the rook it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    pub board: PieceLayout,
    pub turn: Colour,
    pub castling: CastlingRights,
    /// Rook squares, indexed by [`CastlingRights::index`].
    pub castling_rooks: [Option<Square>; 4],
    pub ep: Option<Square>,
    pub halfmove: u32,
    pub fullmove: NonZeroUsize,
}

impl Fen {
    const DEFAULT_FULL_MOVE: NonZeroUsize = NonZeroUsize::MIN;

    /// Parse a FEN string in strict mode.
    /// All 6 fields must be present, and no extra tokens are allowed.
    pub fn parse(fen: &str) -> Result<Self, FenParseError> {
        let mut tokens = fen.split_whitespace();
        let result = Self::parse_inner(&mut tokens, true)?;
        if tokens.next().is_some() {
            return Err(FenParseError::ExtraTokens);
        }
        Ok(result)
    }

    /// Parse a FEN string in relaxed mode.
    /// Missing fields after the board are defaulted to: w, -, -, 0, 1
    /// Extra tokens after the fullmove counter are permitted but ignored.
    /// A field that is present must still be well-formed.
    pub fn parse_relaxed(fen: &str) -> Result<Self, FenParseError> {
        let mut tokens = fen.split_whitespace();
        Self::parse_inner(&mut tokens, false)
    }

    /// The rook square for a single castling right, if it is held.
    pub fn castling_rook(&self, right: CastlingRights) -> Option<Square> {
        if self.castling.contains(right) {
            self.castling_rooks[right.index()]
        } else {
            None
        }
    }

    fn parse_inner(tokens: &mut SplitWhitespace<'_>, strict: bool) -> Result<Self, FenParseError> {
        // Field #1: Piece placement
        let board_str = tokens.next().ok_or(FenParseError::MissingBoard)?;
        let board = Self::parse_board(board_str)?;

        // Field #2: Active colour
        let turn = match tokens.next() {
            Some(s) => Self::parse_turn(s)?,
            None if strict => return Err(FenParseError::MissingSide),
            None => Colour::White,
        };

        // Field #3: Castling availability
        let (castling, castling_rooks) = match tokens.next() {
            Some(s) => Self::parse_castling(s, &board)?,
            None if strict => return Err(FenParseError::MissingCastling),
            None => (CastlingRights::NONE, [None; 4]),
        };

        // Field #4: En passant target square
        let ep = match tokens.next() {
            Some(s) => Self::parse_ep(s, turn)?,
            None if strict => return Err(FenParseError::MissingEnPassant),
            None => None,
        };

        // Field #5: Halfmove clock
        let halfmove = match tokens.next() {
            Some(s) => Self::parse_halfmove(s)?,
            None if strict => return Err(FenParseError::MissingHalfmoveClock),
            None => 0,
        };

        // Field #6: Fullmove number
        let fullmove = match tokens.next() {
            Some(s) => Self::parse_fullmove(s)?,
            None if strict => return Err(FenParseError::MissingFullmoveNumber),
            None => Self::DEFAULT_FULL_MOVE,
        };

        Ok(Self {
            board,
            turn,
            castling,
            castling_rooks,
            ep,
            halfmove,
            fullmove,
        })
    }

    fn parse_board(board_str: &str) -> Result<PieceLayout, FenParseError> {
        let mut layout = PieceLayout::default();

        let mut ranks = ArrayVec::<&str, 8>::new();

        let mut board_parts = board_str.split('/');

        while let Some(rank) = board_parts.next() {
            if ranks.try_push(rank).is_err() {
                // 8 successfully parse, plus one now, plus the rest.
                return Err(FenParseError::BoardSegments(8 + 1 + board_parts.count()));
            }
        }

        if ranks.len() != 8 {
            return Err(FenParseError::BoardSegments(ranks.len()));
        }

        for (rank, rank_str) in Rank::all().rev().zip(&ranks) {
            let mut squares_in_rank = 0u8;
            let mut prev_was_digit = false;

            for c in rank_str.chars() {
                if let Some(count) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    if prev_was_digit {
                        return Err(FenParseError::AdjacentDigits);
                    }
                    prev_was_digit = true;
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        squares_in_rank += count as u8;
                    }
                    if squares_in_rank > 8 {
                        return Err(FenParseError::BadSquaresInSegment);
                    }
                } else if let Some(piece) = Piece::from_char(c) {
                    prev_was_digit = false;
                    let file = File::from_index(squares_in_rank)
                        .ok_or(FenParseError::BadSquaresInSegment)?;
                    layout.set_piece_at(Square::from_rank_file(rank, file), piece);
                    squares_in_rank += 1;
                } else {
                    return Err(FenParseError::UnexpectedCharacter(c));
                }
            }

            if squares_in_rank != 8 {
                return Err(FenParseError::BadSquaresInSegment);
            }
        }

        for colour in Colour::all() {
            match layout.of(colour, PieceType::King).count() {
                0 => return Err(FenParseError::MissingKing { colour }),
                2.. => return Err(FenParseError::DuplicateKings { colour }),
                1 => (),
            }
        }

        Ok(layout)
    }

    fn parse_turn(s: &str) -> Result<Colour, FenParseError> {
        match s {
            "w" => Ok(Colour::White),
            "b" => Ok(Colour::Black),
            _ => Err(FenParseError::InvalidSide(s.to_string())),
        }
    }

    /// Reads castling rights in any of the standard, X-FEN, or Shredder-FEN
    /// styles. `K` and `Q` pick the outermost rook on that wing.
    fn parse_castling(
        s: &str,
        board: &PieceLayout,
    ) -> Result<(CastlingRights, [Option<Square>; 4]), FenParseError> {
        let mut rights = CastlingRights::NONE;
        let mut rooks = [None; 4];

        if s == "-" {
            return Ok((rights, rooks));
        }

        for token in s.chars() {
            let colour = if token.is_ascii_uppercase() {
                Colour::White
            } else {
                Colour::Black
            };
            let back_rank = Rank::One.relative_to(colour);
            let our_rooks = board.of(colour, PieceType::Rook) & back_rank.as_set();

            let Some(king_sq) = board.king_sq(colour) else {
                return Err(FenParseError::MissingKing { colour });
            };
            if king_sq.rank() != back_rank {
                return Err(FenParseError::KingNotOnBackRank {
                    colour,
                    castling: s.to_string(),
                });
            }
            let king_file = king_sq.file();

            let rook_sq = match token.to_ascii_uppercase() {
                'K' => File::all()
                    .rev()
                    .take_while(|&f| f > king_file)
                    .map(|f| Square::from_rank_file(back_rank, f))
                    .find(|&sq| our_rooks.contains_square(sq)),
                'Q' => File::all()
                    .take_while(|&f| f < king_file)
                    .map(|f| Square::from_rank_file(back_rank, f))
                    .find(|&sq| our_rooks.contains_square(sq)),
                upper @ 'A'..='H' => {
                    let file = File::from_index(upper as u8 - b'A')
                        .ok_or_else(|| FenParseError::InvalidCastling(s.to_string()))?;
                    if file == king_file {
                        return Err(FenParseError::InvalidCastling(s.to_string()));
                    }
                    Some(Square::from_rank_file(back_rank, file))
                        .filter(|&sq| our_rooks.contains_square(sq))
                }
                _ => return Err(FenParseError::InvalidCastling(s.to_string())),
            };

            let rook_sq = rook_sq.ok_or(FenParseError::NoCastlingRook { colour, token })?;
            let side = if rook_sq.file() > king_file {
                CastlingSide::King
            } else {
                CastlingSide::Queen
            };
            let right = CastlingRights::single(colour, side);
            rights |= right;
            rooks[right.index()] = Some(rook_sq);
        }

        Ok((rights, rooks))
    }

    fn parse_ep(s: &str, turn: Colour) -> Result<Option<Square>, FenParseError> {
        if s == "-" {
            return Ok(None);
        }

        let square: Square = s
            .parse()
            .map_err(|_| FenParseError::InvalidEnPassant(s.to_string()))?;

        // If white to move, ep square must be on rank 6 (black pawn just moved)
        // If black to move, ep square must be on rank 3 (white pawn just moved)
        let expected = Rank::Six.relative_to(turn);

        if square.rank() != expected {
            return Err(FenParseError::InvalidEnPassantRank {
                square: s.to_string(),
                expected,
                got: square.rank(),
            });
        }

        Ok(Some(square))
    }

    fn parse_halfmove(s: &str) -> Result<u32, FenParseError> {
        s.parse()
            .map_err(|_| FenParseError::InvalidHalfmoveClock(s.to_string()))
    }

    fn parse_fullmove(s: &str) -> Result<NonZeroUsize, FenParseError> {
        let value: usize = s
            .parse()
            .map_err(|_| FenParseError::InvalidFullmoveNumber(s.to_string()))?;

        NonZeroUsize::new(value).ok_or(FenParseError::FullmoveNumberZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn parse_startpos() {
        let fen = Fen::parse(STARTPOS).unwrap();
        assert_eq!(fen.turn, Colour::White);
        assert_eq!(fen.halfmove, 0);
        assert_eq!(fen.fullmove.get(), 1);
        assert!(fen.ep.is_none());
        assert_eq!(fen.castling, CastlingRights::ALL);
        assert_eq!(fen.castling_rook(CastlingRights::WHITE_KING), Some(Square::H1));
        assert_eq!(fen.castling_rook(CastlingRights::WHITE_QUEEN), Some(Square::A1));
        assert_eq!(fen.castling_rook(CastlingRights::BLACK_KING), Some(Square::H8));
        assert_eq!(fen.castling_rook(CastlingRights::BLACK_QUEEN), Some(Square::A8));
        assert_eq!(fen.board.occupied().count(), 32);
        assert_eq!(fen.board.king_sq(Colour::Black), Some(Square::E8));
    }

    #[test]
    fn parse_relaxed_board_only() {
        let fen = Fen::parse_relaxed("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").unwrap();
        assert_eq!(fen.turn, Colour::White);
        assert_eq!(fen.castling, CastlingRights::NONE);
        assert_eq!(fen.halfmove, 0);
        assert_eq!(fen.fullmove.get(), 1);
    }

    #[test]
    fn strict_requires_every_field() {
        let result = Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -");
        assert_eq!(result, Err(FenParseError::MissingHalfmoveClock));
        let result = Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        assert_eq!(result, Err(FenParseError::MissingSide));
        assert_eq!(Fen::parse(""), Err(FenParseError::MissingBoard));
    }

    #[test]
    fn parse_bad_segments() {
        let err = Fen::parse_relaxed("rnbqkbnr/pppppppp/8/8/8/8").unwrap_err();
        assert_eq!(err, FenParseError::BoardSegments(6));
        let err =
            Fen::parse_relaxed("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR/PPPPPPPP/RNBQKBNR")
                .unwrap_err();
        assert_eq!(err, FenParseError::BoardSegments(10));
        let err =
            Fen::parse_relaxed("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR/PPPPPPPP/RNBQKBNR/8")
                .unwrap_err();
        assert_eq!(err, FenParseError::BoardSegments(11));
    }

    #[test]
    fn reject_bad_squares() {
        let result = Fen::parse("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(result, Err(FenParseError::BadSquaresInSegment));
        let result = Fen::parse("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(result, Err(FenParseError::BadSquaresInSegment));
        let result = Fen::parse("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(result, Err(FenParseError::UnexpectedCharacter('9')));
        let result = Fen::parse("rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(result, Err(FenParseError::UnexpectedCharacter('x')));
    }

    #[test]
    fn reject_adjacent_digits() {
        let result = Fen::parse("rnbqkbnr/pppppppp/44/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(matches!(result, Err(FenParseError::AdjacentDigits)));
    }

    #[test]
    fn king_counts() {
        let result = Fen::parse("rnbq1bnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1");
        assert_eq!(
            result,
            Err(FenParseError::MissingKing {
                colour: Colour::Black
            })
        );
        let result = Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKKBNR w - - 0 1");
        assert_eq!(
            result,
            Err(FenParseError::DuplicateKings {
                colour: Colour::White
            })
        );
    }

    #[test]
    fn reject_uppercase_side() {
        let result = Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR W KQkq - 0 1");
        assert!(matches!(result, Err(FenParseError::InvalidSide(_))));
    }

    #[test]
    fn relaxed_still_rejects_malformed_fields() {
        let result = Fen::parse_relaxed("4k3/8/8/8/8/8/8/4K3 b xyz");
        assert!(matches!(result, Err(FenParseError::InvalidCastling(_))));
        let result = Fen::parse_relaxed("4k3/8/8/8/8/8/8/4K3 w - - x");
        assert!(matches!(result, Err(FenParseError::InvalidHalfmoveClock(_))));
    }

    #[test]
    fn reject_invalid_ep_rank() {
        // e4 is not a valid ep square (should be e3 or e6)
        let result = Fen::parse("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e4 0 1");
        assert!(matches!(
            result,
            Err(FenParseError::InvalidEnPassantRank { .. })
        ));
        let result = Fen::parse("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq z3 0 1");
        assert!(matches!(result, Err(FenParseError::InvalidEnPassant(_))));
    }

    #[test]
    fn accept_valid_ep_square() {
        let fen =
            Fen::parse("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(fen.ep, Some(Square::from_rank_file(Rank::Three, File::E)));
    }

    #[test]
    fn large_halfmove_clock() {
        let fen = Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 150 80").unwrap();
        assert_eq!(fen.halfmove, 150);
        assert_eq!(fen.fullmove.get(), 80);
    }

    #[test]
    fn reject_fullmove_zero() {
        let result = Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0");
        assert!(matches!(result, Err(FenParseError::FullmoveNumberZero)));
    }

    #[test]
    fn reject_extra_tokens_strict() {
        let result = Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra");
        assert!(matches!(result, Err(FenParseError::ExtraTokens)));
    }

    #[test]
    fn allow_extra_tokens_relaxed() {
        let fen = Fen::parse_relaxed(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra tokens",
        )
        .unwrap();
        assert_eq!(fen.fullmove.get(), 1);
    }

    #[test]
    fn parse_chess960_shredder_fen() {
        let fen = Fen::parse("bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9")
            .unwrap();
        assert_eq!(fen.castling, CastlingRights::ALL);
        assert_eq!(fen.castling_rook(CastlingRights::WHITE_KING), Some(Square::H1));
        assert_eq!(fen.castling_rook(CastlingRights::WHITE_QUEEN), Some(Square::F1));
        assert_eq!(fen.castling_rook(CastlingRights::BLACK_KING), Some(Square::H8));
        assert_eq!(fen.castling_rook(CastlingRights::BLACK_QUEEN), Some(Square::F8));
    }

    #[test]
    fn outermost_rook_for_standard_tokens() {
        // two white rooks on the queen-side: Q means the one on a1.
        let fen = Fen::parse("4k3/8/8/8/8/8/8/R1R1K3 w Q - 0 1").unwrap();
        assert_eq!(fen.castling_rook(CastlingRights::WHITE_QUEEN), Some(Square::A1));
        // with only the inner rook, Q finds it instead.
        let fen = Fen::parse("4k3/8/8/8/8/8/8/2R1K3 w Q - 0 1").unwrap();
        assert_eq!(fen.castling_rook(CastlingRights::WHITE_QUEEN), Some(Square::C1));
    }

    #[test]
    fn castling_needs_rook_and_back_rank_king() {
        let result = Fen::parse("4k3/8/8/8/8/8/8/4K3 w K - 0 1");
        assert_eq!(
            result,
            Err(FenParseError::NoCastlingRook {
                colour: Colour::White,
                token: 'K'
            })
        );
        let result = Fen::parse("4k3/8/8/8/8/8/8/R3K3 w B - 0 1");
        assert!(matches!(result, Err(FenParseError::NoCastlingRook { .. })));
        let result = Fen::parse("r7/4k3/8/8/8/8/8/4K3 w q - 0 1");
        assert!(matches!(
            result,
            Err(FenParseError::KingNotOnBackRank {
                colour: Colour::Black,
                ..
            })
        ));
    }
}
