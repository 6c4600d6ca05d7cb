use thiserror::Error;

use crate::chess::{piece::Colour, types::Rank};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("Invalid move length {0}")]
    InvalidLength(usize),
    #[error("Invalid from-square file {0}")]
    InvalidFromSquareFile(char),
    #[error("Invalid from-square rank {0}")]
    InvalidFromSquareRank(char),
    #[error("Invalid to-square file {0}")]
    InvalidToSquareFile(char),
    #[error("Invalid to-square rank {0}")]
    InvalidToSquareRank(char),
    #[error("Invalid promotion piece {0}")]
    InvalidPromotionPiece(char),
    #[error("Illegal move {0}")]
    IllegalMove(String),
}

/// Errors that can arise when reading a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenParseError {
    #[error("FEN string is missing the board")]
    MissingBoard,
    #[error("expected 8 board segments separated by '/', found {0}")]
    BoardSegments(usize),
    #[error("unexpected character '{0}' in board")]
    UnexpectedCharacter(char),
    #[error("two digits in a row in a board segment")]
    AdjacentDigits,
    #[error("a board segment does not describe exactly 8 squares")]
    BadSquaresInSegment,
    #[error("{colour} has no king")]
    MissingKing { colour: Colour },
    #[error("{colour} has more than one king")]
    DuplicateKings { colour: Colour },
    #[error("FEN string is missing the side to move")]
    MissingSide,
    #[error("invalid side to move \"{0}\", expected \"w\" or \"b\"")]
    InvalidSide(String),
    #[error("FEN string is missing castling rights")]
    MissingCastling,
    #[error("invalid castling rights \"{0}\"")]
    InvalidCastling(String),
    #[error("{colour} castling rights \"{castling}\" given, but the king is not on its back rank")]
    KingNotOnBackRank { colour: Colour, castling: String },
    #[error("no {colour} rook for castling token '{token}'")]
    NoCastlingRook { colour: Colour, token: char },
    #[error("FEN string is missing the en passant square")]
    MissingEnPassant,
    #[error("invalid en passant square \"{0}\"")]
    InvalidEnPassant(String),
    #[error("en passant square {square} is on rank {got:?}, expected rank {expected:?}")]
    InvalidEnPassantRank {
        square: String,
        expected: Rank,
        got: Rank,
    },
    #[error("FEN string is missing the halfmove clock")]
    MissingHalfmoveClock,
    #[error("invalid halfmove clock \"{0}\"")]
    InvalidHalfmoveClock(String),
    #[error("FEN string is missing the fullmove number")]
    MissingFullmoveNumber,
    #[error("invalid fullmove number \"{0}\"")]
    InvalidFullmoveNumber(String),
    #[error("fullmove number must be at least 1")]
    FullmoveNumberZero,
    #[error("unexpected tokens after the fullmove number")]
    ExtraTokens,
}

/// Errors from reading a perft suite file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerftSuiteError {
    #[error("line {line}: no depth entries")]
    NoDepths { line: usize },
    #[error("line {line}: malformed depth entry \"{entry}\"")]
    BadDepthEntry { line: usize, entry: String },
    #[error("line {line}: {source}")]
    Fen {
        line: usize,
        #[source]
        source: FenParseError,
    },
}

/// Description of the first inconsistency found in a position.
pub type PositionValidityError = String;
