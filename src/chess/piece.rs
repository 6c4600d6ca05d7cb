use std::{
    fmt::{self, Display},
    mem::size_of,
    ops::{Index, IndexMut, Not},
};

use crate::chess::{squareset::SquareSet, types::Rank};

/// Compile-time colour, used to monomorphise pawn move generation.
pub trait Col {
    const COLOUR: Colour;

    /// Offset of a single pawn push.
    const UP: i8;
    /// Offset of a pawn capture towards the a-file.
    const UP_LEFT: i8;
    /// Offset of a pawn capture towards the h-file.
    const UP_RIGHT: i8;

    /// The rank pawns double-push from.
    const PAWN_START_RANK: Rank;
    /// The rank pawns promote from.
    const PROMO_FROM_RANK: Rank;

    fn up(bb: SquareSet) -> SquareSet;
    fn up_left(bb: SquareSet) -> SquareSet;
    fn up_right(bb: SquareSet) -> SquareSet;
}

pub struct White;
pub struct Black;

impl Col for White {
    const COLOUR: Colour = Colour::White;

    const UP: i8 = 8;
    const UP_LEFT: i8 = 7;
    const UP_RIGHT: i8 = 9;

    const PAWN_START_RANK: Rank = Rank::Two;
    const PROMO_FROM_RANK: Rank = Rank::Seven;

    fn up(bb: SquareSet) -> SquareSet {
        bb.north_one()
    }
    fn up_left(bb: SquareSet) -> SquareSet {
        bb.north_west_one()
    }
    fn up_right(bb: SquareSet) -> SquareSet {
        bb.north_east_one()
    }
}

impl Col for Black {
    const COLOUR: Colour = Colour::Black;

    const UP: i8 = -8;
    const UP_LEFT: i8 = -9;
    const UP_RIGHT: i8 = -7;

    const PAWN_START_RANK: Rank = Rank::Seven;
    const PROMO_FROM_RANK: Rank = Rank::Two;

    fn up(bb: SquareSet) -> SquareSet {
        bb.south_one()
    }
    fn up_left(bb: SquareSet) -> SquareSet {
        bb.south_west_one()
    }
    fn up_right(bb: SquareSet) -> SquareSet {
        bb.south_east_one()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Colour {
    White,
    Black,
}

const _COLOUR_ASSERT: () = assert!(size_of::<Colour>() == size_of::<Option<Colour>>());

impl Colour {
    pub const fn flip(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The side-to-move letter used in FEN.
    pub const fn char(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    /// Signed offset of a single pawn push for this colour.
    pub const fn pawn_push(self) -> i8 {
        match self {
            Self::White => 8,
            Self::Black => -8,
        }
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        [Self::White, Self::Black].into_iter()
    }
}

impl Not for Colour {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.flip()
    }
}

impl Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::White => write!(f, "White"),
            Self::Black => write!(f, "Black"),
        }
    }
}

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

const _PIECE_TYPE_ASSERT: () = assert!(size_of::<PieceType>() == size_of::<Option<PieceType>>());

impl PieceType {
    /// The piece types a pawn may promote to, in generation order.
    pub const PROMOTIONS: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    pub const fn new(v: u8) -> Option<Self> {
        if v < 6 {
            // SAFETY: inner is less than 6, so it corresponds to a valid enum variant.
            Some(unsafe { std::mem::transmute::<u8, Self>(v) })
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn legal_promo(self) -> bool {
        matches!(self, Self::Queen | Self::Knight | Self::Bishop | Self::Rook)
    }

    pub const fn promo_char(self) -> Option<char> {
        match self {
            Self::Queen => Some('q'),
            Self::Knight => Some('n'),
            Self::Bishop => Some('b'),
            Self::Rook => Some('r'),
            _ => None,
        }
    }

    pub const fn from_promo_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(Self::Queen),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            _ => None,
        }
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        // SAFETY: all values are within `0..6`.
        (0..6u8).map(|i| unsafe { std::mem::transmute(i) })
    }
}

impl Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pawn => "Pawn",
            Self::Knight => "Knight",
            Self::Bishop => "Bishop",
            Self::Rook => "Rook",
            Self::Queen => "Queen",
            Self::King => "King",
        };
        f.write_str(name)
    }
}

/// A coloured piece. The low bit is the colour and the remaining bits are the
/// piece type, so `WP, BP, WN, BN, ...` in order.
#[rustfmt::skip]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum Piece {
    WP, BP,
    WN, BN,
    WB, BB,
    WR, BR,
    WQ, BQ,
    WK, BK,
}

const _PIECE_ASSERT: () = assert!(size_of::<Piece>() == size_of::<Option<Piece>>());

impl Piece {
    pub const fn new(colour: Colour, piece_type: PieceType) -> Self {
        let index = colour as u8 | (piece_type as u8) << 1;
        // SAFETY: colour is {0, 1} and piece_type is {0..6},
        // so index is at most 11, a valid enum variant.
        unsafe { std::mem::transmute(index) }
    }

    pub const fn colour(self) -> Colour {
        if (self as u8) & 1 == 0 {
            Colour::White
        } else {
            Colour::Black
        }
    }

    pub const fn piece_type(self) -> PieceType {
        // SAFETY: self >> 1 is at most 5, a valid PieceType.
        unsafe { std::mem::transmute(self as u8 >> 1) }
    }

    pub const fn char(self) -> char {
        let c = match self.piece_type() {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        };
        match self.colour() {
            Colour::White => c,
            Colour::Black => c.to_ascii_lowercase(),
        }
    }

    /// Inverse of [`Piece::char`].
    pub fn from_char(c: char) -> Option<Self> {
        let piece_type = match c.to_ascii_uppercase() {
            'P' => PieceType::Pawn,
            'N' => PieceType::Knight,
            'B' => PieceType::Bishop,
            'R' => PieceType::Rook,
            'Q' => PieceType::Queen,
            'K' => PieceType::King,
            _ => return None,
        };
        let colour = if c.is_ascii_uppercase() {
            Colour::White
        } else {
            Colour::Black
        };
        Some(Self::new(colour, piece_type))
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        // SAFETY: all values are within `0..12`.
        (0..12u8).map(|i| unsafe { std::mem::transmute(i) })
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl<T> Index<Colour> for [T; 2] {
    type Output = T;

    fn index(&self, index: Colour) -> &Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked(index as usize) }
    }
}

impl<T> IndexMut<Colour> for [T; 2] {
    fn index_mut(&mut self, index: Colour) -> &mut Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked_mut(index as usize) }
    }
}

impl<T> Index<PieceType> for [T; 6] {
    type Output = T;

    fn index(&self, index: PieceType) -> &Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked(index as usize) }
    }
}

impl<T> IndexMut<PieceType> for [T; 6] {
    fn index_mut(&mut self, index: PieceType) -> &mut Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked_mut(index as usize) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_construction_and_decomposition() {
        for colour in Colour::all() {
            for piece_type in PieceType::all() {
                let piece = Piece::new(colour, piece_type);
                assert_eq!(piece.colour(), colour, "{colour:?} {piece_type:?}");
                assert_eq!(piece.piece_type(), piece_type, "{colour:?} {piece_type:?}");
            }
        }
        assert_eq!(Piece::new(Colour::Black, PieceType::Knight), Piece::BN);
        assert_eq!(Piece::new(Colour::White, PieceType::King), Piece::WK);
    }

    #[test]
    fn piece_chars() {
        for piece in Piece::all() {
            let c = piece.char();
            assert_eq!(c.is_ascii_uppercase(), piece.colour() == Colour::White);
            assert_eq!(Piece::from_char(c), Some(piece));
        }
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Piece::from_char('1'), None);
    }

    #[test]
    fn promotion_chars() {
        for pt in PieceType::PROMOTIONS {
            assert!(pt.legal_promo());
            let c = pt.promo_char().unwrap();
            assert_eq!(PieceType::from_promo_char(c), Some(pt));
        }
        assert_eq!(PieceType::King.promo_char(), None);
        assert_eq!(PieceType::from_promo_char('k'), None);
    }

    #[test]
    fn colour_flip() {
        assert_eq!(!Colour::White, Colour::Black);
        assert_eq!(Colour::Black.flip(), Colour::White);
        assert_eq!(Colour::White.pawn_push(), White::UP);
        assert_eq!(Colour::Black.pawn_push(), Black::UP);
    }
}
