use std::{
    fmt::{self, Display},
    mem::size_of,
    ops::{BitOr, BitOrAssign, Index, IndexMut, Sub, SubAssign},
    str::FromStr,
};

use crate::chess::{piece::Colour, squareset::SquareSet};

#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

const _FILE_ASSERT: () = assert!(size_of::<File>() == size_of::<Option<File>>());

impl File {
    pub const fn abs_diff(self, other: Self) -> u8 {
        (self as u8).abs_diff(other as u8)
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            // SAFETY: inner is less than 8, so it corresponds to a valid enum variant.
            Some(unsafe { std::mem::transmute::<u8, Self>(index) })
        } else {
            None
        }
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        // SAFETY: all values are within `0..8`.
        (0..8u8).map(|i| unsafe { std::mem::transmute(i) })
    }

    /// The file letter, in lowercase.
    pub const fn char(self) -> char {
        (b'a' + self as u8) as char
    }

    pub const fn as_set(self) -> SquareSet {
        SquareSet::FILES[self as usize]
    }
}

impl<T> Index<File> for [T; 8] {
    type Output = T;

    fn index(&self, index: File) -> &Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked(index as usize) }
    }
}

impl<T> IndexMut<File> for [T; 8] {
    fn index_mut(&mut self, index: File) -> &mut Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked_mut(index as usize) }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

const _RANK_ASSERT: () = assert!(size_of::<Rank>() == size_of::<Option<Rank>>());

impl Rank {
    pub const fn abs_diff(self, other: Self) -> u8 {
        (self as u8).abs_diff(other as u8)
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            // SAFETY: inner is less than 8, so it corresponds to a valid enum variant.
            Some(unsafe { std::mem::transmute::<u8, Self>(index) })
        } else {
            None
        }
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        // SAFETY: all values are within `0..8`.
        (0..8u8).map(|i| unsafe { std::mem::transmute(i) })
    }

    /// The rank as seen from `side`'s half of the board: the first rank for
    /// black is the eighth rank.
    pub const fn relative_to(self, side: Colour) -> Self {
        match side {
            Colour::White => self,
            // SAFETY: 7 - x for x in `0..8` is also in `0..8`.
            Colour::Black => unsafe { std::mem::transmute::<u8, Self>(7 - self as u8) },
        }
    }

    pub const fn as_set(self) -> SquareSet {
        SquareSet::RANKS[self as usize]
    }
}

impl<T> Index<Rank> for [T; 8] {
    type Output = T;

    fn index(&self, index: Rank) -> &Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked(index as usize) }
    }
}

impl<T> IndexMut<Rank> for [T; 8] {
    fn index_mut(&mut self, index: Rank) -> &mut Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked_mut(index as usize) }
    }
}

#[rustfmt::skip]
#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(u8)]
pub enum Square {
    #[default]
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

const _SQUARE_ASSERT: () = assert!(size_of::<Square>() == size_of::<Option<Square>>());

impl<T> Index<Square> for [T; 64] {
    type Output = T;

    fn index(&self, index: Square) -> &Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked(index as usize) }
    }
}

impl<T> IndexMut<Square> for [T; 64] {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        // SAFETY: the legal values for this type are all in bounds.
        unsafe { self.get_unchecked_mut(index as usize) }
    }
}

static SQUARE_NAMES: [&str; 64] = [
    "a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1", "a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2",
    "a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3", "a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4",
    "a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5", "a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6",
    "a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7", "a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8",
];

#[allow(clippy::unusual_byte_groupings)]
impl Square {
    pub const fn from_rank_file(rank: Rank, file: File) -> Self {
        let inner = rank as u8 * 8 + file as u8;
        // SAFETY: Rank and File are constrained such that inner is always < 64.
        unsafe { std::mem::transmute(inner) }
    }

    pub const fn new(inner: u8) -> Option<Self> {
        if inner < 64 {
            // SAFETY: inner is less than 64, so it corresponds to a valid enum variant.
            Some(unsafe { std::mem::transmute::<u8, Self>(inner) })
        } else {
            None
        }
    }

    /// SAFETY: you may only call this function with value of `inner` less than 64.
    pub const unsafe fn new_unchecked(inner: u8) -> Self {
        debug_assert!(inner < 64);
        // SAFETY: caller's precondition.
        unsafe { std::mem::transmute(inner) }
    }

    pub const fn flip_rank(self) -> Self {
        // SAFETY: given the precondition that `self as u8` is less than 64,
        // this operation cannot construct a value >= 64.
        unsafe { std::mem::transmute(self as u8 ^ 0b111_000) }
    }

    pub const fn relative_to(self, side: Colour) -> Self {
        if matches!(side, Colour::White) {
            self
        } else {
            self.flip_rank()
        }
    }

    /// The file that this square is on.
    pub const fn file(self) -> File {
        // SAFETY: `self as u8` is less than 64, and this operation can only
        // decrease the value, so cannot construct a value >= 64.
        unsafe { std::mem::transmute(self as u8 % 8) }
    }

    /// The rank that this square is on.
    pub const fn rank(self) -> Rank {
        // SAFETY: `self as u8` is less than 64, and this operation can only
        // decrease the value, so cannot construct a value >= 64.
        unsafe { std::mem::transmute(self as u8 / 8) }
    }

    /// Chebyshev distance: the number of king steps between two squares.
    pub const fn distance(a: Self, b: Self) -> u8 {
        let files = a.file().abs_diff(b.file());
        let ranks = a.rank().abs_diff(b.rank());
        if files > ranks { files } else { ranks }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn inner(self) -> u8 {
        self as u8
    }

    /// Offsets the linear index of this square, returning `None` if the result
    /// leaves `0..64`. This does not detect wrapping around the a- or h-file.
    pub const fn offset(self, delta: i8) -> Option<Self> {
        #![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let res = self as i16 + delta as i16;
        if res < 0 { None } else { Self::new(res as u8) }
    }

    /// Offsets the linear index of this square by a delta that the caller
    /// knows keeps it on the board.
    pub const fn shift(self, delta: i8) -> Self {
        #![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let res = self as i8 + delta;
        debug_assert!(0 <= res && res < 64);
        // SAFETY: masking to the low six bits gives a value in `0..64`.
        unsafe { std::mem::transmute((res as u8) & 0b11_1111) }
    }

    pub const fn as_set(self) -> SquareSet {
        SquareSet::from_inner(1 << self as u8)
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        // SAFETY: all values are within `0..64`.
        (0..64u8).map(|i| unsafe { std::mem::transmute(i) })
    }

    pub fn name(self) -> &'static str {
        SQUARE_NAMES[self]
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", SQUARE_NAMES[*self])
    }
}

impl FromStr for Square {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SQUARE_NAMES
            .iter()
            .position(|&name| name == s)
            .and_then(|index| -> Option<u8> { index.try_into().ok() })
            .and_then(Self::new)
            .ok_or("Invalid square name")
    }
}

impl From<Square> for u16 {
    fn from(square: Square) -> Self {
        square as Self
    }
}

/// Which wing a castling move goes to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    King,
    Queen,
}

impl CastlingSide {
    /// Where the king lands, from white's point of view.
    pub const fn king_to(self) -> Square {
        match self {
            Self::King => Square::G1,
            Self::Queen => Square::C1,
        }
    }

    /// Where the rook lands, from white's point of view.
    pub const fn rook_to(self) -> Square {
        match self {
            Self::King => Square::F1,
            Self::Queen => Square::D1,
        }
    }
}

/// A set of castling rights.
///
/// Each of the four rights is one bit, so unions and removals are plain
/// bit operations. Which rook a right refers to is stored by the position,
/// not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CastlingRights {
    data: u8,
}

impl CastlingRights {
    pub const NONE: Self = Self { data: 0 };
    pub const WHITE_KING: Self = Self { data: 0b0001 };
    pub const WHITE_QUEEN: Self = Self { data: 0b0010 };
    pub const BLACK_KING: Self = Self { data: 0b0100 };
    pub const BLACK_QUEEN: Self = Self { data: 0b1000 };
    pub const WHITE: Self = Self { data: 0b0011 };
    pub const BLACK: Self = Self { data: 0b1100 };
    pub const ALL: Self = Self { data: 0b1111 };

    /// The single right for `colour` castling towards `side`.
    pub const fn single(colour: Colour, side: CastlingSide) -> Self {
        Self {
            data: 1 << (colour as u8 * 2 + side as u8),
        }
    }

    /// Both rights belonging to `colour`.
    pub const fn of(colour: Colour) -> Self {
        match colour {
            Colour::White => Self::WHITE,
            Colour::Black => Self::BLACK,
        }
    }

    pub const fn inner(self) -> u8 {
        self.data
    }

    pub const fn is_empty(self) -> bool {
        self.data == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.data & other.data == other.data
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.data & other.data != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self {
            data: self.data | other.data,
        }
    }

    pub const fn remove(self, other: Self) -> Self {
        Self {
            data: self.data & !other.data,
        }
    }

    /// Index of a single right, in `0..4`.
    pub const fn index(self) -> usize {
        debug_assert!(self.data.count_ones() == 1);
        (self.data.trailing_zeros() & 0b11) as usize
    }

    /// The colour owning a single right.
    pub const fn colour(self) -> Colour {
        if self.data & Self::WHITE.data != 0 {
            Colour::White
        } else {
            Colour::Black
        }
    }

    /// The wing of a single right.
    pub const fn side(self) -> CastlingSide {
        if self.data & (Self::WHITE_KING.data | Self::BLACK_KING.data) != 0 {
            CastlingSide::King
        } else {
            CastlingSide::Queen
        }
    }

    /// The four single rights, in the order WK, WQ, BK, BQ.
    pub fn singles() -> impl DoubleEndedIterator<Item = Self> {
        [
            Self::WHITE_KING,
            Self::WHITE_QUEEN,
            Self::BLACK_KING,
            Self::BLACK_QUEEN,
        ]
        .into_iter()
    }

    /// The single rights present in this set, in the order WK, WQ, BK, BQ.
    pub fn iter(self) -> impl Iterator<Item = Self> {
        Self::singles().filter(move |&right| self.contains(right))
    }
}

impl BitOr for CastlingRights {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for CastlingRights {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl Sub for CastlingRights {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.remove(rhs)
    }
}

impl SubAssign for CastlingRights {
    fn sub_assign(&mut self, rhs: Self) {
        *self = self.remove(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_flipping() {
        assert_eq!(Square::A1.flip_rank(), Square::A8);
        assert_eq!(Square::H1.flip_rank(), Square::H8);
        assert_eq!(Square::A8.flip_rank(), Square::A1);
        assert_eq!(Square::H8.flip_rank(), Square::H1);
    }

    #[test]
    fn square_relative_to() {
        assert_eq!(Square::A1.relative_to(Colour::White), Square::A1);
        assert_eq!(Square::A1.relative_to(Colour::Black), Square::A8);
        assert_eq!(Square::G1.relative_to(Colour::Black), Square::G8);
        assert_eq!(Rank::Two.relative_to(Colour::White), Rank::Two);
        assert_eq!(Rank::Two.relative_to(Colour::Black), Rank::Seven);
        assert_eq!(Rank::Eight.relative_to(Colour::Black), Rank::One);
    }

    #[test]
    fn distances() {
        assert_eq!(Square::distance(Square::A1, Square::A1), 0);
        assert_eq!(Square::distance(Square::A1, Square::H8), 7);
        assert_eq!(Square::distance(Square::B1, Square::C3), 2);
        // linear-index neighbours across the board edge are far apart.
        assert_eq!(Square::distance(Square::H1, Square::A2), 7);
    }

    #[test]
    fn offsets() {
        assert_eq!(Square::E4.offset(8), Some(Square::E5));
        assert_eq!(Square::E4.offset(-9), Some(Square::D3));
        assert_eq!(Square::A1.offset(-1), None);
        assert_eq!(Square::H8.offset(1), None);
        assert_eq!(Square::E2.shift(16), Square::E4);
        assert_eq!(Square::D7.shift(-16), Square::D5);
    }

    #[test]
    fn square_names() {
        assert_eq!(Square::E4.to_string(), "e4");
        assert_eq!("h8".parse::<Square>(), Ok(Square::H8));
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        for sq in Square::all() {
            assert_eq!(sq.name().parse::<Square>(), Ok(sq));
        }
    }

    #[test]
    fn single_rights() {
        assert_eq!(
            CastlingRights::single(Colour::White, CastlingSide::King),
            CastlingRights::WHITE_KING
        );
        assert_eq!(
            CastlingRights::single(Colour::Black, CastlingSide::Queen),
            CastlingRights::BLACK_QUEEN
        );
        for (i, right) in CastlingRights::singles().enumerate() {
            assert_eq!(right.index(), i);
            assert_eq!(CastlingRights::single(right.colour(), right.side()), right);
        }
    }

    #[test]
    fn rights_set_operations() {
        let mut rights = CastlingRights::ALL;
        assert!(rights.contains(CastlingRights::WHITE));
        rights -= CastlingRights::WHITE_KING;
        assert!(!rights.contains(CastlingRights::WHITE_KING));
        assert!(rights.intersects(CastlingRights::WHITE));
        assert!(!rights.contains(CastlingRights::WHITE));
        rights -= CastlingRights::of(Colour::Black);
        assert_eq!(rights, CastlingRights::WHITE_QUEEN);
        rights |= CastlingRights::BLACK_KING;
        assert_eq!(
            rights.iter().collect::<Vec<_>>(),
            [CastlingRights::WHITE_QUEEN, CastlingRights::BLACK_KING]
        );
        assert!((rights - rights).is_empty());
    }
}
