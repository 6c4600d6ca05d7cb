use std::fmt::{Debug, Display, Formatter};

use crate::chess::{piece::PieceType, types::Square};

/// What sort of move a [`Move`] is, stored in its top two bits.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[repr(u16)]
pub enum MoveKind {
    Normal = 0,
    Promotion = 1 << 14,
    EnPassant = 2 << 14,
    Castling = 3 << 14,
}

/// A move packed into sixteen bits.
///
/// Bits 0-5 are the origin, 6-11 the destination, 12-13 the promotion
/// piece (knight to queen) and 14-15 the [`MoveKind`]. Castling moves are
/// stored as the king capturing its own rook, so the destination is the
/// rook's square.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
    data: u16,
}

impl Move {
    const FROM_MASK: u16 = 0b0000_0000_0011_1111;
    const TO_MASK: u16 = 0b0000_1111_1100_0000;
    const PROMO_MASK: u16 = 0b0011_0000_0000_0000;
    const KIND_MASK: u16 = 0b1100_0000_0000_0000;

    pub const fn new(from: Square, to: Square) -> Self {
        Self::with_kind(from, to, MoveKind::Normal)
    }

    const fn with_kind(from: Square, to: Square, kind: MoveKind) -> Self {
        Self {
            data: from as u16 | (to as u16) << 6 | kind as u16,
        }
    }

    pub const fn new_with_promo(from: Square, to: Square, promotion: PieceType) -> Self {
        debug_assert!(promotion.legal_promo());
        let promo = (promotion as u16).wrapping_sub(PieceType::Knight as u16) & 0b11;
        Self {
            data: from as u16 | (to as u16) << 6 | promo << 12 | MoveKind::Promotion as u16,
        }
    }

    pub const fn new_en_passant(from: Square, to: Square) -> Self {
        Self::with_kind(from, to, MoveKind::EnPassant)
    }

    /// A castling move, given as the king's square and its rook's square.
    pub const fn new_castling(king_from: Square, rook_from: Square) -> Self {
        Self::with_kind(king_from, rook_from, MoveKind::Castling)
    }

    pub const fn from(self) -> Square {
        // SAFETY: the mask keeps the value within `0..64`.
        unsafe { Square::new_unchecked((self.data & Self::FROM_MASK) as u8) }
    }

    pub const fn to(self) -> Square {
        // SAFETY: the mask and shift keep the value within `0..64`.
        unsafe { Square::new_unchecked(((self.data & Self::TO_MASK) >> 6) as u8) }
    }

    pub const fn kind(self) -> MoveKind {
        match self.data & Self::KIND_MASK {
            0 => MoveKind::Normal,
            0x4000 => MoveKind::Promotion,
            0x8000 => MoveKind::EnPassant,
            _ => MoveKind::Castling,
        }
    }

    /// The piece a promotion turns into. `None` for every other kind of move.
    pub const fn promotion_type(self) -> Option<PieceType> {
        if !self.is_promo() {
            return None;
        }
        PieceType::new(((self.data & Self::PROMO_MASK) >> 12) as u8 + PieceType::Knight as u8)
    }

    pub const fn is_promo(self) -> bool {
        matches!(self.kind(), MoveKind::Promotion)
    }

    pub const fn is_ep(self) -> bool {
        matches!(self.kind(), MoveKind::EnPassant)
    }

    pub const fn is_castle(self) -> bool {
        matches!(self.kind(), MoveKind::Castling)
    }

    pub const fn inner(self) -> u16 {
        self.data
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(c) = self.promotion_type().and_then(PieceType::promo_char) {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Debug for Move {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "move from {} ({:?}) to {} ({:?}), kind {:?}, promo {}",
            self.from(),
            self.from(),
            self.to(),
            self.to(),
            self.kind(),
            self.promotion_type()
                .and_then(PieceType::promo_char)
                .unwrap_or('X'),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_move() {
        let m = Move::new(Square::A1, Square::B2);
        assert_eq!(m.from(), Square::A1);
        assert_eq!(m.to(), Square::B2);
        assert_eq!(m.kind(), MoveKind::Normal);
        assert!(!m.is_ep());
        assert!(!m.is_castle());
        assert!(!m.is_promo());
        assert_eq!(m.promotion_type(), None);
        assert_eq!(m.to_string(), "a1b2");
    }

    #[test]
    fn promotions() {
        for pt in PieceType::PROMOTIONS {
            let m = Move::new_with_promo(Square::A7, Square::B8, pt);
            assert_eq!(m.from(), Square::A7);
            assert_eq!(m.to(), Square::B8);
            assert!(m.is_promo());
            assert!(!m.is_ep());
            assert!(!m.is_castle());
            assert_eq!(m.promotion_type(), Some(pt));
        }
        let m = Move::new_with_promo(Square::E2, Square::E1, PieceType::Knight);
        assert_eq!(m.to_string(), "e2e1n");
    }

    #[test]
    fn special_kinds() {
        let ep = Move::new_en_passant(Square::E5, Square::D6);
        assert!(ep.is_ep());
        assert_eq!(ep.promotion_type(), None);
        assert_eq!(ep.to_string(), "e5d6");

        let castle = Move::new_castling(Square::E1, Square::H1);
        assert!(castle.is_castle());
        assert_eq!(castle.to(), Square::H1);
        assert_eq!(castle.to_string(), "e1h1");
    }

    #[test]
    fn all_square_combinations() {
        for from in Square::all() {
            for to in Square::all() {
                let m = Move::new(from, to);
                assert_eq!(m.from(), from);
                assert_eq!(m.to(), to);
                let c = Move::new_castling(from, to);
                assert_eq!((c.from(), c.to()), (from, to));
                assert_ne!(m, c);
            }
        }
    }
}
