use arrayvec::ArrayVec;

use std::{
    fmt::{Display, Formatter},
    ops::Deref,
};

use crate::chess::{
    chessmove::Move,
    piece::{Black, Col, Colour, PieceType, White},
    position::Position,
    squareset::SquareSet,
    types::{CastlingRights, Rank, Square},
};

/// Comfortably above the most moves any reachable position has (218).
pub const MAX_POSITION_MOVES: usize = 256;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveList {
    inner: ArrayVec<Move, MAX_POSITION_MOVES>,
}

impl MoveList {
    pub fn new() -> Self {
        Self {
            inner: ArrayVec::new(),
        }
    }

    pub fn push(&mut self, m: Move) {
        self.inner.push(m);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    fn retain(&mut self, f: impl FnMut(&mut Move) -> bool) {
        self.inner.retain(f);
    }
}

impl Deref for MoveList {
    type Target = [Move];

    fn deref(&self) -> &[Move] {
        &self.inner
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl Display for MoveList {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        if self.inner.is_empty() {
            return write!(f, "MoveList: (0) []");
        }
        writeln!(f, "MoveList: ({}) [", self.inner.len())?;
        for m in &self.inner[0..self.inner.len() - 1] {
            writeln!(f, "  {m},")?;
        }
        writeln!(f, "  {}", self.inner[self.inner.len() - 1])?;
        write!(f, "]")
    }
}

/// Which subset of the pseudo-legal moves to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum GenKind {
    /// Captures, en passant and queen promotions.
    Captures,
    /// Non-captures, under-promotions by push, and castling.
    Quiets,
    /// Non-captures that give check, apart from castling and promotions.
    QuietChecks,
    /// Moves that may get the king out of check.
    Evasions,
    /// Every pseudo-legal move, for a side not in check.
    NonEvasions,
    /// Every legal move.
    Legal,
}

/// Compile-time generation mode.
pub trait GenType {
    const KIND: GenKind;
}

pub struct Captures;
pub struct Quiets;
pub struct QuietChecks;
pub struct Evasions;
pub struct NonEvasions;

impl GenType for Captures {
    const KIND: GenKind = GenKind::Captures;
}
impl GenType for Quiets {
    const KIND: GenKind = GenKind::Quiets;
}
impl GenType for QuietChecks {
    const KIND: GenKind = GenKind::QuietChecks;
}
impl GenType for Evasions {
    const KIND: GenKind = GenKind::Evasions;
}
impl GenType for NonEvasions {
    const KIND: GenKind = GenKind::NonEvasions;
}

impl Position<'_> {
    fn push_promotions<G: GenType>(
        move_list: &mut MoveList,
        from: Square,
        to: Square,
        capture: bool,
    ) {
        use PieceType::{Bishop, Knight, Queen, Rook};
        let all = matches!(G::KIND, GenKind::Evasions | GenKind::NonEvasions);

        if all || G::KIND == GenKind::Captures {
            move_list.push(Move::new_with_promo(from, to, Queen));
        }
        // under-promotions travel with the other captures, or with the quiets.
        let under = match G::KIND {
            GenKind::Captures => capture,
            GenKind::Quiets => !capture,
            _ => all,
        };
        if under {
            for promo in [Rook, Bishop, Knight] {
                move_list.push(Move::new_with_promo(from, to, promo));
            }
        }
    }

    fn generate_pawn_moves<C: Col, G: GenType>(&self, move_list: &mut MoveList, target: SquareSet) {
        let tables = self.tables;
        let them = !C::COLOUR;
        let promo_rank = C::PROMO_FROM_RANK.as_set();
        // pawns landing here after one push may push again.
        let third_rank = C::up(C::PAWN_START_RANK.as_set());

        let empty = self.layout.empty();
        let enemies = if G::KIND == GenKind::Evasions {
            self.checkers()
        } else {
            self.colour(them)
        };

        let our_pawns = self.pieces_of(C::COLOUR, PieceType::Pawn);
        let pawns_on_7 = our_pawns & promo_rank;
        let pawns_not_on_7 = our_pawns - promo_rank;

        // single and double pushes, without promotions
        if G::KIND != GenKind::Captures {
            let mut b1 = C::up(pawns_not_on_7) & empty;
            let mut b2 = C::up(b1 & third_rank) & empty;

            if G::KIND == GenKind::Evasions {
                b1 &= target;
                b2 &= target;
            }

            if G::KIND == GenKind::QuietChecks {
                // either check directly, or move a blocker off the enemy king's file.
                let ksq = self.king_sq(them);
                let dc_candidates = self.blockers_for_king(them) - ksq.file().as_set();
                let direct = tables.pawn_attacks(them, ksq);
                b1 &= direct | C::up(dc_candidates);
                b2 &= direct | C::up(C::up(dc_candidates));
            }

            for to in b1 {
                move_list.push(Move::new(to.shift(-C::UP), to));
            }
            for to in b2 {
                move_list.push(Move::new(to.shift(-2 * C::UP), to));
            }
        }

        if pawns_on_7.non_empty() && G::KIND != GenKind::QuietChecks {
            let b1 = C::up_right(pawns_on_7) & enemies;
            let b2 = C::up_left(pawns_on_7) & enemies;
            let mut b3 = C::up(pawns_on_7) & empty;

            if G::KIND == GenKind::Evasions {
                b3 &= target;
            }

            for to in b1 {
                Self::push_promotions::<G>(move_list, to.shift(-C::UP_RIGHT), to, true);
            }
            for to in b2 {
                Self::push_promotions::<G>(move_list, to.shift(-C::UP_LEFT), to, true);
            }
            for to in b3 {
                Self::push_promotions::<G>(move_list, to.shift(-C::UP), to, false);
            }
        }

        if matches!(
            G::KIND,
            GenKind::Captures | GenKind::Evasions | GenKind::NonEvasions
        ) {
            let b1 = C::up_right(pawns_not_on_7) & enemies;
            let b2 = C::up_left(pawns_not_on_7) & enemies;

            for to in b1 {
                move_list.push(Move::new(to.shift(-C::UP_RIGHT), to));
            }
            for to in b2 {
                move_list.push(Move::new(to.shift(-C::UP_LEFT), to));
            }

            if let Some(ep) = self.ep_square() {
                debug_assert_eq!(ep.rank(), Rank::Six.relative_to(C::COLOUR));
                // en passant can only resolve a check by taking the pawn that gave it.
                let pushed = ep.shift(-C::UP);
                if G::KIND == GenKind::Evasions && !self.checkers().contains_square(pushed) {
                    return;
                }
                let attackers = pawns_not_on_7 & tables.pawn_attacks(them, ep);
                debug_assert!(attackers.non_empty());
                for from in attackers {
                    move_list.push(Move::new_en_passant(from, ep));
                }
            }
        }
    }

    fn generate_piece_moves<G: GenType>(
        &self,
        move_list: &mut MoveList,
        us: Colour,
        pt: PieceType,
        target: SquareSet,
    ) {
        let checks = G::KIND == GenKind::QuietChecks;
        let occupied = self.occupied();
        for from in self.pieces_of(us, pt) {
            let mut b = self.tables.attacks(pt, from, occupied) & target;
            // to check, either move a blocker freely or land on a check square.
            if checks && !self.blockers_for_king(!us).contains_square(from) {
                b &= self.check_squares(pt);
            }
            for to in b {
                move_list.push(Move::new(from, to));
            }
        }
    }

    fn generate_all<C: Col, G: GenType>(&self, move_list: &mut MoveList) {
        use PieceType::{Bishop, Knight, Queen, Rook};

        let us = C::COLOUR;
        let them = !us;
        let checks = G::KIND == GenKind::QuietChecks;
        let ksq = self.king_sq(us);

        // in double check only the king may move.
        if G::KIND != GenKind::Evasions || !self.checkers().many() {
            let target = match G::KIND {
                GenKind::Evasions => match self.checkers().first() {
                    Some(checker) => self.tables.between(ksq, checker) | checker.as_set(),
                    None => SquareSet::EMPTY,
                },
                GenKind::NonEvasions | GenKind::Legal => !self.colour(us),
                GenKind::Captures => self.colour(them),
                GenKind::Quiets | GenKind::QuietChecks => self.layout.empty(),
            };

            self.generate_pawn_moves::<C, G>(move_list, target);
            for pt in [Knight, Bishop, Rook, Queen] {
                self.generate_piece_moves::<G>(move_list, us, pt, target);
            }
        }

        if !checks || self.blockers_for_king(them).contains_square(ksq) {
            let target = match G::KIND {
                GenKind::Evasions | GenKind::NonEvasions | GenKind::Legal => !self.colour(us),
                GenKind::Captures => self.colour(them),
                _ => self.layout.empty(),
            };
            let mut b = self.tables.king_attacks(ksq) & target;
            if checks {
                b -= self.tables.queen_attacks(self.king_sq(them), SquareSet::EMPTY);
            }
            for to in b {
                move_list.push(Move::new(ksq, to));
            }

            if matches!(G::KIND, GenKind::Quiets | GenKind::NonEvasions)
                && self.can_castle(CastlingRights::of(us))
            {
                for right in CastlingRights::of(us).iter() {
                    if !self.can_castle(right) || self.castling_impeded(right) {
                        continue;
                    }
                    if let Some(rook) = self.castling_rook_square(right) {
                        move_list.push(Move::new_castling(ksq, rook));
                    }
                }
            }
        }
    }

    /// Appends the pseudo-legal moves of mode `G` to `move_list`.
    pub fn generate<G: GenType>(&self, move_list: &mut MoveList) {
        match self.side {
            Colour::White => self.generate_all::<White, G>(move_list),
            Colour::Black => self.generate_all::<Black, G>(move_list),
        }
    }

    /// Appends the legal moves to `move_list`.
    pub fn generate_legal(&self, move_list: &mut MoveList) {
        let us = self.side;
        let pinned = self.blockers_for_king(us) & self.colour(us);
        let ksq = self.king_sq(us);
        let start = move_list.len();

        if self.in_check() {
            self.generate::<Evasions>(move_list);
        } else {
            self.generate::<NonEvasions>(move_list);
        }

        // only moves that can expose the king need the full check.
        let mut index = 0;
        move_list.retain(|m| {
            index += 1;
            index <= start
                || !(pinned.contains_square(m.from()) || m.from() == ksq || m.is_ep())
                || self.legal(*m)
        });
    }

    /// Appends the moves of a runtime-selected mode to `move_list`.
    pub fn generate_kind(&self, kind: GenKind, move_list: &mut MoveList) {
        match kind {
            GenKind::Captures => self.generate::<Captures>(move_list),
            GenKind::Quiets => self.generate::<Quiets>(move_list),
            GenKind::QuietChecks => self.generate::<QuietChecks>(move_list),
            GenKind::Evasions => self.generate::<Evasions>(move_list),
            GenKind::NonEvasions => self.generate::<NonEvasions>(move_list),
            GenKind::Legal => self.generate_legal(move_list),
        }
    }

    pub fn legal_moves(&self) -> MoveList {
        let mut move_list = MoveList::new();
        self.generate_legal(&mut move_list);
        move_list
    }

    /// The legal moves of the piece on `sq`, for highlighting destinations.
    pub fn legal_moves_from(&self, sq: Square) -> MoveList {
        let mut move_list = self.legal_moves();
        move_list.retain(|m| m.from() == sq);
        move_list
    }
}
