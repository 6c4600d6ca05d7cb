use std::{sync::OnceLock, time::Instant};

use crate::chess::{
    magic::{MagicSeeds, Slider, SlidingTable},
    piece::{Colour, PieceType},
    squareset::SquareSet,
    types::Square,
};

const KING_DELTAS: [i8; 8] = [9, 8, 7, 1, -9, -8, -7, -1];
const KNIGHT_DELTAS: [i8; 8] = [17, 15, 10, 6, -17, -15, -10, -6];

/// Every precomputed attack set used by move generation.
///
/// Built once and then only read. Most code goes through [`AttackTables::global`],
/// but independent instances can be made for tests or for other seeds.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AttackTables {
    king: [SquareSet; 64],
    knight: [SquareSet; 64],
    pawn: [[SquareSet; 64]; 2],
    bishop: SlidingTable,
    rook: SlidingTable,
    line: Vec<[SquareSet; 64]>,
    between: Vec<[SquareSet; 64]>,
}

fn leaper_attacks(deltas: &[i8; 8]) -> [SquareSet; 64] {
    let mut attacks = [SquareSet::EMPTY; 64];
    for sq in Square::all() {
        // a destination more than two king-steps away has wrapped around an edge.
        attacks[sq] = deltas
            .iter()
            .filter_map(|&delta| sq.offset(delta))
            .filter(|&to| Square::distance(sq, to) <= 2)
            .collect();
    }
    attacks
}

fn pawn_attacks_from(colour: Colour) -> [SquareSet; 64] {
    let mut attacks = [SquareSet::EMPTY; 64];
    for sq in Square::all() {
        let bb = sq.as_set();
        attacks[sq] = match colour {
            Colour::White => bb.north_east_one() | bb.north_west_one(),
            Colour::Black => bb.south_east_one() | bb.south_west_one(),
        };
    }
    attacks
}

impl AttackTables {
    pub fn new() -> Self {
        Self::with_seeds(MagicSeeds::default())
    }

    pub fn with_seeds(seeds: MagicSeeds) -> Self {
        let start = Instant::now();

        let bishop = SlidingTable::new(Slider::Bishop, &seeds);
        let rook = SlidingTable::new(Slider::Rook, &seeds);

        let mut line = vec![[SquareSet::EMPTY; 64]; 64];
        let mut between = vec![[SquareSet::EMPTY; 64]; 64];
        for s1 in Square::all() {
            for (table, slider) in [(&bishop, Slider::Bishop), (&rook, Slider::Rook)] {
                let reach = table.attacks(s1, SquareSet::EMPTY);
                for s2 in reach {
                    debug_assert!(slider.ray_attacks(s2, SquareSet::EMPTY).contains_square(s1));
                    line[s1.index()][s2] =
                        (reach & table.attacks(s2, SquareSet::EMPTY)) | s1.as_set() | s2.as_set();
                    between[s1.index()][s2] =
                        table.attacks(s1, s2.as_set()) & table.attacks(s2, s1.as_set());
                }
            }
        }

        let tables = Self {
            king: leaper_attacks(&KING_DELTAS),
            knight: leaper_attacks(&KNIGHT_DELTAS),
            pawn: [
                pawn_attacks_from(Colour::White),
                pawn_attacks_from(Colour::Black),
            ],
            bishop,
            rook,
            line,
            between,
        };

        log::debug!(
            "built attack tables in {:.1?} ({} bishop and {} rook slots)",
            start.elapsed(),
            tables.bishop.len(),
            tables.rook.len(),
        );

        tables
    }

    /// The process-wide table set, built on first use.
    pub fn global() -> &'static Self {
        static TABLES: OnceLock<AttackTables> = OnceLock::new();
        TABLES.get_or_init(Self::new)
    }

    pub fn king_attacks(&self, sq: Square) -> SquareSet {
        self.king[sq]
    }

    pub fn knight_attacks(&self, sq: Square) -> SquareSet {
        self.knight[sq]
    }

    /// Squares a pawn of `colour` standing on `sq` attacks.
    pub fn pawn_attacks(&self, colour: Colour, sq: Square) -> SquareSet {
        self.pawn[colour][sq]
    }

    pub fn bishop_attacks(&self, sq: Square, occupied: SquareSet) -> SquareSet {
        self.bishop.attacks(sq, occupied)
    }

    pub fn rook_attacks(&self, sq: Square, occupied: SquareSet) -> SquareSet {
        self.rook.attacks(sq, occupied)
    }

    pub fn queen_attacks(&self, sq: Square, occupied: SquareSet) -> SquareSet {
        self.bishop_attacks(sq, occupied) | self.rook_attacks(sq, occupied)
    }

    /// Attacks of any non-pawn piece type.
    pub fn attacks(&self, pt: PieceType, sq: Square, occupied: SquareSet) -> SquareSet {
        match pt {
            PieceType::Pawn => {
                debug_assert!(false, "pawn attacks depend on colour");
                SquareSet::EMPTY
            }
            PieceType::Knight => self.knight_attacks(sq),
            PieceType::Bishop => self.bishop_attacks(sq, occupied),
            PieceType::Rook => self.rook_attacks(sq, occupied),
            PieceType::Queen => self.queen_attacks(sq, occupied),
            PieceType::King => self.king_attacks(sq),
        }
    }

    /// The full board-spanning line through two aligned squares, or empty.
    pub fn line(&self, a: Square, b: Square) -> SquareSet {
        self.line[a.index()][b]
    }

    /// The squares strictly between two aligned squares, or empty.
    pub fn between(&self, a: Square, b: Square) -> SquareSet {
        self.between[a.index()][b]
    }

    /// Whether `c` lies on the line through `a` and `b`.
    pub fn aligned(&self, a: Square, b: Square, c: Square) -> bool {
        self.line(a, b).contains_square(c)
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_chess_validation() {
        // these values match the ones in the python-chess library.
        let tables = AttackTables::global();
        assert_eq!(
            tables.knight_attacks(Square::A1),
            SquareSet::from_inner(132_096)
        );
        assert_eq!(
            tables.knight_attacks(Square::H8),
            SquareSet::from_inner(9_077_567_998_918_656)
        );
        assert_eq!(tables.king_attacks(Square::A1), SquareSet::from_inner(770));
        assert_eq!(
            tables.king_attacks(Square::H8),
            SquareSet::from_inner(4_665_729_213_955_833_856)
        );
    }

    #[test]
    fn leapers_do_not_wrap() {
        let tables = AttackTables::global();
        assert_eq!(tables.knight_attacks(Square::H4).count(), 4);
        assert!(!tables.knight_attacks(Square::H4).contains_square(Square::A5));
        assert_eq!(tables.king_attacks(Square::H4).count(), 5);
        assert_eq!(tables.knight_attacks(Square::E4).count(), 8);
        assert_eq!(tables.king_attacks(Square::E4).count(), 8);
    }

    #[test]
    fn pawn_attacks_by_colour() {
        let tables = AttackTables::global();
        assert_eq!(
            tables.pawn_attacks(Colour::White, Square::E4),
            Square::D5.as_set() | Square::F5.as_set()
        );
        assert_eq!(
            tables.pawn_attacks(Colour::Black, Square::E4),
            Square::D3.as_set() | Square::F3.as_set()
        );
        assert_eq!(tables.pawn_attacks(Colour::White, Square::A2), Square::B3.as_set());
        assert_eq!(tables.pawn_attacks(Colour::White, Square::H8), SquareSet::EMPTY);
    }

    #[test]
    fn ray_test() {
        let tables = AttackTables::global();
        assert_eq!(tables.between(Square::A1, Square::A1), SquareSet::EMPTY);
        assert_eq!(tables.between(Square::A1, Square::B1), SquareSet::EMPTY);
        assert_eq!(tables.between(Square::A1, Square::C1), Square::B1.as_set());
        assert_eq!(
            tables.between(Square::A1, Square::D1),
            Square::B1.as_set() | Square::C1.as_set()
        );
        assert_eq!(tables.between(Square::B1, Square::D1), Square::C1.as_set());
        assert_eq!(tables.between(Square::D1, Square::B1), Square::C1.as_set());
        assert_eq!(tables.between(Square::A1, Square::B3), SquareSet::EMPTY);

        for from in Square::all() {
            for to in Square::all() {
                assert_eq!(tables.between(from, to), tables.between(to, from));
                assert_eq!(tables.line(from, to), tables.line(to, from));
            }
        }
    }

    #[test]
    fn ray_diag_test() {
        let tables = AttackTables::global();
        let ray = tables.between(Square::B5, Square::E8);
        assert_eq!(ray, Square::C6.as_set() | Square::D7.as_set());
    }

    #[test]
    fn lines_span_the_board() {
        let tables = AttackTables::global();
        assert_eq!(tables.line(Square::C1, Square::C5), SquareSet::FILE_C);
        assert_eq!(tables.line(Square::B2, Square::G7).count(), 8);
        assert!(tables.line(Square::B2, Square::G7).contains_square(Square::H8));
        assert_eq!(tables.line(Square::A1, Square::B3), SquareSet::EMPTY);
        assert_eq!(tables.line(Square::E4, Square::E4), SquareSet::EMPTY);

        assert!(tables.aligned(Square::A1, Square::C3, Square::H8));
        assert!(tables.aligned(Square::E1, Square::E8, Square::E4));
        assert!(!tables.aligned(Square::E1, Square::E8, Square::D4));
        assert!(!tables.aligned(Square::A1, Square::B3, Square::C5));
    }

    #[test]
    fn queen_is_union_of_sliders() {
        let tables = AttackTables::global();
        let occ = Square::E6.as_set() | Square::G6.as_set() | Square::B4.as_set();
        assert_eq!(
            tables.attacks(PieceType::Queen, Square::E4, occ),
            tables.bishop_attacks(Square::E4, occ) | tables.rook_attacks(Square::E4, occ)
        );
        assert_eq!(
            tables.attacks(PieceType::Knight, Square::E4, occ),
            tables.knight_attacks(Square::E4)
        );
    }

    #[test]
    fn zero_seeds_still_build() {
        let tables = AttackTables::with_seeds(MagicSeeds([0; 8]));
        let reference = AttackTables::global();
        let occ = Square::C6.as_set() | Square::E2.as_set() | Square::G4.as_set();
        for sq in Square::all() {
            assert_eq!(tables.rook_attacks(sq, occ), reference.rook_attacks(sq, occ));
            assert_eq!(tables.bishop_attacks(sq, occ), reference.bishop_attacks(sq, occ));
        }
    }

    #[test]
    fn construction_is_idempotent() {
        let a = AttackTables::new();
        let b = AttackTables::new();
        assert!(a == b);
        assert!(&a == AttackTables::global());
    }
}
