//! Magic-bitboard lookup tables for sliding pieces.
//!
//! For every square we take the *relevance mask*, the squares whose
//! occupancy can change where a slider on that square stops, and search for a
//! multiplier that hashes every subset of the mask into a dense table index
//! without two subsets with different attack sets landing in the same slot.

use crate::{
    chess::{squareset::SquareSet, types::Square},
    rng::XorShiftState,
};

/// The two kinds of slider that have their own tables. Queens are the union.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Slider {
    Bishop,
    Rook,
}

impl Slider {
    /// (file, rank) steps for each of the four rays.
    const fn directions(self) -> [(i8, i8); 4] {
        match self {
            Self::Bishop => [(1, 1), (-1, 1), (1, -1), (-1, -1)],
            Self::Rook => [(0, 1), (0, -1), (1, 0), (-1, 0)],
        }
    }

    /// Ground-truth attacks by tracing each ray until it leaves the board or
    /// hits an occupied square, which is included.
    pub fn ray_attacks(self, square: Square, occupied: SquareSet) -> SquareSet {
        #![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let mut attacks = SquareSet::EMPTY;
        for (df, dr) in self.directions() {
            let mut file = square.file() as i8 + df;
            let mut rank = square.rank() as i8 + dr;
            while (0..8).contains(&file) && (0..8).contains(&rank) {
                let Some(sq) = Square::new((rank * 8 + file) as u8) else {
                    break;
                };
                attacks = attacks.add_square(sq);
                if occupied.contains_square(sq) {
                    break;
                }
                file += df;
                rank += dr;
            }
        }
        attacks
    }

    /// The squares whose occupancy matters for a slider on `square`: its
    /// empty-board reach with the board edges removed, except for the edges
    /// the square itself stands on.
    pub fn relevance_mask(self, square: Square) -> SquareSet {
        let edges = (SquareSet::BACK_RANKS - square.rank().as_set())
            | ((SquareSet::FILE_A | SquareSet::FILE_H) - square.file().as_set());
        self.ray_attacks(square, SquareSet::EMPTY) - edges
    }
}

/// Per-rank seeds for the candidate generator. With these the search
/// settles within a few thousand candidates for every square.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MagicSeeds(pub [u64; 8]);

impl Default for MagicSeeds {
    fn default() -> Self {
        Self([728, 10316, 55013, 32803, 12281, 15100, 16645, 255])
    }
}

/// Everything needed to turn an occupancy into a table index for one square.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MagicEntry {
    pub mask: SquareSet,
    pub magic: u64,
    pub shift: u32,
    /// Start of this square's slice of the shared attack buffer.
    pub offset: usize,
}

impl MagicEntry {
    #[allow(clippy::cast_possible_truncation)]
    pub const fn index(&self, occupied: SquareSet) -> usize {
        let relevant = occupied.intersection(self.mask).inner();
        (relevant.wrapping_mul(self.magic) >> self.shift) as usize
    }

    /// Number of slots this square owns.
    pub const fn size(&self) -> usize {
        1 << (64 - self.shift)
    }
}

/// Attack lookup for one slider type over all 64 squares.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SlidingTable {
    entries: [MagicEntry; 64],
    attacks: Vec<SquareSet>,
}

impl SlidingTable {
    pub fn new(slider: Slider, seeds: &MagicSeeds) -> Self {
        let mut entries = [MagicEntry::default(); 64];
        let mut attacks = Vec::new();

        // scratch space, sized for the largest (rook corner) mask.
        let mut occupancy = Vec::with_capacity(4096);
        let mut reference = Vec::with_capacity(4096);
        let mut epoch = vec![0u32; 4096];
        let mut attempt = 0u32;

        for square in Square::all() {
            let mask = slider.relevance_mask(square);
            let shift = 64 - mask.count();
            let offset = attacks.len();

            occupancy.clear();
            reference.clear();
            let mut subset = SquareSet::EMPTY;
            loop {
                occupancy.push(subset);
                reference.push(slider.ray_attacks(square, subset));
                subset = SquareSet::from_inner(subset.inner().wrapping_sub(mask.inner())) & mask;
                if subset.is_empty() {
                    break;
                }
            }

            let mut entry = MagicEntry {
                mask,
                magic: 0,
                shift,
                offset,
            };
            attacks.resize(offset + entry.size(), SquareSet::EMPTY);
            let slots = &mut attacks[offset..];

            let mut rng = XorShiftState::new(seeds.0[square.rank()]);
            'search: loop {
                entry.magic = loop {
                    let candidate = rng.random_few_bits();
                    if (candidate.wrapping_mul(mask.inner()) >> 56).count_ones() >= 6 {
                        break candidate;
                    }
                };

                // a slot written during an earlier attempt holds stale data,
                // which the epoch check tells apart from a real collision.
                attempt += 1;
                for (&occ, &truth) in occupancy.iter().zip(&reference) {
                    let idx = entry.index(occ);
                    if epoch[idx] < attempt {
                        epoch[idx] = attempt;
                        slots[idx] = truth;
                    } else if slots[idx] != truth {
                        continue 'search;
                    }
                }
                break;
            }

            entries[square] = entry;
        }

        Self { entries, attacks }
    }

    pub fn attacks(&self, square: Square, occupied: SquareSet) -> SquareSet {
        let entry = &self.entries[square];
        self.attacks[entry.offset + entry.index(occupied)]
    }

    pub fn entry(&self, square: Square) -> &MagicEntry {
        &self.entries[square]
    }

    /// Total number of attack slots across all squares.
    pub fn len(&self) -> usize {
        self.attacks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_masks_skip_edges() {
        // a rook in the corner sees 14 squares, of which the far ends are irrelevant.
        assert_eq!(Slider::Rook.relevance_mask(Square::A1).count(), 12);
        assert_eq!(Slider::Rook.relevance_mask(Square::E4).count(), 10);
        assert_eq!(Slider::Bishop.relevance_mask(Square::A1).count(), 6);
        assert_eq!(Slider::Bishop.relevance_mask(Square::E4).count(), 9);
        // a rook on the edge keeps its own edge, minus the corners.
        let mask = Slider::Rook.relevance_mask(Square::A4);
        assert!(mask.contains_square(Square::A2));
        assert!(!mask.contains_square(Square::A1));
        assert!(!mask.contains_square(Square::H4));
    }

    #[test]
    fn ray_attacks_stop_at_blockers() {
        let blockers = Square::E6.as_set() | Square::C4.as_set();
        let attacks = Slider::Rook.ray_attacks(Square::E4, blockers);
        assert!(attacks.contains_square(Square::E6));
        assert!(!attacks.contains_square(Square::E7));
        assert!(attacks.contains_square(Square::C4));
        assert!(!attacks.contains_square(Square::B4));
        assert!(attacks.contains_square(Square::H4));
        assert!(attacks.contains_square(Square::E1));
        assert_eq!(attacks.count(), 2 + 2 + 3 + 3);
    }

    #[test]
    fn table_sizes() {
        let seeds = MagicSeeds::default();
        let bishops = SlidingTable::new(Slider::Bishop, &seeds);
        let rooks = SlidingTable::new(Slider::Rook, &seeds);
        assert_eq!(bishops.len(), 5248);
        assert_eq!(rooks.len(), 102_400);
    }

    #[test]
    fn rook_lookup_matches_ray_trace() {
        let table = SlidingTable::new(Slider::Rook, &MagicSeeds::default());
        for sq in Square::all() {
            let mask = table.entry(sq).mask;
            let mut subset = SquareSet::EMPTY;
            loop {
                let naive = Slider::Rook.ray_attacks(sq, subset);
                let fast = table.attacks(sq, subset);
                assert_eq!(naive, fast, "naive:\n{naive}\nfast:\n{fast}\nblockers were\n{subset}");
                subset = SquareSet::from_inner(subset.inner().wrapping_sub(mask.inner())) & mask;
                if subset.is_empty() {
                    break;
                }
            }
        }
    }

    #[test]
    fn bishop_lookup_matches_ray_trace() {
        let table = SlidingTable::new(Slider::Bishop, &MagicSeeds::default());
        for sq in Square::all() {
            let mask = table.entry(sq).mask;
            let mut subset = SquareSet::EMPTY;
            loop {
                let naive = Slider::Bishop.ray_attacks(sq, subset);
                let fast = table.attacks(sq, subset);
                assert_eq!(naive, fast, "naive:\n{naive}\nfast:\n{fast}\nblockers were\n{subset}");
                subset = SquareSet::from_inner(subset.inner().wrapping_sub(mask.inner())) & mask;
                if subset.is_empty() {
                    break;
                }
            }
        }
    }

    #[test]
    fn irrelevant_occupancy_is_ignored() {
        let table = SlidingTable::new(Slider::Rook, &MagicSeeds::default());
        // pieces on the far edges and off the rook's lines change nothing.
        let noise = Square::A8.as_set() | Square::H1.as_set() | Square::B2.as_set();
        assert_eq!(
            table.attacks(Square::A1, noise),
            table.attacks(Square::A1, SquareSet::EMPTY)
        );
    }
}
