use std::fmt::Display;

use crate::chess::{
    attacks::AttackTables,
    piece::{Colour, Piece, PieceType},
    squareset::SquareSet,
    types::{File, Rank, Square},
};

/// Piece placement as one square-set per piece type and one per colour.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PieceLayout {
    pub pieces: [SquareSet; 6],
    pub colours: [SquareSet; 2],
}

impl PieceLayout {
    pub fn occupied(&self) -> SquareSet {
        self.colours[Colour::White] | self.colours[Colour::Black]
    }

    pub fn empty(&self) -> SquareSet {
        !self.occupied()
    }

    pub fn move_piece(&mut self, from: Square, to: Square, piece: Piece) {
        let from_to_bb = from.as_set() | to.as_set();
        self.pieces[piece.piece_type()] ^= from_to_bb;
        self.colours[piece.colour()] ^= from_to_bb;
    }

    pub fn set_piece_at(&mut self, sq: Square, piece: Piece) {
        let sq_bb = sq.as_set();
        self.pieces[piece.piece_type()] |= sq_bb;
        self.colours[piece.colour()] |= sq_bb;
    }

    pub fn clear_piece_at(&mut self, sq: Square, piece: Piece) {
        let sq_bb = sq.as_set();
        self.pieces[piece.piece_type()] &= !sq_bb;
        self.colours[piece.colour()] &= !sq_bb;
    }

    pub fn piece_bb(&self, piece: Piece) -> SquareSet {
        self.pieces[piece.piece_type()] & self.colours[piece.colour()]
    }

    pub fn of(&self, colour: Colour, piece_type: PieceType) -> SquareSet {
        self.pieces[piece_type] & self.colours[colour]
    }

    /// Bishops and queens.
    pub fn diagonal_sliders(&self) -> SquareSet {
        self.pieces[PieceType::Bishop] | self.pieces[PieceType::Queen]
    }

    /// Rooks and queens.
    pub fn orthogonal_sliders(&self) -> SquareSet {
        self.pieces[PieceType::Rook] | self.pieces[PieceType::Queen]
    }

    pub fn king_sq(&self, colour: Colour) -> Option<Square> {
        self.of(colour, PieceType::King).first()
    }

    /// Pieces of both colours attacking `sq`, with sliders seeing through
    /// `occupied` rather than the real board.
    pub fn attackers_to(
        &self,
        tables: &AttackTables,
        sq: Square,
        occupied: SquareSet,
    ) -> SquareSet {
        use PieceType::{King, Knight, Pawn};

        // a white pawn attacks `sq` iff a black pawn on `sq` would attack it.
        let pawns = tables.pawn_attacks(Colour::Black, sq) & self.of(Colour::White, Pawn)
            | tables.pawn_attacks(Colour::White, sq) & self.of(Colour::Black, Pawn);
        pawns
            | tables.knight_attacks(sq) & self.pieces[Knight]
            | tables.bishop_attacks(sq, occupied) & self.diagonal_sliders()
            | tables.rook_attacks(sq, occupied) & self.orthogonal_sliders()
            | tables.king_attacks(sq) & self.pieces[King]
    }

    /// Whether any piece of `side` attacks `sq` on the current board.
    pub fn sq_attacked_by(&self, tables: &AttackTables, sq: Square, side: Colour) -> bool {
        (self.attackers_to(tables, sq, self.occupied()) & self.colours[side]).non_empty()
    }

    /// Slow lookup through the sets, for cross-checking the mailbox.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        let colour = Colour::all().find(|&c| self.colours[c].contains_square(sq))?;
        PieceType::all()
            .find(|&pt| self.pieces[pt].contains_square(sq))
            .map(|pt| Piece::new(colour, pt))
    }

    pub fn any_bbs_overlapping(&self) -> bool {
        if self.colours[0].intersects(self.colours[1]) {
            return true;
        }
        for i in 0..self.pieces.len() {
            for j in i + 1..self.pieces.len() {
                if self.pieces[i].intersects(self.pieces[j]) {
                    return true;
                }
            }
        }
        false
    }

    pub fn visit_pieces(&self, mut callback: impl FnMut(Square, Piece)) {
        for colour in Colour::all() {
            for piece_type in PieceType::all() {
                let piece = Piece::new(colour, piece_type);
                for sq in self.of(colour, piece_type) {
                    callback(sq, piece);
                }
            }
        }
    }
}

impl Display for PieceLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in Rank::all().rev() {
            for file in File::all() {
                let sq = Square::from_rank_file(rank, file);
                if let Some(piece) = self.piece_at(sq) {
                    write!(f, " {}", piece.char())?;
                } else {
                    write!(f, " .")?;
                }
            }
            writeln!(f)?;
        }
        if self.any_bbs_overlapping() {
            writeln!(f, "WARNING: Some square-sets are overlapping")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_of(pieces: &[(Square, Piece)]) -> PieceLayout {
        let mut layout = PieceLayout::default();
        for &(sq, piece) in pieces {
            layout.set_piece_at(sq, piece);
        }
        layout
    }

    #[test]
    fn set_move_clear() {
        let mut layout = layout_of(&[(Square::E2, Piece::WP), (Square::E8, Piece::BK)]);
        assert_eq!(layout.piece_at(Square::E2), Some(Piece::WP));
        layout.move_piece(Square::E2, Square::E4, Piece::WP);
        assert_eq!(layout.piece_at(Square::E2), None);
        assert_eq!(layout.piece_at(Square::E4), Some(Piece::WP));
        layout.clear_piece_at(Square::E4, Piece::WP);
        assert_eq!(layout.occupied(), Square::E8.as_set());
        assert_eq!(layout.king_sq(Colour::Black), Some(Square::E8));
        assert_eq!(layout.king_sq(Colour::White), None);
        assert!(!layout.any_bbs_overlapping());
    }

    #[test]
    fn attackers_of_both_colours() {
        let tables = AttackTables::global();
        let layout = layout_of(&[
            (Square::D3, Piece::WP),
            (Square::F5, Piece::BP),
            (Square::C5, Piece::BN),
            (Square::E1, Piece::WR),
            (Square::H1, Piece::BB),
            (Square::E2, Piece::WK),
        ]);
        let attackers = layout.attackers_to(tables, Square::E4, layout.occupied());
        // the rook on e1 is blocked by its own king.
        let expected = Square::D3.as_set()
            | Square::F5.as_set()
            | Square::C5.as_set()
            | Square::H1.as_set();
        assert_eq!(attackers, expected);
        assert!(layout.sq_attacked_by(tables, Square::E4, Colour::White));
        assert!(!layout.sq_attacked_by(tables, Square::E3, Colour::Black));

        // seeing through the king opens the file.
        let occupied = layout.occupied() - Square::E2.as_set();
        let through = layout.attackers_to(tables, Square::E4, occupied);
        assert!(through.contains_square(Square::E1));
    }
}
