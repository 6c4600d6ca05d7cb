use crate::{
    chess::{
        piece::{Colour, Piece, PieceType},
        position::Position,
        types::{Rank, Square},
    },
    errors::PositionValidityError,
};

impl Position<'_> {
    /// Checks that the position is coherent, and also that the side which
    /// just moved did not leave its king in check.
    pub fn check_validity(&self) -> Result<(), PositionValidityError> {
        self.check_coherence()?;

        let them = !self.side;
        let their_king = self.king_sq(them);
        if self.layout.sq_attacked_by(self.tables, their_king, self.side) {
            return Err(format!(
                "{them} king on {their_king} is in check, but it is {} to move",
                self.side
            ));
        }

        Ok(())
    }

    /// Checks that the redundant parts of the position agree with each other.
    /// Chess legality is not considered.
    #[allow(clippy::too_many_lines)]
    pub fn check_coherence(&self) -> Result<(), PositionValidityError> {
        // check square-set / piece array coherency
        for sq in Square::all() {
            let piece = self.mailbox[sq];
            if self.layout.piece_at(sq) != piece {
                return Err(format!(
                    "square-set / piece array coherency corrupt: expected square {} to be '{:?}' but was '{:?}'",
                    sq,
                    piece,
                    self.layout.piece_at(sq)
                ));
            }
        }

        if self.layout.any_bbs_overlapping() {
            return Err("square-sets overlap".to_string());
        }

        // check there are the correct number of kings for each side
        for king in [Piece::WK, Piece::BK] {
            let count = self.layout.piece_bb(king).count();
            if count != 1 {
                return Err(format!(
                    "{} king count is corrupt: expected 1, got {count}",
                    king.colour()
                ));
            }
        }

        if let Some(ep) = self.state.ep_square {
            let expected = Rank::Six.relative_to(self.side);
            if ep.rank() != expected {
                return Err(format!(
                    "en passant square is corrupt: expected a square on {expected:?}, got {ep} ({:?})",
                    ep.rank()
                ));
            }
            if self.mailbox[ep].is_some() {
                return Err(format!("en passant square {ep} is occupied"));
            }
            let pushed = ep.shift(-self.side.pawn_push());
            if self.mailbox[pushed] != Some(Piece::new(!self.side, PieceType::Pawn)) {
                return Err(format!(
                    "en passant square {ep} has no enemy pawn in front of it on {pushed}"
                ));
            }
        }

        for right in self.state.castling_rights.iter() {
            let colour = right.colour();
            let Some(rook) = self.castling_rooks[right.index()] else {
                return Err(format!("castling right {right:?} has no rook square"));
            };
            if self.mailbox[rook] != Some(Piece::new(colour, PieceType::Rook)) {
                return Err(format!(
                    "castling right {right:?} refers to {rook}, which holds {:?}",
                    self.mailbox[rook]
                ));
            }
            let back_rank = Rank::One.relative_to(colour);
            if self.king_sq(colour).rank() != back_rank || rook.rank() != back_rank {
                return Err(format!(
                    "castling right {right:?} held, but the king or rook has left {back_rank:?}"
                ));
            }
        }

        // everything derived from the pieces must match a fresh derivation.
        let mut fresh = self.clone();
        fresh.set_state();
        if fresh.state.checkers != self.state.checkers {
            return Err(format!(
                "checkers are corrupt: expected {:?}, got {:?}",
                fresh.state.checkers, self.state.checkers
            ));
        }
        for colour in Colour::all() {
            if fresh.state.blockers_for_king[colour] != self.state.blockers_for_king[colour]
                || fresh.state.pinners[colour] != self.state.pinners[colour]
            {
                return Err(format!("{colour} pin information is corrupt"));
            }
        }
        if fresh.state.check_squares != self.state.check_squares {
            return Err("check squares are corrupt".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::chess::{position::Position, types::Square};

    #[test]
    fn fresh_positions_are_valid() {
        for fen in [
            Position::STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3P4/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.check_validity(), Ok(()));
        }
    }

    #[test]
    fn side_not_to_move_in_check() {
        // white to move, but the black king is attacked by the rook.
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/K3R3 w - - 0 1").unwrap();
        assert!(pos.check_validity().is_err());
        assert_eq!(pos.check_coherence(), Ok(()));
    }

    #[test]
    fn corrupted_mailbox_is_caught() {
        let mut pos = Position::startpos();
        pos.mailbox[Square::E4] = pos.mailbox[Square::E2];
        assert!(pos.check_coherence().is_err());
        assert!(pos.check_validity().is_err());
    }
}
