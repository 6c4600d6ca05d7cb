pub mod movegen;
mod validation;

use std::fmt::{self, Debug, Display, Formatter};

use crate::{
    chess::{
        attacks::AttackTables,
        chessmove::Move,
        fen::Fen,
        piece::{Colour, Piece, PieceType},
        piecelayout::PieceLayout,
        squareset::SquareSet,
        types::{CastlingRights, CastlingSide, File, Rank, Square},
    },
    errors::{FenParseError, MoveParseError},
};

/// The part of a position that is recomputed, rather than carried over,
/// by every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct State {
    castling_rights: CastlingRights,
    ep_square: Option<Square>,
    rule50: u32,
    /// Enemy pieces giving check to the side to move.
    checkers: SquareSet,
    /// Pieces of either colour that alone stand between a king and an enemy slider.
    blockers_for_king: [SquareSet; 2],
    /// Sliders pinning an enemy piece to the enemy king, by slider colour.
    pinners: [SquareSet; 2],
    /// Squares from which each piece type of the side to move would check the enemy king.
    check_squares: [SquareSet; 6],
    /// The piece taken by the last move, if any.
    captured: Option<Piece>,
}

/// A chess position, with check and pin information kept up to date after
/// every move.
///
/// There is no undo: copy the position before branching.
#[derive(Clone)]
pub struct Position<'t> {
    tables: &'t AttackTables,
    mailbox: [Option<Piece>; 64],
    layout: PieceLayout,
    /// Rights lost when a piece moves from or to each square.
    castling_mask: [CastlingRights; 64],
    castling_rooks: [Option<Square>; 4],
    castling_paths: [SquareSet; 4],
    side: Colour,
    /// Half-moves since the start of the game.
    game_ply: usize,
    state: State,
}

impl Debug for Position<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_string())
            .field("checkers", &self.state.checkers)
            .field("blockers_for_king", &self.state.blockers_for_king)
            .field("pinners", &self.state.pinners)
            .field("captured", &self.state.captured)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Position<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.mailbox == other.mailbox
            && self.layout == other.layout
            && self.castling_mask == other.castling_mask
            && self.castling_rooks == other.castling_rooks
            && self.castling_paths == other.castling_paths
            && self.side == other.side
            && self.game_ply == other.game_ply
            && self.state == other.state
    }
}

impl Eq for Position<'_> {}

impl Position<'static> {
    /// Reads a FEN string, filling in any missing trailing fields, and uses
    /// the shared attack tables.
    pub fn from_fen(fen: &str) -> Result<Self, FenParseError> {
        Self::from_fen_with(fen, AttackTables::global())
    }

    pub fn startpos() -> Self {
        match Self::from_fen(Self::STARTING_FEN) {
            Ok(pos) => pos,
            Err(e) => unreachable!("STARTING_FEN is broken: {e}"),
        }
    }
}

impl Default for Position<'static> {
    fn default() -> Self {
        Self::startpos()
    }
}

impl<'t> Position<'t> {
    pub const STARTING_FEN: &'static str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    pub fn from_fen_with(fen: &str, tables: &'t AttackTables) -> Result<Self, FenParseError> {
        let parsed = Fen::parse_relaxed(fen)?;
        Ok(Self::set(&parsed, tables))
    }

    /// Builds a position from a parsed FEN.
    pub fn set(fen: &Fen, tables: &'t AttackTables) -> Self {
        let black = usize::from(fen.turn == Colour::Black);
        let mut pos = Self {
            tables,
            mailbox: [None; 64],
            layout: fen.board,
            castling_mask: [CastlingRights::NONE; 64],
            castling_rooks: [None; 4],
            castling_paths: [SquareSet::EMPTY; 4],
            side: fen.turn,
            game_ply: (fen.fullmove.get() - 1).saturating_mul(2).saturating_add(black),
            state: State {
                ep_square: fen.ep,
                rule50: fen.halfmove,
                ..State::default()
            },
        };

        fen.board.visit_pieces(|sq, piece| pos.mailbox[sq] = Some(piece));

        for right in fen.castling.iter() {
            if let Some(rook_from) = fen.castling_rooks[right.index()] {
                pos.set_castling_right(right.colour(), rook_from);
            }
        }

        // an en passant square is only kept behind a pushed enemy pawn that
        // one of our pawns could capture.
        if let Some(ep) = pos.state.ep_square {
            let pushed_past = ep.rank() == Rank::Six.relative_to(pos.side)
                && pos.mailbox[ep].is_none()
                && pos.mailbox[ep.shift(-pos.side.pawn_push())]
                    == Some(Piece::new(!pos.side, PieceType::Pawn));
            let attackers = tables.pawn_attacks(!pos.side, ep) & pos.pieces_of(pos.side, PieceType::Pawn);
            if !pushed_past {
                log::warn!("dropping en passant square {ep}, as no pawn was pushed past it");
                pos.state.ep_square = None;
            } else if attackers.is_empty() {
                log::warn!("dropping en passant square {ep}, as no pawn can capture onto it");
                pos.state.ep_square = None;
            }
        }

        pos.set_state();
        pos
    }

    /// Replaces this position with the one described by `fen`.
    /// On error, the position is left untouched.
    pub fn set_from_fen(&mut self, fen: &str) -> Result<(), FenParseError> {
        let parsed = Fen::parse_relaxed(fen)?;
        *self = Self::set(&parsed, self.tables);
        Ok(())
    }

    fn set_castling_right(&mut self, colour: Colour, rook_from: Square) {
        let king_from = self.king_sq(colour);
        let side = if king_from < rook_from {
            CastlingSide::King
        } else {
            CastlingSide::Queen
        };
        let right = CastlingRights::single(colour, side);

        self.state.castling_rights |= right;
        self.castling_mask[king_from] |= right;
        self.castling_mask[rook_from] |= right;
        self.castling_rooks[right.index()] = Some(rook_from);

        let king_to = side.king_to().relative_to(colour);
        let rook_to = side.rook_to().relative_to(colour);

        self.castling_paths[right.index()] = (self.tables.between(rook_from, rook_to)
            | rook_to.as_set()
            | self.tables.between(king_from, king_to)
            | king_to.as_set())
            - king_from.as_set()
            - rook_from.as_set();
    }

    /// Derives checkers, pins and check squares from scratch.
    fn set_state(&mut self) {
        let king = self.king_sq(self.side);
        self.state.checkers =
            self.attackers_to(king, self.occupied()) & self.layout.colours[!self.side];
        self.set_check_info();
    }

    fn set_check_info(&mut self) {
        self.update_slider_blockers(Colour::White);
        self.update_slider_blockers(Colour::Black);

        let them = !self.side;
        let ksq = self.king_sq(them);
        let occupied = self.occupied();
        let tables = self.tables;

        let bishop = tables.bishop_attacks(ksq, occupied);
        let rook = tables.rook_attacks(ksq, occupied);
        self.state.check_squares = [
            tables.pawn_attacks(them, ksq),
            tables.knight_attacks(ksq),
            bishop,
            rook,
            bishop | rook,
            SquareSet::EMPTY,
        ];
    }

    /// Finds the pieces shielding `colour`'s king from enemy sliders, and
    /// the sliders that pin them.
    fn update_slider_blockers(&mut self, colour: Colour) {
        let ksq = self.king_sq(colour);
        let tables = self.tables;

        self.state.blockers_for_king[colour] = SquareSet::EMPTY;
        self.state.pinners[!colour] = SquareSet::EMPTY;

        let snipers = (tables.rook_attacks(ksq, SquareSet::EMPTY) & self.layout.orthogonal_sliders()
            | tables.bishop_attacks(ksq, SquareSet::EMPTY) & self.layout.diagonal_sliders())
            & self.layout.colours[!colour];
        let occupancy = self.occupied() ^ snipers;

        for sniper in snipers {
            let b = tables.between(ksq, sniper) & occupancy;
            if b.one() {
                self.state.blockers_for_king[colour] |= b;
                if b.intersects(self.layout.colours[colour]) {
                    self.state.pinners[!colour] |= sniper.as_set();
                }
            }
        }
    }

    pub const fn tables(&self) -> &'t AttackTables {
        self.tables
    }

    pub const fn layout(&self) -> &PieceLayout {
        &self.layout
    }

    pub const fn side_to_move(&self) -> Colour {
        self.side
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq]
    }

    pub fn pieces(&self, pt: PieceType) -> SquareSet {
        self.layout.pieces[pt]
    }

    pub fn colour(&self, colour: Colour) -> SquareSet {
        self.layout.colours[colour]
    }

    pub fn pieces_of(&self, colour: Colour, pt: PieceType) -> SquareSet {
        self.layout.of(colour, pt)
    }

    pub fn occupied(&self) -> SquareSet {
        self.layout.occupied()
    }

    pub fn king_sq(&self, colour: Colour) -> Square {
        let king = self.layout.king_sq(colour);
        debug_assert!(king.is_some(), "no {colour} king in {self:?}");
        // a position without a king cannot be constructed from a FEN.
        king.unwrap_or_default()
    }

    pub const fn checkers(&self) -> SquareSet {
        self.state.checkers
    }

    pub const fn in_check(&self) -> bool {
        self.state.checkers.non_empty()
    }

    pub fn blockers_for_king(&self, colour: Colour) -> SquareSet {
        self.state.blockers_for_king[colour]
    }

    /// Sliders of `colour` that pin an enemy piece against the enemy king.
    pub fn pinners(&self, colour: Colour) -> SquareSet {
        self.state.pinners[colour]
    }

    pub fn check_squares(&self, pt: PieceType) -> SquareSet {
        self.state.check_squares[pt]
    }

    pub const fn ep_square(&self) -> Option<Square> {
        self.state.ep_square
    }

    pub const fn castling_rights(&self) -> CastlingRights {
        self.state.castling_rights
    }

    /// The rook a single castling right belongs to, while the right is held.
    pub fn castling_rook_square(&self, right: CastlingRights) -> Option<Square> {
        if self.can_castle(right) {
            self.castling_rooks[right.index()]
        } else {
            None
        }
    }

    /// Squares that must be empty for a single castling right to be used.
    pub fn castling_path(&self, right: CastlingRights) -> SquareSet {
        self.castling_paths[right.index()]
    }

    pub fn castling_impeded(&self, right: CastlingRights) -> bool {
        self.castling_path(right).intersects(self.occupied())
    }

    pub const fn can_castle(&self, rights: CastlingRights) -> bool {
        self.state.castling_rights.intersects(rights)
    }

    pub const fn rule50(&self) -> u32 {
        self.state.rule50
    }

    pub const fn game_ply(&self) -> usize {
        self.game_ply
    }

    pub fn fullmove_number(&self) -> usize {
        let black = usize::from(self.side == Colour::Black);
        1 + (self.game_ply - black) / 2
    }

    /// The piece taken by the move that produced this position.
    pub const fn captured_piece(&self) -> Option<Piece> {
        self.state.captured
    }

    /// All pieces attacking `sq`, sliders seeing through `occupied`.
    pub fn attackers_to(&self, sq: Square, occupied: SquareSet) -> SquareSet {
        self.layout.attackers_to(self.tables, sq, occupied)
    }

    fn put_piece(&mut self, sq: Square, piece: Piece) {
        self.mailbox[sq] = Some(piece);
        self.layout.set_piece_at(sq, piece);
    }

    fn remove_piece(&mut self, sq: Square, piece: Piece) {
        self.mailbox[sq] = None;
        self.layout.clear_piece_at(sq, piece);
    }

    fn move_piece(&mut self, from: Square, to: Square, piece: Piece) {
        self.mailbox[from] = None;
        self.mailbox[to] = Some(piece);
        self.layout.move_piece(from, to, piece);
    }

    /// Where the king and rook of a castling move end up.
    fn castling_destinations(colour: Colour, king_from: Square, rook_from: Square) -> (Square, Square) {
        let side = if rook_from > king_from {
            CastlingSide::King
        } else {
            CastlingSide::Queen
        };
        (
            side.king_to().relative_to(colour),
            side.rook_to().relative_to(colour),
        )
    }

    /// The square a moving piece finally stands on. For castling this is the
    /// king's destination, not the rook square stored in the move.
    pub fn landing_square(&self, m: Move) -> Square {
        if m.is_castle() {
            Self::castling_destinations(self.side, m.from(), m.to()).0
        } else {
            m.to()
        }
    }

    /// Tests whether a pseudo-legal move leaves our king safe.
    pub fn legal(&self, m: Move) -> bool {
        let tables = self.tables;
        let us = self.side;
        let from = m.from();
        let to = m.to();
        let ksq = self.king_sq(us);
        let them = self.colour(!us);

        debug_assert_eq!(self.piece_at(from).map(Piece::colour), Some(us));

        if m.is_ep() {
            // the captured pawn and ours both leave their squares at once,
            // which can uncover a slider on our king.
            let capsq = to.shift(-us.pawn_push());
            let occupied = (self.occupied() ^ from.as_set() ^ capsq.as_set()) | to.as_set();
            return (tables.rook_attacks(ksq, occupied) & self.layout.orthogonal_sliders() & them)
                .is_empty()
                && (tables.bishop_attacks(ksq, occupied) & self.layout.diagonal_sliders() & them)
                    .is_empty();
        }

        if m.is_castle() {
            // the king's own square is covered by evasion generation.
            let (king_to, _) = Self::castling_destinations(us, from, to);
            let path = (tables.between(from, king_to) | king_to.as_set()) - from.as_set();
            let occupied = self.occupied();
            if path
                .iter()
                .any(|sq| self.attackers_to(sq, occupied).intersects(them))
            {
                return false;
            }
            // a rook shielding its own king cannot leave.
            return !self.blockers_for_king(us).contains_square(to);
        }

        if self.piece_at(from).map(Piece::piece_type) == Some(PieceType::King) {
            let occupied = self.occupied() ^ from.as_set();
            return !self.attackers_to(to, occupied).intersects(them);
        }

        !self.blockers_for_king(us).contains_square(from) || tables.aligned(from, to, ksq)
    }

    /// Tests whether a legal move checks the enemy king.
    pub fn gives_check(&self, m: Move) -> bool {
        let tables = self.tables;
        let us = self.side;
        let from = m.from();
        let to = m.to();
        let their_king = self.king_sq(!us);

        let Some(moved) = self.piece_at(from) else {
            return false;
        };

        // direct check.
        if self.check_squares(moved.piece_type()).contains_square(to) {
            return true;
        }

        // discovered check.
        if self.blockers_for_king(!us).contains_square(from) {
            return !tables.aligned(from, to, their_king) || m.is_castle();
        }

        let occupied = self.occupied();
        let ours = self.colour(us);

        if let Some(promo) = m.promotion_type() {
            return tables
                .attacks(promo, to, occupied ^ from.as_set())
                .contains_square(their_king);
        }

        if m.is_ep() {
            let capsq = Square::from_rank_file(from.rank(), to.file());
            let b = (occupied ^ from.as_set() ^ capsq.as_set()) | to.as_set();
            return (tables.rook_attacks(their_king, b) & self.layout.orthogonal_sliders() & ours)
                .non_empty()
                || (tables.bishop_attacks(their_king, b) & self.layout.diagonal_sliders() & ours)
                    .non_empty();
        }

        if m.is_castle() {
            let (king_to, rook_to) = Self::castling_destinations(us, from, to);
            let after = (occupied - from.as_set() - to.as_set()) | king_to.as_set() | rook_to.as_set();
            return tables.rook_attacks(rook_to, after).contains_square(their_king);
        }

        false
    }

    /// Applies a legal move.
    pub fn do_move(&mut self, m: Move) {
        let gives_check = self.gives_check(m);
        let tables = self.tables;
        let us = self.side;
        let them = !us;
        let from = m.from();
        let to = m.to();

        let Some(piece) = self.piece_at(from) else {
            debug_assert!(false, "no piece on {from} for {m} in {self}");
            return;
        };

        self.game_ply = self.game_ply.saturating_add(1);
        self.state.rule50 = self.state.rule50.saturating_add(1);

        let capsq = if m.is_ep() {
            to.shift(-us.pawn_push())
        } else {
            to
        };
        // castling is encoded as the king taking its own rook.
        let captured = if m.is_castle() {
            None
        } else {
            self.piece_at(capsq)
        };
        self.state.captured = captured;

        if m.is_castle() {
            let (king_to, rook_to) = Self::castling_destinations(us, from, to);
            let rook = Piece::new(us, PieceType::Rook);
            self.remove_piece(from, piece);
            self.remove_piece(to, rook);
            self.put_piece(king_to, piece);
            self.put_piece(rook_to, rook);
        }

        if let Some(captured) = captured {
            debug_assert_eq!(captured.colour(), them);
            self.remove_piece(capsq, captured);
            self.state.rule50 = 0;
        }

        self.state.ep_square = None;

        self.state.castling_rights -= self.castling_mask[from] | self.castling_mask[to];

        if !m.is_castle() {
            self.move_piece(from, to, piece);
        }

        if piece.piece_type() == PieceType::Pawn {
            if from.inner() ^ to.inner() == 16 {
                let passed = from.shift(us.pawn_push());
                if tables
                    .pawn_attacks(us, passed)
                    .intersects(self.pieces_of(them, PieceType::Pawn))
                {
                    self.state.ep_square = Some(passed);
                }
            } else if let Some(promo) = m.promotion_type() {
                self.remove_piece(to, piece);
                self.put_piece(to, Piece::new(us, promo));
            }
            self.state.rule50 = 0;
        }

        self.state.checkers = if gives_check {
            self.attackers_to(self.king_sq(them), self.occupied()) & self.colour(us)
        } else {
            SquareSet::EMPTY
        };

        self.side = them;
        self.set_check_info();
    }

    /// Finds the legal move written as `text` in long algebraic notation.
    /// Castling may be written either as the king taking its rook, or as
    /// the king's two-square step.
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        use MoveParseError::{
            IllegalMove, InvalidFromSquareFile, InvalidFromSquareRank, InvalidLength,
            InvalidPromotionPiece, InvalidToSquareFile, InvalidToSquareRank,
        };
        let bytes = text.as_bytes();
        if !(4..=5).contains(&bytes.len()) {
            return Err(InvalidLength(bytes.len()));
        }
        let from_file = File::from_index(bytes[0].wrapping_sub(b'a'))
            .ok_or(InvalidFromSquareFile(bytes[0] as char))?;
        let from_rank = Rank::from_index(bytes[1].wrapping_sub(b'1'))
            .ok_or(InvalidFromSquareRank(bytes[1] as char))?;
        let to_file = File::from_index(bytes[2].wrapping_sub(b'a'))
            .ok_or(InvalidToSquareFile(bytes[2] as char))?;
        let to_rank = Rank::from_index(bytes[3].wrapping_sub(b'1'))
            .ok_or(InvalidToSquareRank(bytes[3] as char))?;
        let promo = match bytes.get(4) {
            Some(&c) => Some(
                PieceType::from_promo_char(c as char).ok_or(InvalidPromotionPiece(c as char))?,
            ),
            None => None,
        };

        let from = Square::from_rank_file(from_rank, from_file);
        let to = Square::from_rank_file(to_rank, to_file);

        let legal = self.legal_moves();
        legal
            .iter()
            .copied()
            .find(|m| m.from() == from && m.to() == to && m.promotion_type() == promo)
            .or_else(|| {
                legal.iter().copied().find(|&m| {
                    m.is_castle() && promo.is_none() && m.from() == from && self.landing_square(m) == to
                })
            })
            .ok_or_else(|| IllegalMove(text.to_string()))
    }

    /// Plays a sequence of moves, stopping at the first that cannot be
    /// parsed or is illegal.
    pub fn play<'a>(&mut self, moves: impl IntoIterator<Item = &'a str>) -> Result<(), MoveParseError> {
        for text in moves {
            let m = self.parse_move(text)?;
            self.do_move(m);
        }
        Ok(())
    }
}

impl Display for Position<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut counter = 0;
        for rank in Rank::all().rev() {
            for file in File::all() {
                let sq = Square::from_rank_file(rank, file);
                if let Some(piece) = self.mailbox[sq] {
                    if counter != 0 {
                        write!(f, "{counter}")?;
                    }
                    counter = 0;
                    write!(f, "{piece}")?;
                } else {
                    counter += 1;
                }
            }
            if counter != 0 {
                write!(f, "{counter}")?;
            }
            counter = 0;
            if rank != Rank::One {
                write!(f, "/")?;
            }
        }

        write!(f, " {} ", self.side.char())?;

        if self.state.castling_rights.is_empty() {
            write!(f, "-")?;
        } else {
            for right in self.state.castling_rights.iter() {
                let Some(rook) = self.castling_rooks[right.index()] else {
                    continue;
                };
                let c = rook.file().char();
                match right.colour() {
                    Colour::White => write!(f, "{}", c.to_ascii_uppercase())?,
                    Colour::Black => write!(f, "{c}")?,
                }
            }
        }

        if let Some(ep_sq) = self.state.ep_square {
            write!(f, " {ep_sq}")?;
        } else {
            write!(f, " -")?;
        }
        write!(f, " {}", self.state.rule50)?;
        write!(f, " {}", self.fullmove_number())?;

        Ok(())
    }
}

impl fmt::UpperHex for Position<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for rank in Rank::all().rev() {
            write!(f, "{} ", rank as u8 + 1)?;
            for file in File::all() {
                let sq = Square::from_rank_file(rank, file);
                if let Some(piece) = self.mailbox[sq] {
                    write!(f, "{piece} ")?;
                } else {
                    write!(f, ". ")?;
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "  a b c d e f g h")?;
        write!(f, "FEN: {self}")?;

        Ok(())
    }
}
