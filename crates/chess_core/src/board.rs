//! Position representation and the make/unmake machinery.
//!
//! A `Position` keeps a mailbox and per-piece bitboards in lockstep, a
//! running Zobrist hash updated incrementally on every mutation, an undo
//! stack for make/unmake, and a hash history for repetition detection.

use thiserror::Error;

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::types::*;
use crate::zobrist::ZOBRIST;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Rejection reasons for FEN input. The position being mutated is left
/// untouched whenever one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("expected at least 4 FEN fields, got {0}")]
    MissingFields(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPlacement(String),

    #[error("invalid side to move: expected 'w' or 'b', got '{0}'")]
    InvalidSideToMove(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastling(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassant(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    #[error("each side needs exactly one king, got {white} white / {black} black")]
    BadKingCount { white: u32, black: u32 },
}

/// The four castling permissions packed into a 4-bit mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KINGSIDE: u8 = 1;
    pub const WHITE_QUEENSIDE: u8 = 2;
    pub const BLACK_KINGSIDE: u8 = 4;
    pub const BLACK_QUEENSIDE: u8 = 8;

    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline(always)]
    pub const fn mask(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    #[inline(always)]
    pub fn grant(&mut self, flags: u8) {
        self.0 |= flags;
    }

    #[inline(always)]
    pub fn revoke(&mut self, flags: u8) {
        self.0 &= !flags;
    }

    /// Clears whatever rights a move touching `from` and `to` destroys.
    /// Covers king moves, rook moves, and rook captures on the corner
    /// squares in one pass.
    fn update_for_move(&mut self, from: u8, to: u8) {
        for s in [from, to] {
            match s {
                E1 => self.revoke(Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE),
                A1 => self.revoke(Self::WHITE_QUEENSIDE),
                H1 => self.revoke(Self::WHITE_KINGSIDE),
                E8 => self.revoke(Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE),
                A8 => self.revoke(Self::BLACK_QUEENSIDE),
                H8 => self.revoke(Self::BLACK_KINGSIDE),
                _ => {}
            }
        }
    }
}

/// Per-piece occupancy, the bitboard half of the position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PieceSets {
    boards: [[Bitboard; 6]; 2],
}

impl PieceSets {
    #[inline(always)]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.boards[color.idx()][kind.idx()]
    }

    #[inline(always)]
    pub fn color(&self, color: Color) -> Bitboard {
        let side = &self.boards[color.idx()];
        side[0] | side[1] | side[2] | side[3] | side[4] | side[5]
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.color(Color::White) | self.color(Color::Black)
    }

    #[inline(always)]
    fn set(&mut self, pc: Piece, sq: u8) {
        self.boards[pc.color.idx()][pc.kind.idx()].set(sq);
    }

    #[inline(always)]
    fn clear(&mut self, pc: Piece, sq: u8) {
        self.boards[pc.color.idx()][pc.kind.idx()].clear(sq);
    }
}

/// Everything needed to roll one move back. Null moves store `Move::NONE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Undo {
    mv: Move,
    captured: Option<Piece>,
    castling: CastlingRights,
    en_passant: Option<u8>,
    halfmove_clock: u32,
    hash: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: [Option<Piece>; 64],
    pub bitboards: PieceSets,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    /// Target square of a possible en-passant capture.
    pub en_passant: Option<u8>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    hash: u64,
    undo_stack: Vec<Undo>,
    hash_history: Vec<u64>,
}

impl Position {
    /// A board with no pieces, white to move, no castling rights.
    pub fn empty() -> Self {
        let mut pos = Position {
            board: [None; 64],
            bitboards: PieceSets::default(),
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            undo_stack: Vec::new(),
            hash_history: Vec::new(),
        };
        pos.hash = pos.compute_hash();
        pos.hash_history.push(pos.hash);
        pos
    }

    pub fn startpos() -> Self {
        Self::from_fen(START_FEN).expect("start position FEN is valid")
    }

    /// Parses a six-field FEN. The two move counters may be omitted and
    /// default to 0 and 1. The hash is recomputed from scratch and the undo
    /// stack and hash history are reset.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::MissingFields(parts.len()));
        }

        let mut pos = Position {
            board: [None; 64],
            bitboards: PieceSets::default(),
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            undo_stack: Vec::new(),
            hash_history: Vec::new(),
        };

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as i8; // FEN lists rank 8 down to rank 1
            let mut file: i8 = 0;
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    if d == 0 || d > 8 {
                        return Err(FenError::InvalidPlacement(format!(
                            "bad empty-run digit '{ch}'"
                        )));
                    }
                    file += d as i8;
                } else {
                    let color = if ch.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let kind = match ch.to_ascii_lowercase() {
                        'p' => PieceKind::Pawn,
                        'n' => PieceKind::Knight,
                        'b' => PieceKind::Bishop,
                        'r' => PieceKind::Rook,
                        'q' => PieceKind::Queen,
                        'k' => PieceKind::King,
                        _ => {
                            return Err(FenError::InvalidPlacement(format!(
                                "invalid piece character '{ch}'"
                            )))
                        }
                    };
                    match sq(file, rank) {
                        Some(s) => pos.put_piece(Piece::new(color, kind), s),
                        None => {
                            return Err(FenError::InvalidPlacement(format!(
                                "rank {} overflows the board",
                                rank + 1
                            )))
                        }
                    }
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPlacement(format!(
                    "rank {} covers {} files, expected 8",
                    rank + 1,
                    file
                )));
            }
        }

        let white_kings = pos.bitboards.pieces(Color::White, PieceKind::King).popcount();
        let black_kings = pos.bitboards.pieces(Color::Black, PieceKind::King).popcount();
        if white_kings != 1 || black_kings != 1 {
            return Err(FenError::BadKingCount {
                white: white_kings,
                black: black_kings,
            });
        }

        pos.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSideToMove(other.to_string())),
        };

        if parts[2] != "-" {
            for c in parts[2].chars() {
                match c {
                    'K' => pos.castling.grant(CastlingRights::WHITE_KINGSIDE),
                    'Q' => pos.castling.grant(CastlingRights::WHITE_QUEENSIDE),
                    'k' => pos.castling.grant(CastlingRights::BLACK_KINGSIDE),
                    'q' => pos.castling.grant(CastlingRights::BLACK_QUEENSIDE),
                    _ => return Err(FenError::InvalidCastling(parts[2].to_string())),
                }
            }
        }

        if parts[3] != "-" {
            let ep = coord_to_sq(parts[3])
                .ok_or_else(|| FenError::InvalidEnPassant(parts[3].to_string()))?;
            // Only the squares behind a just-pushed pawn qualify.
            if rank_of(ep) != 2 && rank_of(ep) != 5 {
                return Err(FenError::InvalidEnPassant(parts[3].to_string()));
            }
            pos.en_passant = Some(ep);
        }

        if let Some(field) = parts.get(4) {
            pos.halfmove_clock = field
                .parse()
                .map_err(|_| FenError::InvalidHalfmoveClock(field.to_string()))?;
        }
        if let Some(field) = parts.get(5) {
            pos.fullmove_number = field
                .parse()
                .map_err(|_| FenError::InvalidFullmoveNumber(field.to_string()))?;
        }

        pos.hash = pos.compute_hash();
        pos.hash_history.push(pos.hash);
        Ok(pos)
    }

    /// Serializes the position back into the six-field FEN form.
    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.board[make_square(file, rank) as usize] {
                    None => empty += 1,
                    Some(pc) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        let ch = match pc.kind {
                            PieceKind::Pawn => 'p',
                            PieceKind::Knight => 'n',
                            PieceKind::Bishop => 'b',
                            PieceKind::Rook => 'r',
                            PieceKind::Queen => 'q',
                            PieceKind::King => 'k',
                        };
                        out.push(match pc.color {
                            Color::White => ch.to_ascii_uppercase(),
                            Color::Black => ch,
                        });
                    }
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        if self.castling == CastlingRights::NONE {
            out.push('-');
        } else {
            if self.castling.has(CastlingRights::WHITE_KINGSIDE) {
                out.push('K');
            }
            if self.castling.has(CastlingRights::WHITE_QUEENSIDE) {
                out.push('Q');
            }
            if self.castling.has(CastlingRights::BLACK_KINGSIDE) {
                out.push('k');
            }
            if self.castling.has(CastlingRights::BLACK_QUEENSIDE) {
                out.push('q');
            }
        }

        out.push(' ');
        match self.en_passant {
            Some(ep) => out.push_str(&sq_to_coord(ep)),
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.board[sq as usize]
    }

    /// Current Zobrist hash, maintained incrementally.
    #[inline(always)]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// One hash per played position, oldest first; the last entry is the
    /// current hash.
    pub fn hash_history(&self) -> &[u64] {
        &self.hash_history
    }

    pub fn king_sq(&self, c: Color) -> Option<u8> {
        self.bitboards.pieces(c, PieceKind::King).lsb()
    }

    /// Places a piece during setup; mailbox, bitboards and hash all update.
    fn put_piece(&mut self, pc: Piece, sq: u8) {
        self.add_piece(pc, sq);
    }

    #[inline(always)]
    fn add_piece(&mut self, pc: Piece, sq: u8) {
        debug_assert!(self.board[sq as usize].is_none(), "square already occupied");
        self.board[sq as usize] = Some(pc);
        self.bitboards.set(pc, sq);
        self.hash ^= ZOBRIST.piece_key(pc, sq);
    }

    #[inline(always)]
    fn remove_piece(&mut self, pc: Piece, sq: u8) {
        debug_assert_eq!(self.board[sq as usize], Some(pc), "removing wrong piece");
        self.board[sq as usize] = None;
        self.bitboards.clear(pc, sq);
        self.hash ^= ZOBRIST.piece_key(pc, sq);
    }

    /// True when any piece of `by` attacks `target` under the current
    /// occupancy.
    pub fn is_square_attacked(&self, target: u8, by: Color) -> bool {
        let sets = &self.bitboards;
        // A pawn of `by` attacks `target` exactly when a pawn of the other
        // color standing on `target` would attack the pawn's square.
        if !(pawn_attacks(target, by.other()) & sets.pieces(by, PieceKind::Pawn)).is_empty() {
            return true;
        }
        if !(knight_attacks(target) & sets.pieces(by, PieceKind::Knight)).is_empty() {
            return true;
        }
        if !(king_attacks(target) & sets.pieces(by, PieceKind::King)).is_empty() {
            return true;
        }

        let occupied = sets.occupied();
        let diagonal = sets.pieces(by, PieceKind::Bishop) | sets.pieces(by, PieceKind::Queen);
        if !(bishop_attacks(target, occupied) & diagonal).is_empty() {
            return true;
        }
        let straight = sets.pieces(by, PieceKind::Rook) | sets.pieces(by, PieceKind::Queen);
        if !(rook_attacks(target, occupied) & straight).is_empty() {
            return true;
        }
        false
    }

    pub fn in_check(&self, c: Color) -> bool {
        match self.king_sq(c) {
            Some(ksq) => self.is_square_attacked(ksq, c.other()),
            None => false,
        }
    }

    fn rook_castling_squares(to: u8) -> (u8, u8) {
        match to {
            G1 => (H1, F1),
            C1 => (A1, D1),
            G8 => (H8, F8),
            C8 => (A8, D8),
            _ => unreachable!("castle move to a non-castle square"),
        }
    }

    pub fn make_move(&mut self, mv: Move) {
        let from = mv.from();
        let to = mv.to();
        let moved = self.board[from as usize].expect("make_move: empty from-square");

        // For en passant the victim stands beside the destination, on the
        // mover's departure rank.
        let capture_sq = if mv.is_en_passant() {
            make_square(to % 8, from / 8)
        } else {
            to
        };
        let captured = self.board[capture_sq as usize];

        self.undo_stack.push(Undo {
            mv,
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        });

        if let Some(victim) = captured {
            self.remove_piece(victim, capture_sq);
        }

        self.remove_piece(moved, from);
        match mv.promo() {
            Some(kind) => self.add_piece(Piece::new(moved.color, kind), to),
            None => self.add_piece(moved, to),
        }

        if mv.is_castle() {
            let rook = Piece::new(moved.color, PieceKind::Rook);
            let (rook_from, rook_to) = Self::rook_castling_squares(to);
            self.remove_piece(rook, rook_from);
            self.add_piece(rook, rook_to);
        }

        // Castling rights only ever shrink; hash out the old mask, in the new.
        self.hash ^= ZOBRIST.castling_key(self.castling.mask());
        self.castling.update_for_move(from, to);
        self.hash ^= ZOBRIST.castling_key(self.castling.mask());

        if let Some(ep) = self.en_passant {
            self.hash ^= ZOBRIST.ep_key(ep % 8);
        }
        self.en_passant = None;
        if moved.kind == PieceKind::Pawn && (rank_of(to) - rank_of(from)).abs() == 2 {
            let ep = make_square(from % 8, ((rank_of(from) + rank_of(to)) / 2) as u8);
            self.en_passant = Some(ep);
            self.hash ^= ZOBRIST.ep_key(ep % 8);
        }

        if moved.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = self.side_to_move.other();
        self.hash ^= ZOBRIST.side_to_move;

        self.hash_history.push(self.hash);
    }

    /// Rolls back the most recent `make_move`. The position afterwards is
    /// bitwise identical to the one before the corresponding make,
    /// including hash, undo stack and hash history.
    pub fn unmake_move(&mut self, mv: Move) {
        let undo = self
            .undo_stack
            .pop()
            .expect("unmake_move without a matching make_move");
        debug_assert_eq!(undo.mv, mv, "unmake_move out of LIFO order");
        self.hash_history.pop();

        self.side_to_move = self.side_to_move.other();
        if self.side_to_move == Color::Black {
            self.fullmove_number -= 1;
        }
        let mover = self.side_to_move;

        let from = mv.from();
        let to = mv.to();

        if mv.is_castle() {
            let rook = Piece::new(mover, PieceKind::Rook);
            let (rook_from, rook_to) = Self::rook_castling_squares(to);
            self.remove_piece(rook, rook_to);
            self.add_piece(rook, rook_from);
        }

        let piece_on_to = self.board[to as usize].expect("unmake_move: empty to-square");
        self.remove_piece(piece_on_to, to);
        if mv.is_promotion() {
            self.add_piece(Piece::new(mover, PieceKind::Pawn), from);
        } else {
            self.add_piece(piece_on_to, from);
        }

        if let Some(victim) = undo.captured {
            let capture_sq = if mv.is_en_passant() {
                make_square(to % 8, from / 8)
            } else {
                to
            };
            self.add_piece(victim, capture_sq);
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
    }

    /// Passes the turn without moving. Only legal when the side to move is
    /// not in check.
    pub fn make_null(&mut self) {
        debug_assert!(
            !self.in_check(self.side_to_move),
            "null move while in check"
        );
        self.undo_stack.push(Undo {
            mv: Move::NONE,
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        });

        if let Some(ep) = self.en_passant {
            self.hash ^= ZOBRIST.ep_key(ep % 8);
            self.en_passant = None;
        }
        self.side_to_move = self.side_to_move.other();
        self.hash ^= ZOBRIST.side_to_move;
        self.hash_history.push(self.hash);
    }

    pub fn unmake_null(&mut self) {
        let undo = self
            .undo_stack
            .pop()
            .expect("unmake_null without a matching make_null");
        debug_assert!(undo.mv.is_none(), "unmake_null against a real move");
        self.hash_history.pop();

        self.side_to_move = self.side_to_move.other();
        self.en_passant = undo.en_passant;
        self.hash = undo.hash;
    }

    /// Hash recomputed from scratch; `hash()` must always agree with this.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for s in 0..64u8 {
            if let Some(pc) = self.board[s as usize] {
                hash ^= ZOBRIST.piece_key(pc, s);
            }
        }
        hash ^= ZOBRIST.castling_key(self.castling.mask());
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.ep_key(ep % 8);
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.side_to_move;
        }
        hash
    }

    /// Cross-checks the redundant state: mailbox vs. bitboards, king
    /// counts, and the incremental hash.
    pub fn is_consistent(&self) -> bool {
        for s in 0..64u8 {
            let on_board = self.board[s as usize];
            for color in [Color::White, Color::Black] {
                for kind in PieceKind::ALL {
                    let in_set = self.bitboards.pieces(color, kind).contains(s);
                    let expected = on_board == Some(Piece::new(color, kind));
                    if in_set != expected {
                        return false;
                    }
                }
            }
        }
        if self.bitboards.pieces(Color::White, PieceKind::King).popcount() != 1 {
            return false;
        }
        if self.bitboards.pieces(Color::Black, PieceKind::King).popcount() != 1 {
            return false;
        }
        self.hash == self.compute_hash()
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Threefold repetition: the current hash occurs at least three times
    /// among positions with the same side to move (stride two through the
    /// history).
    pub fn is_repetition_draw(&self) -> bool {
        // Eight reversible plies are the minimum for a threefold.
        if self.hash_history.len() < 9 {
            return false;
        }
        let mut count = 1;
        let mut i = self.hash_history.len() as isize - 3;
        while i >= 0 {
            if self.hash_history[i as usize] == self.hash {
                count += 1;
                if count >= 3 {
                    return true;
                }
            }
            i -= 2;
        }
        false
    }

    /// Draws by bare material: K vs K, K+minor vs K, and same-colored
    /// single bishops. Two knights can still stumble into a mate, so they
    /// count as sufficient.
    pub fn is_insufficient_material(&self) -> bool {
        let sets = &self.bitboards;
        for color in [Color::White, Color::Black] {
            if !sets.pieces(color, PieceKind::Pawn).is_empty()
                || !sets.pieces(color, PieceKind::Rook).is_empty()
                || !sets.pieces(color, PieceKind::Queen).is_empty()
            {
                return false;
            }
        }

        let white_knights = sets.pieces(Color::White, PieceKind::Knight).popcount();
        let black_knights = sets.pieces(Color::Black, PieceKind::Knight).popcount();
        let white_bishops = sets.pieces(Color::White, PieceKind::Bishop);
        let black_bishops = sets.pieces(Color::Black, PieceKind::Bishop);
        let minors =
            white_knights + black_knights + white_bishops.popcount() + black_bishops.popcount();

        if minors <= 1 {
            return true;
        }

        if white_knights == 0
            && black_knights == 0
            && white_bishops.popcount() == 1
            && black_bishops.popcount() == 1
        {
            let shade = |s: u8| (s / 8 + s % 8) % 2;
            if let (Some(w), Some(b)) = (white_bishops.lsb(), black_bishops.lsb()) {
                return shade(w) == shade(b);
            }
        }

        false
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
