//! Pseudo-legal and legal move generation.
//!
//! Pseudo-legal moves obey piece movement rules but may leave the mover's
//! own king attacked; the legal generator filters those out by playing each
//! move and checking the king.

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, queen_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::{CastlingRights, Position};
use crate::types::*;

/// Generate all legal moves, returning a freshly allocated vector.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut tmp = pos.clone();
    let mut out = Vec::with_capacity(64);
    legal_moves_into(&mut tmp, &mut out);
    out
}

/// Generate all legal moves into the provided buffer, reusing it across
/// calls. The position is restored before returning.
pub fn legal_moves_into(pos: &mut Position, out: &mut Vec<Move>) {
    pseudo_moves_into(pos, out);

    let mover = pos.side_to_move;
    out.retain(|&mv| {
        pos.make_move(mv);
        let illegal = pos.in_check(mover);
        pos.unmake_move(mv);
        !illegal
    });
}

/// Generate every pseudo-legal move for the side to move.
pub fn pseudo_moves_into(pos: &Position, out: &mut Vec<Move>) {
    out.clear();
    let us = pos.side_to_move;
    let our_pieces = pos.bitboards.color(us);
    let their_pieces = pos.bitboards.color(us.other());
    let occupied = pos.bitboards.occupied();
    let empty = !occupied;

    gen_pawn_moves(pos, us, their_pieces, empty, out);
    for kind in [PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen] {
        gen_piece_moves(pos, us, kind, our_pieces, their_pieces, occupied, false, out);
    }
    gen_king_moves(pos, us, our_pieces, their_pieces, false, out);
    gen_castling_moves(pos, us, occupied, out);
}

/// Generate the forcing subset: captures, en passant, and every promotion
/// (a quiet promotion is forcing too).
pub fn capture_moves_into(pos: &Position, out: &mut Vec<Move>) {
    out.clear();
    let us = pos.side_to_move;
    let our_pieces = pos.bitboards.color(us);
    let their_pieces = pos.bitboards.color(us.other());
    let occupied = pos.bitboards.occupied();

    gen_pawn_captures(pos, us, their_pieces, !occupied, out);
    for kind in [PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen] {
        gen_piece_moves(pos, us, kind, our_pieces, their_pieces, occupied, true, out);
    }
    gen_king_moves(pos, us, our_pieces, their_pieces, true, out);
}

type ShiftFn = fn(Bitboard) -> Bitboard;

struct PawnGeometry {
    push: ShiftFn,
    attack_west: ShiftFn,
    attack_east: ShiftFn,
    start_rank: Bitboard,
    promo_rank: Bitboard,
    double_rank: Bitboard,
    back: i8,
    back_west: i8,
    back_east: i8,
}

fn pawn_geometry(us: Color) -> PawnGeometry {
    match us {
        Color::White => PawnGeometry {
            push: Bitboard::north,
            attack_west: Bitboard::north_west,
            attack_east: Bitboard::north_east,
            start_rank: Bitboard::RANK_2,
            promo_rank: Bitboard::RANK_8,
            double_rank: Bitboard::RANK_4,
            back: -8,
            back_west: -7,
            back_east: -9,
        },
        Color::Black => PawnGeometry {
            push: Bitboard::south,
            attack_west: Bitboard::south_west,
            attack_east: Bitboard::south_east,
            start_rank: Bitboard::RANK_7,
            promo_rank: Bitboard::RANK_1,
            double_rank: Bitboard::RANK_5,
            back: 8,
            back_west: 9,
            back_east: 7,
        },
    }
}

fn push_promotions(from: u8, to: u8, is_capture: bool, out: &mut Vec<Move>) {
    for pk in [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ] {
        out.push(Move::promotion(from, to, pk, is_capture));
    }
}

fn gen_pawn_moves(
    pos: &Position,
    us: Color,
    their_pieces: Bitboard,
    empty: Bitboard,
    out: &mut Vec<Move>,
) {
    let pawns = pos.bitboards.pieces(us, PieceKind::Pawn);
    let geo = pawn_geometry(us);

    let single_push = (geo.push)(pawns) & empty;

    let mut quiet_push = single_push & !geo.promo_rank;
    while let Some(to) = quiet_push.pop_lsb() {
        out.push(Move::quiet((to as i8 + geo.back) as u8, to));
    }

    let mut promo_push = single_push & geo.promo_rank;
    while let Some(to) = promo_push.pop_lsb() {
        push_promotions((to as i8 + geo.back) as u8, to, false, out);
    }

    // A double push needs both squares in front of the starting rank free.
    let mut double_push = (geo.push)((geo.push)(pawns & geo.start_rank) & empty) & empty & geo.double_rank;
    while let Some(to) = double_push.pop_lsb() {
        out.push(Move::quiet((to as i8 + 2 * geo.back) as u8, to));
    }

    gen_pawn_captures_inner(pos, &geo, pawns, their_pieces, out);
}

/// Pawn part of the forcing generator: captures plus quiet promotions.
fn gen_pawn_captures(
    pos: &Position,
    us: Color,
    their_pieces: Bitboard,
    empty: Bitboard,
    out: &mut Vec<Move>,
) {
    let pawns = pos.bitboards.pieces(us, PieceKind::Pawn);
    let geo = pawn_geometry(us);

    let mut promo_push = (geo.push)(pawns) & empty & geo.promo_rank;
    while let Some(to) = promo_push.pop_lsb() {
        push_promotions((to as i8 + geo.back) as u8, to, false, out);
    }

    gen_pawn_captures_inner(pos, &geo, pawns, their_pieces, out);
}

fn gen_pawn_captures_inner(
    pos: &Position,
    geo: &PawnGeometry,
    pawns: Bitboard,
    their_pieces: Bitboard,
    out: &mut Vec<Move>,
) {
    for (attack, back) in [(geo.attack_west, geo.back_west), (geo.attack_east, geo.back_east)] {
        let hits = attack(pawns) & their_pieces;

        let mut plain = hits & !geo.promo_rank;
        while let Some(to) = plain.pop_lsb() {
            out.push(Move::capture((to as i8 + back) as u8, to));
        }

        let mut promos = hits & geo.promo_rank;
        while let Some(to) = promos.pop_lsb() {
            push_promotions((to as i8 + back) as u8, to, true, out);
        }

        if let Some(ep_sq) = pos.en_passant {
            if attack(pawns).contains(ep_sq) {
                out.push(Move::en_passant((ep_sq as i8 + back) as u8, ep_sq));
            }
        }
    }
}

/// Knight, bishop, rook and queen moves from the attack sets; with
/// `captures_only` the quiet targets are skipped.
#[allow(clippy::too_many_arguments)]
fn gen_piece_moves(
    pos: &Position,
    us: Color,
    kind: PieceKind,
    our_pieces: Bitboard,
    their_pieces: Bitboard,
    occupied: Bitboard,
    captures_only: bool,
    out: &mut Vec<Move>,
) {
    let mut pieces = pos.bitboards.pieces(us, kind);
    while let Some(from) = pieces.pop_lsb() {
        let attacks = match kind {
            PieceKind::Knight => knight_attacks(from),
            PieceKind::Bishop => bishop_attacks(from, occupied),
            PieceKind::Rook => rook_attacks(from, occupied),
            PieceKind::Queen => queen_attacks(from, occupied),
            _ => unreachable!("pawn and king moves are generated separately"),
        } & !our_pieces;

        let mut captures = attacks & their_pieces;
        while let Some(to) = captures.pop_lsb() {
            out.push(Move::capture(from, to));
        }
        if !captures_only {
            let mut quiets = attacks & !their_pieces;
            while let Some(to) = quiets.pop_lsb() {
                out.push(Move::quiet(from, to));
            }
        }
    }
}

fn gen_king_moves(
    pos: &Position,
    us: Color,
    our_pieces: Bitboard,
    their_pieces: Bitboard,
    captures_only: bool,
    out: &mut Vec<Move>,
) {
    let mut kings = pos.bitboards.pieces(us, PieceKind::King);
    while let Some(from) = kings.pop_lsb() {
        let attacks = king_attacks(from) & !our_pieces;
        let mut captures = attacks & their_pieces;
        while let Some(to) = captures.pop_lsb() {
            out.push(Move::capture(from, to));
        }
        if !captures_only {
            let mut quiets = attacks & !their_pieces;
            while let Some(to) = quiets.pop_lsb() {
                out.push(Move::quiet(from, to));
            }
        }
    }
}

/// Castling: the king must not be in check, every square it crosses
/// (destination included) must be unattacked, and the squares between king
/// and rook must be empty.
fn gen_castling_moves(pos: &Position, us: Color, occupied: Bitboard, out: &mut Vec<Move>) {
    if pos.in_check(us) {
        return;
    }
    let enemy = us.other();

    // (right, king from/to, empty-squares mask, squares the king crosses)
    let lanes: [(u8, u8, u8, u64, [u8; 2]); 2] = match us {
        Color::White => [
            (CastlingRights::WHITE_KINGSIDE, E1, G1, 0x60, [F1, G1]),
            (CastlingRights::WHITE_QUEENSIDE, E1, C1, 0x0E, [D1, C1]),
        ],
        Color::Black => [
            (
                CastlingRights::BLACK_KINGSIDE,
                E8,
                G8,
                0x6000_0000_0000_0000,
                [F8, G8],
            ),
            (
                CastlingRights::BLACK_QUEENSIDE,
                E8,
                C8,
                0x0E00_0000_0000_0000,
                [D8, C8],
            ),
        ],
    };

    for (right, from, to, between, crossed) in lanes {
        if !pos.castling.has(right) {
            continue;
        }
        if !(occupied & Bitboard(between)).is_empty() {
            continue;
        }
        if crossed.iter().any(|&s| pos.is_square_attacked(s, enemy)) {
            continue;
        }
        out.push(Move::castle(from, to));
    }
}
