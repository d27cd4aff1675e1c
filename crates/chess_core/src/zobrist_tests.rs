use super::*;
use crate::types::{Color, PieceKind};

#[test]
fn keys_are_unique() {
    let mut seen = std::collections::HashSet::new();

    for color in 0..2 {
        for kind in 0..6 {
            for sq in 0..64 {
                let key = ZOBRIST.pieces[color][kind][sq];
                assert!(seen.insert(key), "duplicate piece key");
            }
        }
    }

    assert!(seen.insert(ZOBRIST.side_to_move), "side key collision");

    // Mask 0 is deliberately zero; the other 15 must be fresh.
    assert_eq!(ZOBRIST.castling[0], 0);
    for mask in 1..16 {
        assert!(seen.insert(ZOBRIST.castling[mask]), "castling key collision");
    }

    for file in 0..8 {
        assert!(
            seen.insert(ZOBRIST.en_passant[file]),
            "en passant key collision"
        );
    }
}

#[test]
fn piece_keys_differ_per_square() {
    let pawn = Piece::new(Color::White, PieceKind::Pawn);
    assert_ne!(ZOBRIST.piece_key(pawn, 0), ZOBRIST.piece_key(pawn, 1));

    let black_pawn = Piece::new(Color::Black, PieceKind::Pawn);
    assert_ne!(ZOBRIST.piece_key(pawn, 0), ZOBRIST.piece_key(black_pawn, 0));
}

#[test]
fn castling_key_masks_to_four_bits() {
    assert_eq!(ZOBRIST.castling_key(0b1111), ZOBRIST.castling[15]);
    assert_eq!(ZOBRIST.castling_key(0), 0);
}
