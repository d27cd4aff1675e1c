use super::*;

#[test]
fn knight_attack_counts() {
    // Central knight reaches all 8 targets, corner knights only 2.
    assert_eq!(knight_attacks(28).popcount(), 8);

    let a1 = knight_attacks(0);
    assert_eq!(a1.popcount(), 2);
    assert!(a1.contains(10)); // c2
    assert!(a1.contains(17)); // b3

    assert_eq!(knight_attacks(7).popcount(), 2);
}

#[test]
fn king_attack_counts() {
    assert_eq!(king_attacks(28).popcount(), 8);
    assert_eq!(king_attacks(0).popcount(), 3);
    assert_eq!(king_attacks(63).popcount(), 3);
    assert_eq!(king_attacks(4).popcount(), 5); // e1
}

#[test]
fn pawn_attack_squares() {
    let e4_white = pawn_attacks(28, Color::White);
    assert_eq!(e4_white.popcount(), 2);
    assert!(e4_white.contains(35)); // d5
    assert!(e4_white.contains(37)); // f5

    // Edge pawn only attacks inward.
    let a2_white = pawn_attacks(8, Color::White);
    assert_eq!(a2_white.popcount(), 1);
    assert!(a2_white.contains(17)); // b3

    let e5_black = pawn_attacks(36, Color::Black);
    assert!(e5_black.contains(27)); // d4
    assert!(e5_black.contains(29)); // f4
}

#[test]
fn slider_attacks_empty_board() {
    assert_eq!(rook_attacks(28, Bitboard::EMPTY).popcount(), 14);
    assert_eq!(bishop_attacks(28, Bitboard::EMPTY).popcount(), 13);
    assert_eq!(queen_attacks(28, Bitboard::EMPTY).popcount(), 27);
    // Corner bishop sees one long diagonal.
    assert_eq!(bishop_attacks(0, Bitboard::EMPTY).popcount(), 7);
}

#[test]
fn rook_stops_at_first_blocker() {
    // Rook a1, blocker a4: a2/a3 open, a4 capturable, a5+ hidden.
    let occupied = Bitboard::from_square(24);
    let attacks = rook_attacks(0, occupied);
    assert!(attacks.contains(8));
    assert!(attacks.contains(16));
    assert!(attacks.contains(24));
    assert!(!attacks.contains(32));
    assert!(attacks.contains(1));
    assert!(attacks.contains(7));
}

#[test]
fn bishop_stops_at_first_blocker_both_directions() {
    // Bishop e4; blockers on g6 (up-right) and c2 (down-left).
    let occupied = Bitboard::from_square(46) | Bitboard::from_square(10);
    let attacks = bishop_attacks(28, occupied);
    assert!(attacks.contains(37)); // f5
    assert!(attacks.contains(46)); // g6, the blocker itself
    assert!(!attacks.contains(55)); // h7, beyond it
    assert!(attacks.contains(19)); // d3
    assert!(attacks.contains(10)); // c2, the blocker itself
    assert!(!attacks.contains(1)); // b1, beyond it
}

#[test]
fn slider_blocked_on_all_sides() {
    // Rook d4 boxed in by neighbors: exactly the four adjacent squares.
    let occupied = Bitboard::from_square(26)
        | Bitboard::from_square(28)
        | Bitboard::from_square(19)
        | Bitboard::from_square(35);
    let attacks = rook_attacks(27, occupied);
    assert_eq!(attacks.popcount(), 4);
}
