//! Draw rules: stalemate, the fifty-move clock, repetition, and bare
//! material.

use chess_core::{legal_moves, parse_uci_move, Color, Position};

// Stalemate

#[test]
fn stalemate_king_in_corner() {
    // Black king a8, white queen b6, white king c7: no moves, no check.
    let pos = Position::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(legal_moves(&pos).is_empty());
    assert!(!pos.in_check(Color::Black));
}

#[test]
fn stalemate_king_and_pawn_endgame() {
    let pos = Position::from_fen("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(legal_moves(&pos).is_empty());
    assert!(!pos.in_check(Color::Black));
}

#[test]
fn checkmate_is_not_stalemate() {
    // Scholar's mate: no moves, but the king is in check.
    let pos =
        Position::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")
            .unwrap();
    assert!(legal_moves(&pos).is_empty());
    assert!(pos.in_check(Color::Black));
}

// Fifty-move rule

#[test]
fn fifty_move_rule_triggers_at_exactly_100() {
    let drawn = Position::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 100 60").unwrap();
    assert!(drawn.is_fifty_move_draw());

    let not_yet = Position::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 99 60").unwrap();
    assert!(!not_yet.is_fifty_move_draw());
}

#[test]
fn fifty_move_clock_resets_on_pawn_move() {
    let mut pos = Position::from_fen("8/8/8/4k3/8/3K4/4P3/8 w - - 99 60").unwrap();
    let push = parse_uci_move(&pos, "e2e3").expect("pawn push is legal");
    pos.make_move(push);
    assert_eq!(pos.halfmove_clock, 0);
    assert!(!pos.is_fifty_move_draw());
}

// Threefold repetition

#[test]
fn knight_shuffle_repeats_three_times() {
    let mut pos = Position::startpos();
    // Ng1-f3 Ng8-f6 Nf3-g1 Nf6-g8, twice: the start position recurs
    // for the third time.
    for _ in 0..2 {
        for mv in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            assert!(!pos.is_repetition_draw());
            let parsed = parse_uci_move(&pos, mv).unwrap();
            pos.make_move(parsed);
        }
    }
    assert!(pos.is_repetition_draw());
}

#[test]
fn one_recurrence_is_not_a_draw() {
    let mut pos = Position::startpos();
    for mv in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        let parsed = parse_uci_move(&pos, mv).unwrap();
        pos.make_move(parsed);
    }
    // The start position has now occurred twice; that is not yet threefold.
    assert!(!pos.is_repetition_draw());
}

#[test]
fn repetition_counts_only_same_side_to_move() {
    let a = Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
        .unwrap();
    let b = Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1")
        .unwrap();
    assert_ne!(a.hash(), b.hash());
}

#[test]
fn unmake_rolls_the_repetition_state_back() {
    let mut pos = Position::startpos();
    let mut played = Vec::new();
    for _ in 0..2 {
        for mv in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let parsed = parse_uci_move(&pos, mv).unwrap();
            pos.make_move(parsed);
            played.push(parsed);
        }
    }
    assert!(pos.is_repetition_draw());
    let last = played.pop().unwrap();
    pos.unmake_move(last);
    assert!(!pos.is_repetition_draw());
}

// Insufficient material

#[test]
fn bare_kings_are_insufficient() {
    let pos = Position::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1").unwrap();
    assert!(pos.is_insufficient_material());
}

#[test]
fn lone_minor_is_insufficient() {
    for fen in [
        "8/8/8/4k3/8/4KB2/8/8 w - - 0 1",
        "8/8/8/4k3/8/4KN2/8/8 w - - 0 1",
        "8/8/4b3/4k3/8/4K3/8/8 w - - 0 1",
        "8/8/4n3/4k3/8/4K3/8/8 w - - 0 1",
    ] {
        let pos = Position::from_fen(fen).unwrap();
        assert!(pos.is_insufficient_material(), "{fen}");
    }
}

#[test]
fn same_shade_bishops_are_insufficient() {
    // Bishops on f8 and c1: both dark squares.
    let pos = Position::from_fen("5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1").unwrap();
    assert!(pos.is_insufficient_material());
}

#[test]
fn opposite_shade_bishops_are_sufficient() {
    // c8 is light, c1 is dark; mate constructions exist.
    let pos = Position::from_fen("2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1").unwrap();
    assert!(!pos.is_insufficient_material());
}

#[test]
fn pawns_rooks_and_queens_are_sufficient() {
    for fen in [
        "8/8/8/4k3/8/4K3/4P3/8 w - - 0 1",
        "8/8/8/4k3/8/4K3/8/4R3 w - - 0 1",
        "8/8/8/4k3/8/4K3/8/4Q3 w - - 0 1",
    ] {
        let pos = Position::from_fen(fen).unwrap();
        assert!(!pos.is_insufficient_material(), "{fen}");
    }
}

#[test]
fn two_knights_count_as_sufficient() {
    let pos = Position::from_fen("8/8/8/4k3/8/4K3/3NN3/8 w - - 0 1").unwrap();
    assert!(!pos.is_insufficient_material());
}
