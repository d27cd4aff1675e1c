//! Perft suite over the standard reference positions.
//!
//! Node counts are the published values for these positions; any deviation
//! means the move generator or make/unmake is wrong.

use rayon::prelude::*;

use chess_core::{perft, Position};
use std::time::Instant;

struct PerftCase {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(u8, u64)],
}

const CASES: &[PerftCase] = &[
    PerftCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197_281), (5, 4_865_609)],
    },
    PerftCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depths: &[(1, 48), (2, 2039), (3, 97_862)],
    },
    PerftCase {
        name: "rook endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depths: &[(1, 14), (2, 191), (3, 2812), (4, 43_238)],
    },
    PerftCase {
        name: "promotions",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        depths: &[(1, 6), (2, 264), (3, 9467)],
    },
    PerftCase {
        name: "middlegame",
        fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        depths: &[(1, 44), (2, 1486), (3, 62_379)],
    },
];

#[test]
fn perft_reference_positions() {
    CASES.par_iter().for_each(|case| {
        let start = Instant::now();
        let mut total = 0u64;
        for &(depth, expected) in case.depths {
            let mut pos = Position::from_fen(case.fen).expect("reference FEN parses");
            let got = perft(&mut pos, depth);
            assert_eq!(
                got, expected,
                "{} depth {}: expected {}, got {}",
                case.name, depth, expected, got
            );
            total += got;
        }
        let elapsed = start.elapsed();
        println!(
            "{:<14} {:>10} nodes in {:.3?} ({:.1} Mn/s)",
            case.name,
            total,
            elapsed,
            (total as f64 / 1_000_000.0) / elapsed.as_secs_f64().max(1e-9)
        );
    });
}

#[test]
fn perft_leaves_the_position_unchanged() {
    let mut pos =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    let before = pos.clone();
    perft(&mut pos, 3);
    assert_eq!(pos, before);
}
