//! Move-generation microbenchmark: repeated legal-move generation over a
//! fixed position set, for profiling the generator in isolation.
//!
//! Usage:
//!   cargo run --release --example movegen_bench -p chess_core -- [iterations]

use chess_core::{legal_moves_into, Position};
use std::env;
use std::time::Instant;

const POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
];

fn main() {
    let iterations: u32 = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(100_000);

    let mut positions: Vec<Position> = POSITIONS
        .iter()
        .map(|fen| Position::from_fen(fen).expect("valid FEN"))
        .collect();

    let mut buf = Vec::with_capacity(64);
    let mut generated = 0u64;

    let start = Instant::now();
    for _ in 0..iterations {
        for pos in positions.iter_mut() {
            legal_moves_into(pos, &mut buf);
            generated += buf.len() as u64;
        }
    }
    let elapsed = start.elapsed();

    println!(
        "{generated} moves in {elapsed:.3?} ({:.1} M moves/s)",
        generated as f64 / 1_000_000.0 / elapsed.as_secs_f64().max(1e-9)
    );
}
