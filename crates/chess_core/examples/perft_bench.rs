//! Perft throughput driver for profiling.
//!
//! Usage:
//!   cargo run --release --example perft_bench -p chess_core -- [depth] [fen]
//!
//! With no FEN it runs the whole reference suite at the given depth
//! (default 5); with a FEN it times that single position, which is the
//! mode to use with cargo-flamegraph.

use chess_core::{perft, Position};
use std::env;
use std::time::Instant;

const TEST_POSITIONS: &[(&str, &str)] = &[
    (
        "Starting position",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ),
    (
        "Kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ),
    ("Rook endgame", "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"),
    (
        "Promotions",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    ),
    (
        "Middlegame",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ),
];

fn main() {
    let args: Vec<String> = env::args().collect();
    let depth: u8 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(5);

    match args.get(2) {
        Some(fen) => run_single(fen, depth),
        None => run_suite(depth),
    }
}

fn run_single(fen: &str, depth: u8) {
    let mut pos = Position::from_fen(fen).expect("valid FEN");

    println!("Position: {fen}");
    println!("Depth: {depth}");

    // Warm-up pass so the timed run starts hot.
    if depth > 2 {
        let _ = perft(&mut pos, depth - 2);
    }

    let start = Instant::now();
    let nodes = perft(&mut pos, depth);
    let elapsed = start.elapsed();

    println!("Nodes: {nodes}");
    println!("Time: {elapsed:.3?}");
    println!("NPS: {:.0}", nodes as f64 / elapsed.as_secs_f64().max(1e-9));
}

fn run_suite(depth: u8) {
    println!("=== Perft benchmark, depth {depth} ===");

    let mut total_nodes = 0u64;
    let mut total_time = std::time::Duration::ZERO;

    for (name, fen) in TEST_POSITIONS {
        let mut pos = Position::from_fen(fen).expect("valid FEN");

        let start = Instant::now();
        let nodes = perft(&mut pos, depth);
        let elapsed = start.elapsed();

        total_nodes += nodes;
        total_time += elapsed;

        println!(
            "{name:.<24} {nodes:>12} nodes in {elapsed:>8.3?} ({:>10.0} nps)",
            nodes as f64 / elapsed.as_secs_f64().max(1e-9)
        );
    }

    println!(
        "TOTAL: {total_nodes} nodes in {total_time:.3?} ({:.0} nps)",
        total_nodes as f64 / total_time.as_secs_f64().max(1e-9)
    );
}
