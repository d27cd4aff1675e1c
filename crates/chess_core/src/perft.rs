//! Perft: exhaustive legal-move tree node counts.
//!
//! The canonical correctness check for the move generator and the
//! make/unmake machinery; expected counts for the standard positions are
//! in `tests/perft_tests.rs`.

use crate::{board::Position, movegen::legal_moves_into, types::Move};

/// Number of leaf nodes of the legal-move tree at `depth`.
pub fn perft(pos: &mut Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    fn inner(pos: &mut Position, depth: u8, layers: &mut [Vec<Move>]) -> u64 {
        if depth == 0 {
            return 1;
        }

        let (buf, rest) = layers
            .split_first_mut()
            .expect("perft needs one buffer per remaining ply");

        buf.clear();
        legal_moves_into(pos, buf);

        if depth == 1 {
            return buf.len() as u64;
        }

        let mut nodes = 0u64;
        for mv in buf.iter().copied() {
            pos.make_move(mv);
            nodes += inner(pos, depth - 1, rest);
            pos.unmake_move(mv);
        }
        nodes
    }

    let mut layers = vec![Vec::with_capacity(64); depth as usize];
    inner(pos, depth, &mut layers[..])
}

/// Per-root-move node counts, handy for diffing against another engine.
pub fn perft_divide(pos: &mut Position, depth: u8) -> Vec<(Move, u64)> {
    let mut moves = Vec::with_capacity(64);
    legal_moves_into(pos, &mut moves);

    let mut results = Vec::with_capacity(moves.len());
    for mv in moves {
        pos.make_move(mv);
        let nodes = perft(pos, depth.saturating_sub(1));
        pos.unmake_move(mv);
        results.push((mv, nodes));
    }
    results
}
