//! Iterative-deepening alpha-beta search with PVS windows, quiescence,
//! and a transposition table.

use chess_core::{
    capture_moves_into, legal_moves, legal_moves_into, Move, PieceKind, Position, SearchInfo,
    SearchLimits, SearchResult, TimeControl,
};

use crate::eval::evaluate;
use crate::tt::{Bound, TranspositionTable};

/// Mate score at the root; mate-in-n scores count down from here so
/// shorter mates always win the comparison.
pub const MATE: i32 = 30_000;

/// Scores beyond this are mate scores and carry a distance-to-mate.
const MATE_BOUND: i32 = MATE - 512;

const MAX_DEPTH: u8 = 64;

/// MVV-LVA piece weights, kings priced so a king "attacker" always sorts
/// last among equal victims.
const ORDER_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 10_000];

pub struct Searcher {
    tt: TranspositionTable,
    nodes: u64,
    seldepth: u8,
    stopped: bool,
    tc: TimeControl,
}

impl Searcher {
    pub fn new() -> Self {
        Searcher {
            tt: TranspositionTable::new(),
            nodes: 0,
            seldepth: 0,
            stopped: false,
            tc: TimeControl::default(),
        }
    }

    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    pub fn resize_tt_mb(&mut self, mb: usize) {
        self.tt = TranspositionTable::with_mb(mb);
    }

    /// Iterative deepening driver. Reports each completed depth through
    /// `on_info`; when the stop flag trips mid-iteration the partial
    /// iteration is discarded and the previous depth's move stands.
    pub fn think(
        &mut self,
        pos: &Position,
        limits: &SearchLimits,
        on_info: &mut dyn FnMut(&SearchInfo),
    ) -> SearchResult {
        limits.start();
        self.tc = limits.time_control.clone();
        self.nodes = 0;
        self.stopped = false;

        let mut root = pos.clone();
        let max_depth = limits.depth.min(MAX_DEPTH);

        let mut result = SearchResult {
            best_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
            stopped: false,
            pv: Vec::new(),
        };

        for depth in 1..=max_depth {
            self.seldepth = 0;
            match self.root_search(&mut root, depth) {
                Some((best, score)) => {
                    result.best_move = Some(best);
                    result.score = score;
                    result.depth = depth;
                    result.pv = self.extract_pv(&root, depth);
                    if result.pv.first() != Some(&best) {
                        // The root TT slot was evicted; fall back to the
                        // move we actually picked.
                        result.pv = vec![best];
                    }
                    on_info(&SearchInfo {
                        depth,
                        seldepth: self.seldepth,
                        score_cp: score,
                        nodes: self.nodes,
                        time: self.tc.elapsed(),
                        pv: result.pv.clone(),
                    });
                }
                None => {
                    if self.stopped {
                        result.stopped = true;
                    } else {
                        // No legal moves at the root.
                        result.score = if root.in_check(root.side_to_move) {
                            -MATE
                        } else {
                            0
                        };
                    }
                    break;
                }
            }
            if depth < max_depth && self.tc.check_time() {
                result.stopped = true;
                break;
            }
        }

        result.nodes = self.nodes;
        result
    }

    /// Full-window search of the root moves for one iteration. Returns
    /// `None` when there are no legal moves or when the iteration was cut
    /// short by the stop flag.
    fn root_search(&mut self, pos: &mut Position, depth: u8) -> Option<(Move, i32)> {
        self.nodes += 1;

        let mut moves = Vec::with_capacity(64);
        legal_moves_into(pos, &mut moves);
        if moves.is_empty() {
            return None;
        }

        let hash = pos.hash();
        let tt_move = self
            .tt
            .probe(hash)
            .map(|e| e.best_move)
            .unwrap_or(Move::NONE);
        order_moves(pos, &mut moves, tt_move);

        let beta = MATE;
        let mut alpha = -MATE;
        let mut best = moves[0];
        let mut best_score = -MATE;

        for (i, &mv) in moves.iter().enumerate() {
            pos.make_move(mv);
            let score = if i == 0 {
                -self.alpha_beta(pos, depth as i32 - 1, 1, -beta, -alpha)
            } else {
                let zw = -self.alpha_beta(pos, depth as i32 - 1, 1, -alpha - 1, -alpha);
                if zw > alpha && zw < beta {
                    -self.alpha_beta(pos, depth as i32 - 1, 1, -beta, -alpha)
                } else {
                    zw
                }
            };
            pos.unmake_move(mv);

            if self.stopped {
                return None;
            }
            if score > best_score {
                best_score = score;
                best = mv;
                if score > alpha {
                    alpha = score;
                }
            }
        }

        self.tt
            .store(hash, best, score_to_tt(best_score, 0), depth as i8, Bound::Exact);
        Some((best, best_score))
    }

    /// Negamax alpha-beta with PVS windows. `ply` is the distance from the
    /// root; mate scores are adjusted by it so shorter mates score higher.
    fn alpha_beta(
        &mut self,
        pos: &mut Position,
        depth: i32,
        ply: u8,
        mut alpha: i32,
        beta: i32,
    ) -> i32 {
        if self.stopped {
            return 0;
        }

        self.nodes += 1;
        if ply > self.seldepth {
            self.seldepth = ply;
        }
        if self.nodes % TimeControl::CHECK_INTERVAL == 0 && self.tc.check_time() {
            self.stopped = true;
            return 0;
        }

        if pos.is_fifty_move_draw() || pos.is_repetition_draw() {
            return 0;
        }

        let hash = pos.hash();
        let alpha_in = alpha;
        let mut tt_move = Move::NONE;
        if let Some(entry) = self.tt.probe(hash) {
            tt_move = entry.best_move;
            if entry.depth as i32 >= depth {
                let score = score_from_tt(entry.score as i32, ply);
                match entry.bound {
                    Bound::Exact => return score,
                    Bound::Lower if score >= beta => return score,
                    Bound::Upper if score <= alpha => return score,
                    _ => {}
                }
            }
        }

        if depth <= 0 {
            return self.quiescence(pos, ply, alpha, beta);
        }

        let mut moves = Vec::with_capacity(64);
        legal_moves_into(pos, &mut moves);
        if moves.is_empty() {
            return if pos.in_check(pos.side_to_move) {
                -MATE + ply as i32
            } else {
                0
            };
        }

        order_moves(pos, &mut moves, tt_move);

        let mut best_move = Move::NONE;
        let mut best_score = -MATE;
        for (i, &mv) in moves.iter().enumerate() {
            pos.make_move(mv);
            let score = if i == 0 {
                -self.alpha_beta(pos, depth - 1, ply.saturating_add(1), -beta, -alpha)
            } else {
                let zw =
                    -self.alpha_beta(pos, depth - 1, ply.saturating_add(1), -alpha - 1, -alpha);
                if zw > alpha && zw < beta {
                    -self.alpha_beta(pos, depth - 1, ply.saturating_add(1), -beta, -alpha)
                } else {
                    zw
                }
            };
            pos.unmake_move(mv);

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if score > alpha {
                    alpha = score;
                    if score >= beta {
                        self.tt.store(
                            hash,
                            mv,
                            score_to_tt(score, ply),
                            depth as i8,
                            Bound::Lower,
                        );
                        return score;
                    }
                }
            }
        }

        let bound = if best_score > alpha_in {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt
            .store(hash, best_move, score_to_tt(best_score, ply), depth as i8, bound);
        best_score
    }

    /// Captures-only extension past the horizon. Terminates because every
    /// recursion removes a piece; promotions are searched too since they
    /// are forcing.
    fn quiescence(&mut self, pos: &mut Position, ply: u8, mut alpha: i32, beta: i32) -> i32 {
        if self.stopped {
            return 0;
        }

        self.nodes += 1;
        if ply > self.seldepth {
            self.seldepth = ply;
        }
        if self.nodes % TimeControl::CHECK_INTERVAL == 0 && self.tc.check_time() {
            self.stopped = true;
            return 0;
        }

        let stand_pat = evaluate(pos);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut moves = Vec::with_capacity(32);
        capture_moves_into(pos, &mut moves);
        moves.sort_by_key(|&mv| std::cmp::Reverse(mvv_lva(pos, mv)));

        let mover = pos.side_to_move;
        for &mv in &moves {
            pos.make_move(mv);
            // The capture generator is pseudo-legal; skip anything that
            // hangs the king.
            if pos.in_check(mover) {
                pos.unmake_move(mv);
                continue;
            }
            let score = -self.quiescence(pos, ply.saturating_add(1), -beta, -alpha);
            pos.unmake_move(mv);

            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    /// Reconstructs the principal variation by walking best moves through
    /// the table. Each step is validated against the legal moves so a hash
    /// collision cannot produce an illegal line.
    fn extract_pv(&self, pos: &Position, depth: u8) -> Vec<Move> {
        let mut pv = Vec::with_capacity(depth as usize);
        let mut current = pos.clone();
        for _ in 0..depth {
            let mv = match self.tt.probe(current.hash()) {
                Some(entry) if !entry.best_move.is_none() => entry.best_move,
                _ => break,
            };
            if !legal_moves(&current).contains(&mv) {
                break;
            }
            current.make_move(mv);
            pv.push(mv);
        }
        pv
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Orders the TT move first, then captures by MVV-LVA, then quiet moves in
/// generation order (the sort is stable).
fn order_moves(pos: &Position, moves: &mut [Move], tt_move: Move) {
    moves.sort_by_key(|&mv| {
        let score = if !tt_move.is_none() && mv == tt_move {
            2_000_000
        } else if mv.is_capture() {
            1_000_000 + mvv_lva(pos, mv)
        } else {
            0
        };
        std::cmp::Reverse(score)
    });
}

/// Most-valuable-victim / least-valuable-attacker score; the en-passant
/// victim is a pawn even though the target square is empty.
fn mvv_lva(pos: &Position, mv: Move) -> i32 {
    let victim = if mv.is_en_passant() {
        PieceKind::Pawn
    } else {
        match pos.piece_at(mv.to()) {
            Some(pc) => pc.kind,
            None => return 0,
        }
    };
    let attacker = match pos.piece_at(mv.from()) {
        Some(pc) => pc.kind,
        None => return 0,
    };
    ORDER_VALUES[victim.idx()] * 10 - ORDER_VALUES[attacker.idx()]
}

/// Converts a root-relative mate score into a node-relative one for
/// storage, so a cached mate keeps the right distance wherever it is
/// probed from.
fn score_to_tt(score: i32, ply: u8) -> i16 {
    let adjusted = if score > MATE_BOUND {
        score + ply as i32
    } else if score < -MATE_BOUND {
        score - ply as i32
    } else {
        score
    };
    adjusted as i16
}

/// Inverse of `score_to_tt`.
fn score_from_tt(score: i32, ply: u8) -> i32 {
    if score > MATE_BOUND {
        score - ply as i32
    } else if score < -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
