//! Rules-of-chess core: board state, move generation, hashing, perft, and
//! the interface search backends implement.

pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod movegen;
pub mod perft;
pub mod time_control;
pub mod types;
pub mod uci;
pub mod zobrist;

pub use attacks::*;
pub use bitboard::*;
pub use board::*;
pub use movegen::*;
pub use perft::{perft, perft_divide};
pub use time_control::*;
pub use types::*;
pub use uci::*;
pub use zobrist::ZOBRIST;

use std::time::Duration;

/// Outcome of one `Engine::search` call.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move found; `None` when the position has no legal moves or the
    /// search was stopped before depth 1 completed.
    pub best_move: Option<Move>,
    /// Score in centipawns from the engine's point of view.
    pub score: i32,
    /// Deepest fully completed iteration.
    pub depth: u8,
    /// Nodes visited across all iterations.
    pub nodes: u64,
    /// Whether the search ended on the stop flag rather than by finishing.
    pub stopped: bool,
    /// Principal variation of the last completed iteration.
    pub pv: Vec<Move>,
}

/// Progress report emitted after each completed iteration.
#[derive(Debug, Clone)]
pub struct SearchInfo {
    pub depth: u8,
    pub seldepth: u8,
    pub score_cp: i32,
    pub nodes: u64,
    pub time: Duration,
    pub pv: Vec<Move>,
}

/// A search backend. The front-end talks to the engine exclusively through
/// this trait, so backends can be swapped without touching the protocol
/// code.
pub trait Engine: Send {
    /// Searches `pos` within `limits`, reporting each completed iteration
    /// through `on_info`.
    fn search_with_info(
        &mut self,
        pos: &Position,
        limits: SearchLimits,
        on_info: &mut dyn FnMut(&SearchInfo),
    ) -> SearchResult;

    /// Searches without progress reporting.
    fn search(&mut self, pos: &Position, limits: SearchLimits) -> SearchResult {
        self.search_with_info(pos, limits, &mut |_| {})
    }

    /// Engine name for UCI identification.
    fn name(&self) -> &str;

    /// Engine author for UCI identification.
    fn author(&self) -> &str {
        "IronPawn"
    }

    /// Resets per-game state (hash tables, history).
    fn new_game(&mut self) {}

    /// Applies a UCI option; returns whether the option was recognized.
    fn set_option(&mut self, _name: &str, _value: &str) -> bool {
        false
    }
}
