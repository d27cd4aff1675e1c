//! UCI front-end.
//!
//! Reads line commands from stdin and answers on stdout. A `go` dispatches
//! the search onto a worker thread so that `stop` stays responsive; the
//! only cross-thread state is the engine behind a mutex and the shared
//! stop flag inside `TimeControl`.

use alphabeta_engine::AlphaBetaEngine;
use chess_core::{
    apply_position_command, move_to_uci, Color, Engine, Position, SearchInfo, SearchLimits,
    TimeControl,
};
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Parsed `go` arguments; unspecified fields keep their `None`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct GoParams {
    depth: Option<u8>,
    movetime: Option<u64>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
    movestogo: Option<u64>,
    infinite: bool,
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 0;
    while i < tokens.len() {
        let value = tokens.get(i + 1);
        match tokens[i] {
            "depth" => {
                params.depth = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "movetime" => {
                params.movetime = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "wtime" => {
                params.wtime = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "btime" => {
                params.btime = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "winc" => {
                params.winc = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "binc" => {
                params.binc = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "movestogo" => {
                params.movestogo = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    params
}

/// Turns clock fields into a budget for this one move. `movetime` is used
/// verbatim; otherwise remaining time minus a safety margin is spread over
/// the moves left, topped up with most of the increment, scaled by game
/// phase, and capped at a quarter of what is on the clock.
fn allocate_time(params: &GoParams, side: Color, fullmove_number: u32) -> Option<Duration> {
    if let Some(ms) = params.movetime {
        return Some(Duration::from_millis(ms));
    }
    if params.infinite {
        return None;
    }

    let (my_time, my_inc) = match side {
        Color::White => (params.wtime, params.winc),
        Color::Black => (params.btime, params.binc),
    };
    let my_time = my_time?;

    let available = my_time.saturating_sub(50);
    if available == 0 {
        return Some(Duration::from_millis(10));
    }

    let movestogo = params.movestogo.unwrap_or(40).max(1);
    let mut budget = available / movestogo;
    budget += my_inc.unwrap_or(0) * 9 / 10;

    if fullmove_number < 10 {
        budget = budget * 12 / 10;
    } else if fullmove_number > 40 {
        budget = budget * 8 / 10;
    }

    budget = budget.min(available / 4).max(10);
    Some(Duration::from_millis(budget))
}

struct SearchJob {
    handle: JoinHandle<()>,
    tc: TimeControl,
}

/// Trips the stop flag and waits for the worker to print its bestmove.
fn halt_search(job: &mut Option<SearchJob>) {
    if let Some(job) = job.take() {
        job.tc.stop();
        job.handle.join().ok();
    }
}

fn print_info(info: &SearchInfo) {
    let ms = info.time.as_millis() as u64;
    let mut line = format!(
        "info depth {} seldepth {} score cp {} nodes {} time {}",
        info.depth, info.seldepth, info.score_cp, info.nodes, ms
    );
    if ms > 0 {
        line.push_str(&format!(" nps {}", info.nodes * 1000 / ms));
    }
    if !info.pv.is_empty() {
        line.push_str(" pv");
        for mv in &info.pv {
            line.push(' ');
            line.push_str(&move_to_uci(*mv));
        }
    }
    println!("{line}");
    io::stdout().flush().ok();
}

fn start_search(
    engine: &Arc<Mutex<AlphaBetaEngine>>,
    pos: &Position,
    params: GoParams,
) -> SearchJob {
    let budget = allocate_time(&params, pos.side_to_move, pos.fullmove_number);
    if params.movetime.is_none() && !params.infinite {
        if let Some(t) = budget {
            eprintln!(
                "time management: movestogo={} -> {}ms",
                params.movestogo.unwrap_or(40),
                t.as_millis()
            );
        }
    }

    let depth = params.depth.unwrap_or(64).clamp(1, 64);
    let limits = match budget {
        Some(t) => SearchLimits::depth_and_time(depth, t),
        None => SearchLimits::depth(depth),
    };
    let tc = limits.time_control.clone();

    let engine = Arc::clone(engine);
    let root = pos.clone();
    let handle = std::thread::spawn(move || {
        let mut engine = engine.lock().unwrap();
        let result = engine.search_with_info(&root, limits, &mut print_info);
        match result.best_move {
            Some(mv) => println!("bestmove {}", move_to_uci(mv)),
            None => println!("bestmove 0000"),
        }
        io::stdout().flush().ok();
    });

    SearchJob { handle, tc }
}

fn handle_setoption(engine: &Arc<Mutex<AlphaBetaEngine>>, tokens: &[&str]) {
    let name_idx = match tokens.iter().position(|&t| t == "name") {
        Some(i) => i,
        None => return,
    };
    let value_idx = tokens.iter().position(|&t| t == "value");
    let name_end = value_idx.unwrap_or(tokens.len());
    let name = tokens[name_idx + 1..name_end].join(" ");
    let value = value_idx
        .map(|vi| tokens[vi + 1..].join(" "))
        .unwrap_or_default();

    // Unknown options are ignored, per protocol.
    engine.lock().unwrap().set_option(&name, &value);
}

fn main() {
    let stdin = io::stdin();
    let mut pos = Position::startpos();
    let engine = Arc::new(Mutex::new(AlphaBetaEngine::new()));
    let mut job: Option<SearchJob> = None;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let command = match tokens.first() {
            Some(&c) => c,
            None => continue,
        };

        match command {
            "uci" => {
                let engine = engine.lock().unwrap();
                println!("id name {}", engine.name());
                println!("id author {}", engine.author());
                println!("option name Hash type spin default 64 min 1 max 1024");
                println!("uciok");
                io::stdout().flush().ok();
            }
            "isready" => {
                println!("readyok");
                io::stdout().flush().ok();
            }
            "ucinewgame" => {
                halt_search(&mut job);
                pos = Position::startpos();
                engine.lock().unwrap().new_game();
            }
            "setoption" => {
                halt_search(&mut job);
                handle_setoption(&engine, &tokens);
            }
            "position" => {
                halt_search(&mut job);
                if let Err(err) = apply_position_command(&mut pos, &tokens[1..]) {
                    eprintln!("rejected position: {err}");
                }
            }
            "go" => {
                halt_search(&mut job);
                job = Some(start_search(&engine, &pos, parse_go(&tokens[1..])));
            }
            "stop" => {
                halt_search(&mut job);
            }
            "quit" => {
                halt_search(&mut job);
                break;
            }
            "d" => {
                println!("{}", pos.to_fen());
                io::stdout().flush().ok();
            }
            _ => {
                // Unknown commands are ignored, per protocol.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_parsing_covers_all_fields() {
        let params = parse_go(&[
            "depth", "12", "wtime", "60000", "btime", "50000", "winc", "1000", "binc", "900",
            "movestogo", "30",
        ]);
        assert_eq!(params.depth, Some(12));
        assert_eq!(params.wtime, Some(60_000));
        assert_eq!(params.btime, Some(50_000));
        assert_eq!(params.winc, Some(1000));
        assert_eq!(params.binc, Some(900));
        assert_eq!(params.movestogo, Some(30));
        assert!(!params.infinite);

        assert_eq!(parse_go(&["movetime", "2500"]).movetime, Some(2500));
        assert!(parse_go(&["infinite"]).infinite);
        assert_eq!(parse_go(&[]), GoParams::default());
        // Garbage tokens are skipped.
        assert_eq!(parse_go(&["ponder", "depth", "3"]).depth, Some(3));
    }

    #[test]
    fn movetime_is_used_verbatim() {
        let params = parse_go(&["movetime", "1500"]);
        assert_eq!(
            allocate_time(&params, Color::White, 20),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn infinite_has_no_budget() {
        let params = parse_go(&["infinite"]);
        assert_eq!(allocate_time(&params, Color::White, 20), None);
    }

    #[test]
    fn clock_is_divided_over_remaining_moves() {
        let params = parse_go(&["wtime", "60000", "movestogo", "40"]);
        // (60000 - 50) / 40 = 1498ms, mid-game so no phase scaling.
        assert_eq!(
            allocate_time(&params, Color::White, 20),
            Some(Duration::from_millis(1498))
        );
        // Black has no clock here: no budget for black either.
        assert_eq!(allocate_time(&params, Color::Black, 20), None);
    }

    #[test]
    fn increment_is_mostly_added() {
        let with_inc = parse_go(&["btime", "60000", "binc", "1000", "movestogo", "40"]);
        let without = parse_go(&["btime", "60000", "movestogo", "40"]);
        let a = allocate_time(&with_inc, Color::Black, 20).unwrap();
        let b = allocate_time(&without, Color::Black, 20).unwrap();
        assert_eq!(a - b, Duration::from_millis(900));
    }

    #[test]
    fn phase_scaling_spends_more_early_and_less_late() {
        let params = parse_go(&["wtime", "60000", "movestogo", "40"]);
        let opening = allocate_time(&params, Color::White, 5).unwrap();
        let middle = allocate_time(&params, Color::White, 20).unwrap();
        let endgame = allocate_time(&params, Color::White, 60).unwrap();
        assert!(opening > middle);
        assert!(middle > endgame);
    }

    #[test]
    fn budget_is_capped_at_a_quarter_of_the_clock() {
        // Two moves to go would naively get half the clock each.
        let params = parse_go(&["wtime", "10000", "movestogo", "2"]);
        let budget = allocate_time(&params, Color::White, 20).unwrap();
        assert_eq!(budget, Duration::from_millis((10_000 - 50) / 4));
    }

    #[test]
    fn desperate_clocks_still_get_a_sliver() {
        let params = parse_go(&["wtime", "30"]);
        assert_eq!(
            allocate_time(&params, Color::White, 20),
            Some(Duration::from_millis(10))
        );
    }
}
