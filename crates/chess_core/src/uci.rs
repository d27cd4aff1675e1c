//! UCI move strings and the `position` command.

use crate::board::{FenError, Position};
use crate::movegen::legal_moves;
use crate::types::*;

/// Long algebraic notation: from-square, to-square, optional promotion
/// letter. `Move::NONE` prints as "0000".
pub fn move_to_uci(mv: Move) -> String {
    if mv.is_none() {
        return "0000".to_string();
    }
    let mut s = String::new();
    s.push_str(&sq_to_coord(mv.from()));
    s.push_str(&sq_to_coord(mv.to()));
    if let Some(p) = mv.promo() {
        s.push(match p {
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            _ => 'q',
        });
    }
    s
}

/// Resolves a move string against the legal moves of `pos`, so the returned
/// move carries the right capture/castle/en-passant flags. Returns `None`
/// for garbage input and for moves that are not legal here.
pub fn parse_uci_move(pos: &Position, txt: &str) -> Option<Move> {
    if txt.len() < 4 || txt.len() > 5 {
        return None;
    }
    let from = coord_to_sq(&txt[0..2])?;
    let to = coord_to_sq(&txt[2..4])?;
    let promo = if txt.len() == 5 {
        match txt.as_bytes()[4].to_ascii_lowercase() as char {
            'q' => Some(PieceKind::Queen),
            'r' => Some(PieceKind::Rook),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            _ => return None,
        }
    } else {
        None
    };

    legal_moves(pos)
        .into_iter()
        .find(|m| m.from() == from && m.to() == to && m.promo() == promo)
}

/// Applies a `position` command body: `startpos | fen <FEN>` followed by an
/// optional `moves <m>...` tail. On a FEN error `pos` is left untouched.
/// Move strings that match no legal move are skipped silently, per UCI
/// convention.
pub fn apply_position_command(pos: &mut Position, args: &[&str]) -> Result<(), FenError> {
    let mut next = Position::startpos();
    let mut i = 0;

    if let Some(&first) = args.first() {
        if first == "startpos" {
            i = 1;
        } else if first == "fen" {
            let end = args
                .iter()
                .position(|&a| a == "moves")
                .unwrap_or(args.len());
            let fen = args[1..end].join(" ");
            next = Position::from_fen(&fen)?;
            i = end;
        }
    }

    if args.get(i) == Some(&"moves") {
        for txt in &args[i + 1..] {
            if let Some(mv) = parse_uci_move(&next, txt) {
                next.make_move(mv);
            }
        }
    }

    *pos = next;
    Ok(())
}
