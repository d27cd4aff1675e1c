//! Zobrist keys for position hashing.
//!
//! A position's hash is the XOR of one key per piece-square pair, one key
//! for the current castling mask, one key for the en-passant file when a
//! target is set, and one key when it is black's turn. Keys are generated
//! at compile time so the table needs no runtime initialization.

use crate::types::Piece;

pub struct ZobristKeys {
    /// Piece-square keys, indexed by [color][piece kind][square].
    pub pieces: [[[u64; 64]; 6]; 2],
    /// XORed in when black is to move.
    pub side_to_move: u64,
    /// One key per 4-bit castling mask.
    pub castling: [u64; 16],
    /// One key per en-passant file.
    pub en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Builds the key table from a fixed-seed xorshift64 stream, so every
    /// build produces the same hashes.
    pub const fn new() -> Self {
        const fn xorshift64(mut state: u64) -> u64 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        }

        let mut state = 0x9E37_79B9_7F4A_7C15u64;

        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut color = 0;
        while color < 2 {
            let mut kind = 0;
            while kind < 6 {
                let mut sq = 0;
                while sq < 64 {
                    state = xorshift64(state);
                    pieces[color][kind][sq] = state;
                    sq += 1;
                }
                kind += 1;
            }
            color += 1;
        }

        state = xorshift64(state);
        let side_to_move = state;

        let mut castling = [0u64; 16];
        // Mask 0 hashes to 0 so that an empty-rights position and the
        // pieces-only XOR agree; every other mask gets its own key.
        let mut i = 1;
        while i < 16 {
            state = xorshift64(state);
            castling[i] = state;
            i += 1;
        }

        let mut en_passant = [0u64; 8];
        let mut f = 0;
        while f < 8 {
            state = xorshift64(state);
            en_passant[f] = state;
            f += 1;
        }

        ZobristKeys {
            pieces,
            side_to_move,
            castling,
            en_passant,
        }
    }

    #[inline(always)]
    pub fn piece_key(&self, piece: Piece, sq: u8) -> u64 {
        self.pieces[piece.color.idx()][piece.kind.idx()][sq as usize]
    }

    /// Key for a full 4-bit castling mask.
    #[inline(always)]
    pub fn castling_key(&self, mask: u8) -> u64 {
        self.castling[mask as usize & 0xF]
    }

    #[inline(always)]
    pub fn ep_key(&self, file: u8) -> u64 {
        self.en_passant[file as usize]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide key table, computed at compile time.
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

#[cfg(test)]
#[path = "zobrist_tests.rs"]
mod zobrist_tests;
