use std::sync::atomic::{AtomicU64, Ordering};

use crate::chess::Move;
use crate::engine::search::{MATE_THRESHOLD, MAX_PLY};

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Bound {
    #[default]
    Exact = 0,
    Lower = 1, // fail-high, true score >= stored
    Upper = 2, // fail-low, true score <= stored
}

impl Bound {
    fn from_u64(n: u64) -> Bound {
        match n {
            1 => Bound::Lower,
            2 => Bound::Upper,
            _ => Bound::Exact,
        }
    }
}

#[derive(Clone, Copy)]
pub struct TTData {
    pub score: i32,
    pub depth: u8,
    pub bound: Bound,
    pub best_move: Move,
}

// Mate scores are stored relative to the probing node, not the root, so a
// cached mate stays correct at any ply it is found again from.
pub fn encode_mate(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply as i32
    } else if score < -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

pub fn decode_mate(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply as i32
    } else if score < -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

#[repr(C, align(16))]
#[derive(Default)]
struct TTEntry {
    key: AtomicU64,
    // packed: [score:32][move:24][depth:6][bound:2]
    data: AtomicU64,
}

impl TTEntry {
    fn encode(score: i32, best_move: Move, depth: u8, bound: Bound) -> u64 {
        (score as u32 as u64) << 32
            | ((best_move.0 & 0xff_ffff) as u64) << 8
            | (depth as u64) << 2
            | bound as u64
    }

    fn decode(data: u64) -> TTData {
        TTData {
            score: (data >> 32) as u32 as i32,
            best_move: Move(((data >> 8) & 0xff_ffff) as u32),
            depth: ((data >> 2) & 0x3f) as u8,
            bound: Bound::from_u64(data & 0x3),
        }
    }
}

/// Lock-free transposition table: a power-of-two array of `{key, data}`
/// atomic pairs indexed by the low Zobrist bits, with direct key comparison
/// for collision detection and depth-preferred replacement. A torn race
/// loses a slot at worst; entries are self-describing through their key.
pub struct TT {
    table: Box<[TTEntry]>,
    mask: usize,
}

impl TT {
    pub fn new(megabytes: usize) -> TT {
        const MIB: usize = 1 << 20;
        let entry_size = std::mem::size_of::<TTEntry>();
        let requested_bytes = megabytes.max(1) * MIB;

        // round down: the byte budget is a ceiling, not a hint
        let entries = 1usize << (requested_bytes / entry_size).ilog2();
        let table = (0..entries)
            .map(|_| TTEntry::default())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        TT {
            table,
            mask: entries - 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    #[inline(always)]
    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    pub fn probe(&self, key: u64) -> Option<TTData> {
        let entry = &self.table[self.index(key)];
        if entry.key.load(Ordering::Acquire) == key {
            Some(TTEntry::decode(entry.data.load(Ordering::Acquire)))
        } else {
            None
        }
    }

    /// Depth-preferred: overwrites only an empty slot or one holding a
    /// search of no greater draft.
    pub fn save(&self, key: u64, score: i32, depth: usize, bound: Bound, best_move: Move) {
        debug_assert!(depth < MAX_PLY);

        let entry = &self.table[self.index(key)];
        let stored = entry.data.load(Ordering::Acquire);
        if stored != 0 && TTEntry::decode(stored).depth > depth as u8 {
            return;
        }

        entry.key.store(key, Ordering::Release);
        entry.data.store(
            TTEntry::encode(score, best_move, depth as u8, bound),
            Ordering::Release,
        );
    }

    pub fn clear(&self) {
        for entry in self.table.iter() {
            entry.key.store(0, Ordering::Relaxed);
            entry.data.store(0, Ordering::Relaxed);
        }
    }
}
