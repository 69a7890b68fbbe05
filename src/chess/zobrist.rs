use crate::chess::position::{BOARD_SIZE, BOARD_WIDTH};
use rand::{Rng, SeedableRng};
use std::array::from_fn;
use std::sync::LazyLock;

// Indexed by the 4-bit piece code, so the unused code rows stay zero-cost
// padding. There is no side-to-move entry: black to move is the bitwise
// complement of the accumulated key.
pub static ZOBRIST_PIECE: LazyLock<[[u64; BOARD_SIZE]; 16]> = LazyLock::new(|| {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
    from_fn(|_| from_fn(|_| rng.random()))
});

pub static ZOBRIST_CASTLING: LazyLock<[u64; 16]> = LazyLock::new(|| {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(3);
    from_fn(|_| rng.random())
});

pub static ZOBRIST_EN_PASSANT: LazyLock<[u64; BOARD_WIDTH]> = LazyLock::new(|| {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(4);
    from_fn(|_| rng.random())
});
