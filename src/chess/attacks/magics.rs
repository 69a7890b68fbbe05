use rand::{Rng, SeedableRng};
use std::sync::LazyLock;

use crate::chess::{
    attacks::{
        movegen::{gen_sliding_attacks, get_occupancy},
        tables::{self, Magic, Offset},
    },
    position::{BOARD_SIZE, Square},
};

pub struct SlidingAttacks {
    bishop_magics: [Magic; BOARD_SIZE],
    rook_magics: [Magic; BOARD_SIZE],
    attacks: Vec<u64>,
}

// This code is textbook magic bitboards. The magic factors are searched
// once at first use with a fixed seed, so the tables are deterministic and
// correct by construction.
pub static SLIDING: LazyLock<SlidingAttacks> = LazyLock::new(SlidingAttacks::build);

impl SlidingAttacks {
    #[inline(always)]
    pub fn bishop(&self, square: Square, occupancy: u64) -> u64 {
        let magic = &self.bishop_magics[square as usize];
        let variant = (occupancy & tables::BISHOP_RM[square as usize]).wrapping_mul(magic.magic)
            >> magic.shift;
        self.attacks[magic.offset + variant as usize]
    }

    #[inline(always)]
    pub fn rook(&self, square: Square, occupancy: u64) -> u64 {
        let magic = &self.rook_magics[square as usize];
        let variant = (occupancy & tables::ROOK_RM[square as usize]).wrapping_mul(magic.magic)
            >> magic.shift;
        self.attacks[magic.offset + variant as usize]
    }

    fn build() -> SlidingAttacks {
        let mut bishop_magics = [Magic::default(); BOARD_SIZE];
        let mut rook_magics = [Magic::default(); BOARD_SIZE];
        let mut attacks: Vec<u64> = vec![];
        let mut offset = 0usize;

        for square in 0..BOARD_SIZE {
            let (magic, bits, mut table) = find_magic(
                square as Square,
                tables::BISHOP_RM[square],
                &tables::BISHOP_DIRECTIONS,
            );
            bishop_magics[square] = Magic {
                offset,
                magic,
                shift: (BOARD_SIZE - bits) as u32,
            };
            attacks.append(&mut table);
            offset += 1usize << bits;
        }

        for square in 0..BOARD_SIZE {
            let (magic, bits, mut table) = find_magic(
                square as Square,
                tables::ROOK_RM[square],
                &tables::ROOK_DIRECTIONS,
            );
            rook_magics[square] = Magic {
                offset,
                magic,
                shift: (BOARD_SIZE - bits) as u32,
            };
            attacks.append(&mut table);
            offset += 1usize << bits;
        }

        SlidingAttacks {
            bishop_magics,
            rook_magics,
            attacks,
        }
    }
}

fn find_magic(square: Square, relevant_mask: u64, directions: &[Offset]) -> (u64, usize, Vec<u64>) {
    let bits = relevant_mask.count_ones() as usize;
    let len = 1 << bits;

    let occupancies: Vec<u64> = (0..len)
        .map(|variant| get_occupancy(variant, relevant_mask))
        .collect();
    let attacks: Vec<u64> = (0..len)
        .map(|variant| gen_sliding_attacks(square, occupancies[variant], directions))
        .collect();

    let mut rng = rand::rngs::SmallRng::seed_from_u64(1);

    for _ in 0..100_000_000usize {
        let mut used: Vec<u64> = vec![0; len];
        let magic = rng.random::<u64>() & rng.random::<u64>() & rng.random::<u64>();

        let mut collided = false;
        for variant in 0..len {
            let magic_index =
                (occupancies[variant].wrapping_mul(magic) >> (BOARD_SIZE - bits)) as usize;

            if used[magic_index] == 0 {
                used[magic_index] = attacks[variant];
            } else if used[magic_index] != attacks[variant] {
                collided = true;
                break;
            }
        }

        if !collided {
            return (magic, bits, used);
        }
    }

    // Sparse random candidates find every square within a few thousand
    // tries; exhausting the budget means the mask generation is broken.
    panic!("no magic found for square {square}");
}
