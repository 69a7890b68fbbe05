use crate::chess::*;
use tinyvec::ArrayVec;

// Priority bands. Promotions outrank every capture; captures are tiered by
// the value swing, with losing-looking ones split by exchange outcome.
// Quiet moves stay at zero, unordered.
const PROMOTE_SCORE: i32 = 100_000;
const HIGH_CAPTURE: i32 = 80_000;
const LOW_CAPTURE: i32 = 60_000;
const SAFE_CAPTURE: i32 = 20_000;
const REFUTED_CAPTURE: i32 = 10_000;

/// Value of whatever the move takes, `None` for quiet moves. The
/// en-passant victim is a pawn even though the codec records no capture.
#[inline(always)]
fn victim_value(position: &Position, mov: Move) -> Option<i32> {
    let captured = mov.get_captured();
    if captured != piece::NONE {
        Some(piece::VALUES[piece::kind(captured) as usize])
    } else if piece::kind(mov.get_mover()) == piece::PAWN
        && Some(mov.get_to()) == position.en_passant_square()
    {
        Some(piece::VALUES[piece::PAWN as usize])
    } else {
        None
    }
}

fn score_move(position: &Position, mov: Move) -> i32 {
    let promotion = mov.get_promotion();
    let victim = victim_value(position, mov);

    if promotion != piece::NONE {
        return PROMOTE_SCORE
            + piece::VALUES[piece::kind(promotion) as usize]
            + victim.unwrap_or(0);
    }

    match victim {
        Some(victim) => {
            let diff = victim - piece::VALUES[piece::kind(mov.get_mover()) as usize];
            if diff > 50 {
                HIGH_CAPTURE + diff
            } else if diff > -50 {
                LOW_CAPTURE + diff
            } else if see(position, mov.get_from(), mov.get_to()) >= 0 {
                SAFE_CAPTURE + diff
            } else {
                REFUTED_CAPTURE + diff
            }
        }
        None => 0,
    }
}

// In-place descending quicksort (Lomuto) over packed (score, move) keys.
// Ties may reorder; stability is not needed.
fn quicksort_desc(keys: &mut [i64]) {
    if keys.len() < 2 {
        return;
    }

    let pivot = keys[keys.len() - 1];
    let mut boundary = 0;
    for index in 0..keys.len() - 1 {
        if keys[index] > pivot {
            keys.swap(boundary, index);
            boundary += 1;
        }
    }
    let last = keys.len() - 1;
    keys.swap(boundary, last);

    let (left, right) = keys.split_at_mut(boundary);
    quicksort_desc(left);
    quicksort_desc(&mut right[1..]);
}

#[inline(always)]
fn pack(mov: Move, score: i32) -> i64 {
    (score as i64) << 32 | mov.0 as i64
}

/// Orders a move list best-first by static priority, without reference to
/// any search-tree history.
pub fn order_moves(position: &Position, move_list: &mut MoveList) {
    let mut keys: ArrayVec<[i64; MAX_MOVES]> = move_list
        .iter()
        .map(|&mov| pack(mov, score_move(position, mov)))
        .collect();

    quicksort_desc(&mut keys);

    for (slot, &key) in move_list.iter_mut().zip(keys.iter()) {
        *slot = Move(key as u32);
    }
}

/// Root variant: each move carries the score it earned in the previous
/// deepening iteration, and the list is re-sorted on that score directly.
pub fn order_root(moves: &mut [(Move, i32)]) {
    let mut keys: Vec<i64> = moves.iter().map(|&(mov, score)| pack(mov, score)).collect();

    quicksort_desc(&mut keys);

    for (slot, key) in moves.iter_mut().zip(keys) {
        *slot = (Move(key as u32), (key >> 32) as i32);
    }
}

fn least_valuable_attacker(
    position: &Position,
    attackers: u64,
    color: Color,
) -> Option<(u64, u8)> {
    for kind in [
        piece::PAWN,
        piece::KNIGHT,
        piece::BISHOP,
        piece::ROOK,
        piece::QUEEN,
        piece::KING,
    ] {
        let subset = position.pieces(piece::code(kind, color)) & attackers;
        if subset != 0 {
            return Some((subset & subset.wrapping_neg(), kind)); // isolate the lsb
        }
    }

    None
}

/// Static exchange evaluation: net material outcome of the full capture
/// sequence on `to`, from the perspective of the side moving first.
///
/// Swap-list simulation: each iteration books the speculative gain of the
/// next capture, removes the capturer from the occupancy (so sliders behind
/// it come through on the next attack recomputation), and hands the square
/// to the cheapest attacker of the other side. The backward pass then lets
/// each side stand pat instead of continuing a losing recapture.
pub fn see(position: &Position, from: Square, to: Square) -> i32 {
    let mut gain = [0i32; 32];
    let mut depth = 0usize;
    let mut occupancy = position.both_occupancies();
    let mut attacker_bit = bit(from);

    let mover = position.piece_at(from);
    debug_assert!(mover != piece::NONE);
    let mut attacker_kind = piece::kind(mover);
    let mut side = piece::color(mover);

    gain[0] = piece::VALUES[piece::kind(position.piece_at(to)) as usize];

    while depth + 1 < gain.len() {
        depth += 1;
        gain[depth] = piece::VALUES[attacker_kind as usize] - gain[depth - 1];

        occupancy ^= attacker_bit;
        side = side.toggle();

        let attackers = attackers_to(to, side, occupancy, position);
        let Some((next_bit, next_kind)) = least_valuable_attacker(position, attackers, side)
        else {
            break;
        };
        attacker_bit = next_bit;
        attacker_kind = next_kind;
    }

    while depth > 1 {
        depth -= 1;
        gain[depth - 1] = -std::cmp::max(-gain[depth - 1], gain[depth]);
    }

    gain[0]
}
