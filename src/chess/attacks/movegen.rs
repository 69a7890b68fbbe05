use crate::chess::{
    attacks::{
        magics::SLIDING,
        tables::{self, Offset},
    },
    moves::{Move, MoveList},
    position::*,
};

#[inline(always)]
pub fn gen_pawn_pushes(square: Square, occupancy: u64, color: Color) -> u64 {
    debug_assert!(square < BOARD_SIZE as u8);

    match color {
        Color::White => {
            let single: u64 = (bit(square) << BOARD_WIDTH) & !occupancy;
            let double: u64 = ((single & RANKS[2]) << BOARD_WIDTH) & !occupancy;

            single | double
        }
        Color::Black => {
            let single: u64 = (bit(square) >> BOARD_WIDTH) & !occupancy;
            let double: u64 = ((single & RANKS[5]) >> BOARD_WIDTH) & !occupancy;

            single | double
        }
    }
}

#[inline(always)]
fn gen_pawn_captures(square: Square, capturable: u64, color: Color) -> u64 {
    (match color {
        Color::White => tables::WPAWN_ATTACKS[square as usize],
        Color::Black => tables::BPAWN_ATTACKS[square as usize],
    }) & capturable
}

pub fn gen_jumping_attacks(square: Square, offsets: &[Offset]) -> u64 {
    debug_assert!(square < BOARD_SIZE as u8);

    let rank = square as i8 / BOARD_WIDTH as i8;
    let file = square as i8 % BOARD_WIDTH as i8;

    offsets.iter().fold(0u64, |attacks, offset| {
        let (r, f) = (rank + offset.rank, file + offset.file);
        if valid_axis(r) && valid_axis(f) {
            attacks | bit(to_square(r, f))
        } else {
            attacks
        }
    })
}

pub fn gen_edge_mask(square: Square) -> u64 {
    debug_assert!(square < BOARD_SIZE as Square);

    let bit: u64 = bit(square);

    const FILE_BB_1: u64 = 0x0101010101010101;
    const FILE_BB_8: u64 = 0x8080808080808080;

    [RANKS[0], RANKS[7], FILE_BB_1, FILE_BB_8]
        .iter()
        .fold(
            0u64,
            |mask, edge| if bit & edge == 0 { mask | edge } else { mask },
        )
}

pub fn gen_sliding_attacks(square: Square, occupancy: u64, directions: &[Offset]) -> u64 {
    debug_assert!(square < BOARD_SIZE as u8);

    let rank = square as i8 / BOARD_WIDTH as i8;
    let file = square as i8 % BOARD_WIDTH as i8;

    let mut attacks: u64 = 0;

    for offset in directions {
        let (mut attacked_rank, mut attacked_file) = (rank + offset.rank, file + offset.file);
        let mut ray: u64 = 0;

        while valid_axis(attacked_rank) && valid_axis(attacked_file) {
            ray |= bit(to_square(attacked_rank, attacked_file));

            if ray & occupancy != 0 {
                break;
            }

            attacked_rank += offset.rank;
            attacked_file += offset.file;
        }

        attacks |= ray;
    }

    attacks
}

/// Maps a variant index onto the set bits of a relevant-occupancy mask.
pub fn get_occupancy(mut variant: usize, mut relevant_mask: u64) -> u64 {
    debug_assert!(variant < (1 << relevant_mask.count_ones()));

    let mut occupancy: u64 = 0;

    while variant != 0 {
        if variant & 1 != 0 {
            occupancy |= relevant_mask & relevant_mask.wrapping_neg();
        }

        variant >>= 1;
        relevant_mask &= relevant_mask - 1;
    }

    occupancy
}

/// Attack probes in increasing cost order: knights, king, pawns, then the
/// two sliding lookups.
#[inline(always)]
pub fn is_square_attacked(square: Square, attacker_color: Color, position: &Position) -> bool {
    let occupancy = position.both_occupancies();
    let queens = position.pieces(piece::code(piece::QUEEN, attacker_color));

    (tables::KNIGHT_ATTACKS[square as usize]
        & position.pieces(piece::code(piece::KNIGHT, attacker_color)))
        != 0
        || (tables::KING_ATTACKS[square as usize]
            & position.pieces(piece::code(piece::KING, attacker_color)))
            != 0
        || gen_pawn_captures(
            square,
            position.pieces(piece::code(piece::PAWN, attacker_color)),
            attacker_color.toggle(),
        ) != 0
        || (SLIDING.bishop(square, occupancy)
            & (position.pieces(piece::code(piece::BISHOP, attacker_color)) | queens))
            != 0
        || (SLIDING.rook(square, occupancy)
            & (position.pieces(piece::code(piece::ROOK, attacker_color)) | queens))
            != 0
}

/// All of `attacker_color`'s pieces attacking `square`, computed against an
/// explicit occupancy so exchange simulation can peel attackers off and let
/// x-rays through.
#[inline(always)]
pub fn attackers_to(
    square: Square,
    attacker_color: Color,
    occupancy: u64,
    position: &Position,
) -> u64 {
    let queens = position.pieces(piece::code(piece::QUEEN, attacker_color));

    let pawn_attacks = gen_pawn_captures(
        square,
        position.pieces(piece::code(piece::PAWN, attacker_color)),
        attacker_color.toggle(),
    );
    let knight_attacks = tables::KNIGHT_ATTACKS[square as usize]
        & position.pieces(piece::code(piece::KNIGHT, attacker_color));
    let king_attacks = tables::KING_ATTACKS[square as usize]
        & position.pieces(piece::code(piece::KING, attacker_color));
    let bishop_attacks = SLIDING.bishop(square, occupancy)
        & (position.pieces(piece::code(piece::BISHOP, attacker_color)) | queens);
    let rook_attacks = SLIDING.rook(square, occupancy)
        & (position.pieces(piece::code(piece::ROOK, attacker_color)) | queens);

    (pawn_attacks | knight_attacks | king_attacks | bishop_attacks | rook_attacks) & occupancy
}

#[inline(always)]
fn push_pawn_moves(from: Square, to: Square, mover: u8, captured: u8, move_list: &mut MoveList) {
    let color = piece::color(mover);
    let promotion_rank = match color {
        Color::White => RANKS[7],
        Color::Black => RANKS[0],
    };

    if bit(to) & promotion_rank != 0 {
        for kind in [piece::ROOK, piece::BISHOP, piece::KNIGHT, piece::QUEEN] {
            move_list.push(Move::new(from, to, mover, captured, piece::code(kind, color)));
        }
    } else {
        move_list.push(Move::new(from, to, mover, captured, piece::NONE));
    }
}

fn push_castling_moves(position: &Position, move_list: &mut MoveList) {
    let color = position.side_to_move();
    let occupancy = position.both_occupancies();
    let rights = position.castling_rights();
    let king = piece::code(piece::KING, color);

    // (right, empty-between mask, king from/to, traversed square)
    let candidates: [(u64, u64, Square, Square, Square); 2] = match color {
        Color::White => [
            (Castling::WK, 0x60, 4, 6, 5),
            (Castling::WQ, 0x0e, 4, 2, 3),
        ],
        Color::Black => [
            (Castling::BK, 0x60 << 56, 60, 62, 61),
            (Castling::BQ, 0x0e << 56, 60, 58, 59),
        ],
    };

    for (right, between, from, to, traversed) in candidates {
        // The landing square's safety is left to the legality filter
        if rights & right != 0
            && occupancy & between == 0
            && !is_square_attacked(from, color.toggle(), position)
            && !is_square_attacked(traversed, color.toggle(), position)
        {
            move_list.push(Move::new(from, to, king, piece::NONE, piece::NONE));
        }
    }
}

/// Generates moves for the side to move. `tactical_only` restricts targets
/// to the opponent's occupancy (plus en passant); `legal_only` keeps only
/// moves that do not leave the mover in check, verified by applying each
/// move and probing the resulting position.
pub fn generate(position: &Position, legal_only: bool, tactical_only: bool) -> MoveList {
    let mut move_list = MoveList::new();
    let color = position.side_to_move();
    let friendly = position.occupancy(color);
    let enemy = position.occupancy(color.toggle());
    let occupancy = friendly | enemy;
    let targets = if tactical_only { enemy } else { !friendly };

    let push_piece_moves =
        |move_list: &mut MoveList, mover: u8, from: Square, attacks: u64| {
            for to in (attacks & targets).ones_iter() {
                move_list.push(Move::new(from, to, mover, position.piece_at(to), piece::NONE));
            }
        };

    let king = piece::code(piece::KING, color);
    for from in position.pieces(king).ones_iter() {
        push_piece_moves(
            &mut move_list,
            king,
            from,
            tables::KING_ATTACKS[from as usize],
        );
    }
    if !tactical_only {
        push_castling_moves(position, &mut move_list);
    }

    let knight = piece::code(piece::KNIGHT, color);
    for from in position.pieces(knight).ones_iter() {
        push_piece_moves(
            &mut move_list,
            knight,
            from,
            tables::KNIGHT_ATTACKS[from as usize],
        );
    }

    let pawn = piece::code(piece::PAWN, color);
    let en_passant_bit = position.en_passant_square().map_or(0u64, bit);
    for from in position.pieces(pawn).ones_iter() {
        let captures = gen_pawn_captures(from, enemy | en_passant_bit, color);
        for to in captures.ones_iter() {
            // the en-passant victim is not on the target square
            push_pawn_moves(from, to, pawn, position.piece_at(to), &mut move_list);
        }
        if !tactical_only {
            for to in gen_pawn_pushes(from, occupancy, color).ones_iter() {
                push_pawn_moves(from, to, pawn, piece::NONE, &mut move_list);
            }
        }
    }

    let bishop = piece::code(piece::BISHOP, color);
    for from in position.pieces(bishop).ones_iter() {
        push_piece_moves(&mut move_list, bishop, from, SLIDING.bishop(from, occupancy));
    }

    let rook = piece::code(piece::ROOK, color);
    for from in position.pieces(rook).ones_iter() {
        push_piece_moves(&mut move_list, rook, from, SLIDING.rook(from, occupancy));
    }

    let queen = piece::code(piece::QUEEN, color);
    for from in position.pieces(queen).ones_iter() {
        push_piece_moves(
            &mut move_list,
            queen,
            from,
            SLIDING.bishop(from, occupancy) | SLIDING.rook(from, occupancy),
        );
    }

    if legal_only {
        move_list.retain(|&mov| !position.make_move(mov).is_in_check(color));
    }

    move_list
}
