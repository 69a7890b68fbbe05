use crate::chess::{moves::Move, position::*, zobrist::*};

#[inline(always)]
fn rook_right(square: Square) -> u64 {
    match square {
        0 => Castling::WQ,  // a1
        7 => Castling::WK,  // h1
        56 => Castling::BQ, // a8
        63 => Castling::BK, // h8
        _ => 0,
    }
}

/// Rook relocation keyed by the king's landing square.
#[inline(always)]
fn castling_rook(king_to: Square) -> (Square, Square) {
    match king_to {
        6 => (7, 5),    // h1 -> f1
        2 => (0, 3),    // a1 -> d1
        62 => (63, 61), // h8 -> f8
        58 => (56, 59), // a8 -> d8
        _ => unreachable!("not a castling target"),
    }
}

impl Position {
    #[inline(always)]
    fn toggle_piece(&mut self, square: Square, code: u8, hash_delta: &mut u64) {
        let square_bit = bit(square);
        self.0[code as usize] ^= square_bit;
        self.0[(code as usize) & OCC_BLACK] ^= square_bit; // occupancy word 0 or 8
        *hash_delta ^= ZOBRIST_PIECE[code as usize][square as usize];
    }

    /// Applies a pseudo-legal move and returns the resulting snapshot.
    /// Legality (the mover not left in check) is the caller's concern.
    pub fn make_move(&self, mov: Move) -> Position {
        let mut next = *self;
        let from = mov.get_from();
        let to = mov.get_to();
        let mover = mov.get_mover();
        let captured = mov.get_captured();
        let promotion = mov.get_promotion();
        let kind = piece::kind(mover);
        let color = self.side_to_move();
        let enemy = color.toggle();
        let mut hash_delta = 0u64;

        debug_assert_eq!(piece::color(mover), color);

        next.toggle_piece(from, mover, &mut hash_delta);

        if captured != piece::NONE {
            next.toggle_piece(to, captured, &mut hash_delta);
        } else if kind == piece::PAWN && Some(to) == self.en_passant_square() {
            let target = match color {
                Color::White => to - BOARD_WIDTH as Square,
                Color::Black => to + BOARD_WIDTH as Square,
            };
            next.toggle_piece(target, piece::code(piece::PAWN, enemy), &mut hash_delta);
        } else if kind == piece::KING && from.abs_diff(to) == 2 {
            let (rook_from, rook_to) = castling_rook(to);
            let rook = piece::code(piece::ROOK, color);
            next.toggle_piece(rook_from, rook, &mut hash_delta);
            next.toggle_piece(rook_to, rook, &mut hash_delta);
        }

        let landed = if promotion != piece::NONE {
            promotion
        } else {
            mover
        };
        next.toggle_piece(to, landed, &mut hash_delta);

        // Rebuild the status word
        let old_rights = self.castling_rights();
        let mut rights = old_rights;
        if kind == piece::KING {
            rights &= !match color {
                Color::White => Castling::WK | Castling::WQ,
                Color::Black => Castling::BK | Castling::BQ,
            };
        } else if kind == piece::ROOK {
            rights &= !rook_right(from);
        }
        if piece::kind(captured) == piece::ROOK {
            rights &= !rook_right(to);
        }

        let en_passant = if kind == piece::PAWN && from.abs_diff(to) == 2 * BOARD_WIDTH as u8 {
            ((from + to) / 2) as u64
        } else {
            0
        };

        let halfmove = if kind == piece::PAWN || captured != piece::NONE {
            0
        } else {
            (self.halfmove_clock() + 1).min(status::HALFMOVE_MASK)
        };

        let fullmove = (self.fullmove_number() + color as u64).min(status::FULLMOVE_MASK);

        next.0[STATUS] = (enemy as u64)
            | rights << status::CASTLE_SHIFT
            | en_passant << status::EP_SHIFT
            | halfmove << status::HALFMOVE_SHIFT
            | fullmove << status::FULLMOVE_SHIFT;

        if rights != old_rights {
            hash_delta ^= ZOBRIST_CASTLING[old_rights as usize];
            hash_delta ^= ZOBRIST_CASTLING[rights as usize];
        }
        hash_delta ^= self.ep_hash();
        hash_delta ^= next.ep_hash();

        // The complement flips side to move and commutes with the XOR deltas
        next.0[HASH] = !(self.0[HASH] ^ hash_delta);

        debug_assert_eq!(next.0[HASH], next.calculate_hash());
        next
    }

    /// Flips the side to move and clears the en-passant target, touching
    /// nothing else.
    ///
    /// # Preconditions (caller-enforced)
    /// - the side to move is not in check
    /// - never applied twice in a row
    pub fn null_move(&self) -> Position {
        let mut next = *self;
        let ep_component = self.ep_hash();

        next.0[STATUS] =
            (self.0[STATUS] ^ status::SIDE_BIT) & !(status::EP_MASK << status::EP_SHIFT);
        next.0[HASH] = !(self.0[HASH] ^ ep_component);

        debug_assert_eq!(next.0[HASH], next.calculate_hash());
        next
    }
}
