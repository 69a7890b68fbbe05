use crate::chess::position::*;
use tinyvec::ArrayVec;

/// Bound on the branching factor of any reachable position; the richest
/// known legal position offers 218 moves. Overflowing it panics, which is
/// the right outcome: it would mean the generator itself is broken.
pub const MAX_MOVES: usize = 256;

pub type MoveList = ArrayVec<[Move; MAX_MOVES]>;

/// A self-describing packed move:
///
/// bits 0..6   start square
/// bits 6..12  target square
/// bits 12..16 promotion piece code (0 = none)
/// bits 16..20 moving piece code
/// bits 20..24 captured piece code (0 = none; en-passant captures also
///             encode 0 and are recognized by the pawn landing on the
///             en-passant square)
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[repr(transparent)]
pub struct Move(pub u32);

impl Move {
    pub const NULL: Move = Move(0);

    #[inline(always)]
    pub fn new(from: Square, to: Square, mover: u8, captured: u8, promotion: u8) -> Self {
        debug_assert!(from < BOARD_SIZE as u8 && to < BOARD_SIZE as u8);
        debug_assert!(piece::kind(mover) != piece::NONE);

        Move(
            from as u32
                | (to as u32) << 6
                | (promotion as u32) << 12
                | (mover as u32) << 16
                | (captured as u32) << 20,
        )
    }

    #[inline(always)]
    pub fn get_from(self) -> Square {
        (self.0 & 0x3f) as Square
    }

    #[inline(always)]
    pub fn get_to(self) -> Square {
        (self.0 >> 6 & 0x3f) as Square
    }

    #[inline(always)]
    pub fn get_promotion(self) -> u8 {
        (self.0 >> 12 & 0xf) as u8
    }

    #[inline(always)]
    pub fn get_mover(self) -> u8 {
        (self.0 >> 16 & 0xf) as u8
    }

    #[inline(always)]
    pub fn get_captured(self) -> u8 {
        (self.0 >> 20 & 0xf) as u8
    }

    pub fn to_uci(self) -> String {
        if self == Move::NULL {
            return "0000".to_string();
        }

        let from_square = self.get_from();
        let to_square = self.get_to();

        let coords = format!(
            "{}{}{}{}",
            (b'a' + from_square % BOARD_WIDTH as u8) as char,
            from_square / BOARD_WIDTH as u8 + 1,
            (b'a' + to_square % BOARD_WIDTH as u8) as char,
            to_square / BOARD_WIDTH as u8 + 1,
        );

        let promotion = self.get_promotion();
        if promotion != piece::NONE {
            let letter = match piece::kind(promotion) {
                piece::QUEEN => 'q',
                piece::ROOK => 'r',
                piece::BISHOP => 'b',
                piece::KNIGHT => 'n',
                _ => '?',
            };
            format!("{coords}{letter}")
        } else {
            coords
        }
    }
}
