use crate::chess::attacks::movegen::{generate, is_square_attacked};
use crate::chess::zobrist::*;
use thiserror::Error;

pub const BOARD_WIDTH: usize = 8;
pub const BOARD_SIZE: usize = 64;

pub type Square = u8;

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub fn toggle(self) -> Color {
        [Color::White, Color::Black][self as usize ^ 1]
    }
}

/// 4-bit piece codes: 3-bit kind | color << 3. The code doubles as the
/// index of the piece's bitboard inside the position array.
pub mod piece {
    use super::Color;

    pub const NONE: u8 = 0;
    pub const KING: u8 = 1;
    pub const QUEEN: u8 = 2;
    pub const ROOK: u8 = 3;
    pub const BISHOP: u8 = 4;
    pub const KNIGHT: u8 = 5;
    pub const PAWN: u8 = 6;

    pub const KIND_MASK: u8 = 7;
    pub const COLOR_BIT: u8 = 8;

    pub const KINDS: [u8; 6] = [KING, QUEEN, ROOK, BISHOP, KNIGHT, PAWN];

    /// Indexed by kind. The king's value only matters to exchange
    /// simulation, where it must dwarf everything else.
    pub const VALUES: [i32; 7] = [0, 20_000, 900, 500, 330, 320, 100];

    #[inline(always)]
    pub fn code(kind: u8, color: Color) -> u8 {
        debug_assert!(kind != NONE && kind <= PAWN);
        kind | (color as u8) << 3
    }

    #[inline(always)]
    pub fn kind(code: u8) -> u8 {
        code & KIND_MASK
    }

    #[inline(always)]
    pub fn color(code: u8) -> Color {
        debug_assert!(kind(code) != NONE);
        [Color::White, Color::Black][(code >> 3) as usize]
    }

    pub fn kind_from_char(letter: char) -> Option<u8> {
        match letter.to_ascii_lowercase() {
            'k' => Some(KING),
            'q' => Some(QUEEN),
            'r' => Some(ROOK),
            'b' => Some(BISHOP),
            'n' => Some(KNIGHT),
            'p' => Some(PAWN),
            _ => None,
        }
    }

    pub fn to_char(code: u8) -> char {
        let letter = match kind(code) {
            KING => 'K',
            QUEEN => 'Q',
            ROOK => 'R',
            BISHOP => 'B',
            KNIGHT => 'N',
            PAWN => 'P',
            _ => return ' ',
        };
        if color(code) == Color::Black {
            letter.to_ascii_lowercase()
        } else {
            letter
        }
    }
}

pub struct Castling;
impl Castling {
    pub const WK: u64 = 1;
    pub const WQ: u64 = 2;
    pub const BK: u64 = 4;
    pub const BQ: u64 = 8;
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FenError {
    #[error("missing FEN field: {0}")]
    MissingField(&'static str),
    #[error("invalid piece placement")]
    BadPlacement,
    #[error("invalid piece character {0:?}")]
    BadPiece(char),
    #[error("side to move must be 'w' or 'b'")]
    BadSideToMove,
    #[error("the king of the side not to move is capturable")]
    KingCapturable,
}

/// A full position in 16 words:
/// - 0, 8: white/black occupancy
/// - 1..=6, 9..=14: piece bitboards, indexed directly by piece code
/// - 7: packed status (see the `status` constants)
/// - 15: Zobrist key
///
/// Positions are immutable snapshots: `make_move` and `null_move` return
/// new values and callers keep history by retaining old ones.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position(pub [u64; 16]);

pub const OCC_WHITE: usize = 0;
pub const OCC_BLACK: usize = 8;
pub const STATUS: usize = 7;
pub const HASH: usize = 15;

/// Status word layout:
/// bit 0       side to move (0 = white)
/// bits 1..5   castling rights (WK, WQ, BK, BQ)
/// bits 5..11  en-passant target square
/// bits 11..18 halfmove clock
/// bits 18..28 fullmove number
pub mod status {
    pub const SIDE_BIT: u64 = 1;
    pub const CASTLE_SHIFT: u32 = 1;
    pub const CASTLE_MASK: u64 = 0xf;
    pub const EP_SHIFT: u32 = 5;
    pub const EP_MASK: u64 = 0x3f;
    pub const HALFMOVE_SHIFT: u32 = 11;
    pub const HALFMOVE_MASK: u64 = 0x7f;
    pub const FULLMOVE_SHIFT: u32 = 18;
    pub const FULLMOVE_MASK: u64 = 0x3ff;

    // A stored en-passant square is meaningful only inside the rank window
    // matching the side to move: white recaptures on rank 6, black on rank 3.
    pub const WHITE_EP_WINDOW: u64 = 0x0000_ff00_0000_0000;
    pub const BLACK_EP_WINDOW: u64 = 0x0000_0000_00ff_0000;
}

impl Position {
    pub fn startpos() -> Position {
        match Position::from_fen(STARTPOS_FEN) {
            Ok(position) => position,
            Err(_) => unreachable!("the starting position is valid"),
        }
    }

    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        [Color::White, Color::Black][(self.0[STATUS] & status::SIDE_BIT) as usize]
    }

    #[inline(always)]
    pub fn castling_rights(&self) -> u64 {
        (self.0[STATUS] >> status::CASTLE_SHIFT) & status::CASTLE_MASK
    }

    /// The en-passant target, filtered through the color-specific rank
    /// window so a stale or absent square reads as `None`.
    #[inline(always)]
    pub fn en_passant_square(&self) -> Option<Square> {
        let square = ((self.0[STATUS] >> status::EP_SHIFT) & status::EP_MASK) as Square;
        let window = match self.side_to_move() {
            Color::White => status::WHITE_EP_WINDOW,
            Color::Black => status::BLACK_EP_WINDOW,
        };
        (bit(square) & window != 0).then_some(square)
    }

    #[inline(always)]
    pub fn halfmove_clock(&self) -> u64 {
        (self.0[STATUS] >> status::HALFMOVE_SHIFT) & status::HALFMOVE_MASK
    }

    #[inline(always)]
    pub fn fullmove_number(&self) -> u64 {
        (self.0[STATUS] >> status::FULLMOVE_SHIFT) & status::FULLMOVE_MASK
    }

    #[inline(always)]
    pub fn occupancy(&self, color: Color) -> u64 {
        self.0[(color as usize) << 3]
    }

    #[inline(always)]
    pub fn both_occupancies(&self) -> u64 {
        self.0[OCC_WHITE] | self.0[OCC_BLACK]
    }

    #[inline(always)]
    pub fn pieces(&self, code: u8) -> u64 {
        self.0[code as usize]
    }

    #[inline(always)]
    pub fn king_square(&self, color: Color) -> Square {
        let king = self.pieces(piece::code(piece::KING, color));
        debug_assert!(king != 0);
        king.trailing_zeros() as Square
    }

    pub fn piece_at(&self, square: Square) -> u8 {
        let square_bit = bit(square);
        let color = if self.0[OCC_WHITE] & square_bit != 0 {
            Color::White
        } else if self.0[OCC_BLACK] & square_bit != 0 {
            Color::Black
        } else {
            return piece::NONE;
        };

        for kind in piece::KINDS {
            let code = piece::code(kind, color);
            if self.pieces(code) & square_bit != 0 {
                return code;
            }
        }
        unreachable!("occupancy bit without a piece bit at square {square}")
    }

    #[inline(always)]
    pub fn is_in_check(&self, color: Color) -> bool {
        is_square_attacked(self.king_square(color), color.toggle(), self)
    }

    /// Knights, bishops, rooks and queens of `color`. Pawn-only endgames
    /// relax the quiescence exchange filter.
    pub fn material_piece_count(&self, color: Color) -> u32 {
        [piece::QUEEN, piece::ROOK, piece::BISHOP, piece::KNIGHT]
            .iter()
            .map(|&kind| self.pieces(piece::code(kind, color)).count_ones())
            .sum()
    }

    /// Hash component of the current en-passant file, zero when no valid
    /// target is set.
    #[inline(always)]
    pub(crate) fn ep_hash(&self) -> u64 {
        self.en_passant_square().map_or(0u64, |square| {
            ZOBRIST_EN_PASSANT[(square % BOARD_WIDTH as Square) as usize]
        })
    }

    /// Full recomputation of the Zobrist key, for consistency checks. Black
    /// to move is expressed as the bitwise complement of the XOR
    /// accumulation; `make_move` relies on complementing commuting with XOR
    /// to maintain the key incrementally.
    pub fn calculate_hash(&self) -> u64 {
        let mut hash = 0u64;

        for color in [Color::White, Color::Black] {
            for kind in piece::KINDS {
                let code = piece::code(kind, color);
                for square in self.pieces(code).ones_iter() {
                    hash ^= ZOBRIST_PIECE[code as usize][square as usize];
                }
            }
        }
        hash ^= ZOBRIST_CASTLING[self.castling_rights() as usize];
        hash ^= self.ep_hash();

        match self.side_to_move() {
            Color::White => hash,
            Color::Black => !hash,
        }
    }

    fn parse_placement(&mut self, part: &str) -> Result<(), FenError> {
        let mut rank: u8 = BOARD_WIDTH as u8 - 1;
        let mut file: u8 = 0;

        for chr in part.chars() {
            match chr {
                '/' => {
                    if rank == 0 {
                        return Err(FenError::BadPlacement);
                    }
                    rank -= 1;
                    file = 0;
                }
                c if c.is_ascii_digit() => {
                    file += c.to_digit(10).map_or(0, |d| d as u8);
                }
                c => {
                    let kind = piece::kind_from_char(c).ok_or(FenError::BadPiece(c))?;
                    let color = if c.is_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    if file >= BOARD_WIDTH as u8 {
                        return Err(FenError::BadPlacement);
                    }
                    let square_bit = bit(to_square(rank as i8, file as i8));
                    self.0[piece::code(kind, color) as usize] |= square_bit;
                    self.0[(color as usize) << 3] |= square_bit;
                    file += 1;
                }
            }
        }

        if rank != 0 || file != BOARD_WIDTH as u8 {
            return Err(FenError::BadPlacement);
        }
        Ok(())
    }

    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let mut tokens = fen.split_whitespace();
        let mut position = Position([0u64; 16]);

        let placement = tokens.next().ok_or(FenError::MissingField("placement"))?;
        position.parse_placement(placement)?;

        let side = match tokens.next().and_then(|s| s.chars().next()) {
            Some('w') => Color::White,
            Some('b') => Color::Black,
            _ => return Err(FenError::BadSideToMove),
        };

        let mut rights = 0u64;
        if let Some(castling_part) = tokens.next() {
            for chr in castling_part.chars() {
                rights |= match chr {
                    'K' => Castling::WK,
                    'Q' => Castling::WQ,
                    'k' => Castling::BK,
                    'q' => Castling::BQ,
                    _ => 0,
                };
            }
        }

        let mut en_passant: u64 = 0;
        if let Some(en_passant_part) = tokens.next() {
            let mut chars = en_passant_part.chars();
            if let (Some(file_char @ 'a'..='h'), Some(rank_char @ '1'..='8')) =
                (chars.next(), chars.next())
            {
                let file = (file_char as u8) - b'a';
                let rank = rank_char as u8 - b'1';
                let square = to_square(rank as i8, file as i8);
                let window = match side {
                    Color::White => status::WHITE_EP_WINDOW,
                    Color::Black => status::BLACK_EP_WINDOW,
                };
                // normalize: a target outside the window is dropped
                if bit(square) & window != 0 {
                    en_passant = square as u64;
                }
            }
        }

        let halfmove = tokens
            .next()
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or(0)
            .min(status::HALFMOVE_MASK);
        let fullmove = tokens
            .next()
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or(1)
            .min(status::FULLMOVE_MASK);

        position.0[STATUS] = (side as u64)
            | rights << status::CASTLE_SHIFT
            | en_passant << status::EP_SHIFT
            | halfmove << status::HALFMOVE_SHIFT
            | fullmove << status::FULLMOVE_SHIFT;
        position.0[HASH] = position.calculate_hash();

        // Reject placements where the side to move could take a king
        let captures = generate(&position, false, true);
        if captures
            .iter()
            .any(|m| piece::kind(m.get_captured()) == piece::KING)
        {
            return Err(FenError::KingCapturable);
        }

        Ok(position)
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..BOARD_WIDTH as i8).rev() {
            let mut empty_run = 0;
            for file in 0..BOARD_WIDTH as i8 {
                let code = self.piece_at(to_square(rank, file));
                if code == piece::NONE {
                    empty_run += 1;
                } else {
                    if empty_run > 0 {
                        placement.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    placement.push(piece::to_char(code));
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        };

        let rights = self.castling_rights();
        let mut castling = String::new();
        for (flag, chr) in [
            (Castling::WK, 'K'),
            (Castling::WQ, 'Q'),
            (Castling::BK, 'k'),
            (Castling::BQ, 'q'),
        ] {
            if rights & flag != 0 {
                castling.push(chr);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = self.en_passant_square().map_or("-".to_string(), |square| {
            format!(
                "{}{}",
                (b'a' + square % BOARD_WIDTH as Square) as char,
                square / BOARD_WIDTH as Square + 1
            )
        });

        format!(
            "{placement} {side} {castling} {en_passant} {} {}",
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }
}

/// ASCII dump for the `d` debug command: ranks top-down with the FEN
/// appended, so a position can be copied straight out of a session.
impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..BOARD_WIDTH as i8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..BOARD_WIDTH as i8 {
                let code = self.piece_at(to_square(rank, file));
                let chr = if code == piece::NONE {
                    '.'
                } else {
                    piece::to_char(code)
                };
                write!(f, " {chr}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "fen: {}", self.to_fen())
    }
}

pub const RANKS: [u64; BOARD_WIDTH] = [
    0xFF,
    0xFF00,
    0xFF0000,
    0xFF000000,
    0xFF00000000,
    0xFF0000000000,
    0xFF000000000000,
    0xFF00000000000000,
];

#[inline(always)]
pub fn to_square(rank: i8, file: i8) -> Square {
    ((rank * BOARD_WIDTH as i8) + file) as Square
}

#[inline(always)]
pub fn valid_axis(axis: i8) -> bool {
    axis >= 0 && axis < BOARD_WIDTH as i8
}

#[inline(always)]
pub fn bit(square: Square) -> u64 {
    1u64 << square
}

pub trait BitboardOnes: Sized + Copy {
    fn ones_iter(self) -> BitboardOnesIter;
}

pub struct BitboardOnesIter {
    bitboard: u64,
}

impl Iterator for BitboardOnesIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.bitboard == 0 {
            None
        } else {
            let sq = self.bitboard.trailing_zeros() as Square;
            self.bitboard &= self.bitboard - 1; // clear lowest set bit
            Some(sq)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let pop = self.bitboard.count_ones() as usize;
        (pop, Some(pop))
    }
}

impl ExactSizeIterator for BitboardOnesIter {}

impl BitboardOnes for u64 {
    fn ones_iter(self) -> BitboardOnesIter {
        BitboardOnesIter { bitboard: self }
    }
}
