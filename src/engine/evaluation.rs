use crate::chess::attacks::tables::{FILES, FORWARD_RANKS};
use crate::chess::*;

// Material values for scoring (the king carries no material)
const MATERIAL: [i32; 7] = [0, 0, 900, 500, 330, 320, 100];

const PASSED_PAWN_BONUS: [i32; 8] = [0, 5, 10, 20, 35, 60, 100, 0];
const ROOK_OPEN_FILE: i32 = 15;
const ROOK_SEMI_OPEN_FILE: i32 = 7;

// Single-phase tables, white's view, a1 = index 0. Black mirrors with ^56.
#[rustfmt::skip]
const PST: [[i32; BOARD_SIZE]; 7] = [
    [0; BOARD_SIZE],
    // king
    [
          0,  15,  10,  -5,   0,  -5,  20,   0,
         -5,  -5, -10, -10, -10, -10,  -5,  -5,
        -10, -15, -20, -25, -25, -20, -15, -10,
        -20, -25, -30, -35, -35, -30, -25, -20,
        -30, -35, -40, -45, -45, -40, -35, -30,
        -30, -35, -40, -45, -45, -40, -35, -30,
        -30, -35, -40, -45, -45, -40, -35, -30,
        -30, -35, -40, -45, -45, -40, -35, -30,
    ],
    // queen
    [
        -10,  -5,  -5,   0,   0,  -5,  -5, -10,
         -5,   0,   5,   5,   5,   5,   0,  -5,
         -5,   5,   5,   5,   5,   5,   5,  -5,
          0,   5,   5,   5,   5,   5,   5,   0,
          0,   5,   5,   5,   5,   5,   5,   0,
         -5,   5,   5,   5,   5,   5,   5,  -5,
         -5,   0,   5,   5,   5,   5,   0,  -5,
        -10,  -5,  -5,   0,   0,  -5,  -5, -10,
    ],
    // rook
    [
          0,   0,   5,  10,  10,   5,   0,   0,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
          5,  10,  10,  10,  10,  10,  10,   5,
          0,   0,   0,   0,   0,   0,   0,   0,
    ],
    // bishop
    [
        -20, -10, -10, -10, -10, -10, -10, -20,
        -10,   5,   0,   0,   0,   0,   5, -10,
        -10,  10,  10,  10,  10,  10,  10, -10,
        -10,   0,  10,  10,  10,  10,   0, -10,
        -10,   5,   5,  10,  10,   5,   5, -10,
        -10,   0,   5,  10,  10,   5,   0, -10,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -20, -10, -10, -10, -10, -10, -10, -20,
    ],
    // knight
    [
        -50, -40, -30, -30, -30, -30, -40, -50,
        -40, -20,   0,   5,   5,   0, -20, -40,
        -30,   5,  10,  15,  15,  10,   5, -30,
        -30,   0,  15,  20,  20,  15,   0, -30,
        -30,   5,  15,  20,  20,  15,   5, -30,
        -30,   0,  10,  15,  15,  10,   0, -30,
        -40, -20,   0,   0,   0,   0, -20, -40,
        -50, -40, -30, -30, -30, -30, -40, -50,
    ],
    // pawn
    [
          0,   0,   0,   0,   0,   0,   0,   0,
          5,  10,  10, -20, -20,  10,  10,   5,
          5,  -5, -10,   0,   0, -10,  -5,   5,
          0,   0,   0,  20,  20,   0,   0,   0,
          5,   5,  10,  25,  25,  10,   5,   5,
         10,  10,  20,  30,  30,  20,  10,  10,
         50,  50,  50,  50,  50,  50,  50,  50,
          0,   0,   0,   0,   0,   0,   0,   0,
    ],
];

#[inline(always)]
fn pawn_span(file: usize) -> u64 {
    let mut span = FILES[file];
    if file > 0 {
        span |= FILES[file - 1];
    }
    if file < BOARD_WIDTH - 1 {
        span |= FILES[file + 1];
    }
    span
}

fn color_score(position: &Position, color: Color) -> i32 {
    let mut score = 0;
    let enemy_pawns = position.pieces(piece::code(piece::PAWN, color.toggle()));
    let own_pawns = position.pieces(piece::code(piece::PAWN, color));

    for kind in piece::KINDS {
        let code = piece::code(kind, color);
        for square in position.pieces(code).ones_iter() {
            let pst_square = match color {
                Color::White => square,
                Color::Black => square ^ 56, // vertical mirror
            } as usize;
            score += MATERIAL[kind as usize] + PST[kind as usize][pst_square];

            let rank = (square / BOARD_WIDTH as Square) as usize;
            let file = (square % BOARD_WIDTH as Square) as usize;
            match kind {
                piece::PAWN => {
                    let ahead = FORWARD_RANKS[color as usize][rank] & pawn_span(file);
                    if ahead & enemy_pawns == 0 {
                        let steps = match color {
                            Color::White => rank,
                            Color::Black => BOARD_WIDTH - 1 - rank,
                        };
                        score += PASSED_PAWN_BONUS[steps];
                    }
                }
                piece::ROOK => {
                    if FILES[file] & (own_pawns | enemy_pawns) == 0 {
                        score += ROOK_OPEN_FILE;
                    } else if FILES[file] & own_pawns == 0 {
                        score += ROOK_SEMI_OPEN_FILE;
                    }
                }
                _ => {}
            }
        }
    }

    score
}

/// Static score in centipawns from the side to move's perspective.
pub fn evaluate(position: &Position) -> i32 {
    let score = color_score(position, Color::White) - color_score(position, Color::Black);

    match position.side_to_move() {
        Color::White => score,
        Color::Black => -score,
    }
}
