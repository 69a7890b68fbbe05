use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use flint::chess::*;
use flint::engine::evaluation::evaluate;
use flint::engine::ordering::see;
use flint::engine::search::{INF, MATE, MATE_THRESHOLD, MAX_PLY, Searcher, TimeControl};
use flint::engine::transposition::TT;

fn minimax(position: &Position, depth: usize, ply: usize) -> i32 {
    if depth == 0 {
        return evaluate(position);
    }

    let move_list = generate(position, true, false);
    if move_list.is_empty() {
        return if position.is_in_check(position.side_to_move()) {
            -(MATE - ply as i32)
        } else {
            0
        };
    }

    let mut best_score = -INF;
    for mov in move_list {
        let score = -minimax(&position.make_move(mov), depth - 1, ply + 1);
        best_score = best_score.max(score);
    }
    best_score
}

fn alpha_beta(position: &Position, mut alpha: i32, beta: i32, depth: usize, ply: usize) -> i32 {
    if depth == 0 {
        return evaluate(position);
    }

    let move_list = generate(position, true, false);
    if move_list.is_empty() {
        return if position.is_in_check(position.side_to_move()) {
            -(MATE - ply as i32)
        } else {
            0
        };
    }

    let mut best_score = -INF;
    for mov in move_list {
        let score = -alpha_beta(&position.make_move(mov), -beta, -alpha, depth - 1, ply + 1);
        best_score = best_score.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }
    best_score
}

fn losing_capture(position: &Position, mov: Move) -> bool {
    let captured = mov.get_captured();
    if captured == piece::NONE {
        return false;
    }
    let victim = piece::VALUES[piece::kind(captured) as usize];
    let attacker = piece::VALUES[piece::kind(mov.get_mover()) as usize];

    attacker > victim && see(position, mov.get_from(), mov.get_to()) < 0
}

// Mirrors the engine's quiescence so the full-width reference below shares
// its leaf values.
fn quiescence(position: &Position, mut alpha: i32, beta: i32, ply: usize) -> i32 {
    let stand_pat = evaluate(position);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat + piece::VALUES[piece::QUEEN as usize] < alpha {
        return alpha;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }
    if ply >= MAX_PLY {
        return alpha;
    }

    let color = position.side_to_move();
    let filter_exchanges = position.material_piece_count(color.toggle()) > 1;

    for mov in generate(position, false, true) {
        if filter_exchanges && losing_capture(position, mov) {
            continue;
        }
        let child = position.make_move(mov);
        if child.is_in_check(color) {
            continue;
        }

        let score = -quiescence(&child, -beta, -alpha, ply + 1);
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

// Every legal move searched, no window narrowing, no cutoffs; the only
// bounds live inside the shared quiescence leaves.
fn full_width(position: &Position, depth: usize, ply: usize) -> i32 {
    if depth == 0 || ply >= MAX_PLY {
        return quiescence(position, -INF, INF, ply);
    }

    let move_list = generate(position, true, false);
    if move_list.is_empty() {
        return if position.is_in_check(position.side_to_move()) {
            -(MATE - ply as i32)
        } else {
            0
        };
    }

    let mut best_score = -INF;
    for mov in move_list {
        let score = -full_width(&position.make_move(mov), depth - 1, ply + 1);
        best_score = best_score.max(score);
    }
    best_score
}

fn square(name: &str) -> Square {
    let mut chars = name.chars();
    let file = chars.next().unwrap() as i8 - 'a' as i8;
    let rank = chars.next().unwrap() as i8 - '1' as i8;
    to_square(rank, file)
}

#[test]
fn pruning_preserves_the_minimax_score() {
    for fen in [
        STARTPOS_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 0 1",
    ] {
        let position = Position::from_fen(fen).unwrap();
        assert_eq!(
            alpha_beta(&position, -INF, INF, 3, 0),
            minimax(&position, 3, 0),
            "{fen}"
        );
    }
}

#[test]
fn engine_search_matches_a_full_width_reference() {
    for fen in [
        STARTPOS_FEN,
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 0 1",
    ] {
        let position = Position::from_fen(fen).unwrap();
        let (_, score) = search_to_depth(position, 3, None);

        assert_eq!(score, full_width(&position, 3, 0), "{fen}");
    }
}

#[test]
fn see_measures_the_full_exchange() {
    // rook takes an undefended pawn
    let position = Position::from_fen("1k6/8/8/3p4/8/8/3R4/1K6 w - - 0 1").unwrap();
    assert_eq!(see(&position, square("d2"), square("d5")), 100);

    // same capture with the pawn defended by a queen loses the rook
    let position = Position::from_fen("1k6/8/4q3/3p4/8/8/3R4/1K6 w - - 0 1").unwrap();
    assert_eq!(see(&position, square("d2"), square("d5")), -400);
}

fn search_to_depth(position: Position, depth: usize, tt: Option<Arc<TT>>) -> (Move, i32) {
    let stop = Arc::new(AtomicBool::new(false));
    let mut searcher = Searcher::new(position, stop, tt);
    let result = searcher.start_search(TimeControl::Depth(depth));
    (result.best_move, result.score)
}

#[test]
fn finds_mate_in_one() {
    let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    let (best_move, score) = search_to_depth(position, 3, None);

    assert_eq!(best_move.to_uci(), "a1a8");
    assert!(score > MATE_THRESHOLD, "score {score} is not a mate score");
}

#[test]
fn transposition_table_sizing_stays_inside_the_budget() {
    const MIB: usize = 1 << 20;
    const ENTRY_BYTES: usize = 16; // {key, data} pair

    // exact power-of-two budget is kept as is
    assert_eq!(TT::new(16).capacity(), 16 * MIB / ENTRY_BYTES);
    // anything else rounds down, never over the budget
    assert_eq!(TT::new(24).capacity(), 16 * MIB / ENTRY_BYTES);
    assert_eq!(TT::new(100).capacity(), 64 * MIB / ENTRY_BYTES);
}

#[test]
fn table_hits_keep_the_principal_variation_full_length() {
    let position =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    let tt = Arc::new(TT::new(16));

    let search = |tt: Arc<TT>| {
        let stop = Arc::new(AtomicBool::new(false));
        Searcher::new(position, stop, Some(tt)).start_search(TimeControl::Depth(4))
    };

    let first = search(Arc::clone(&tt));
    // the second search replays into a table full of exact entries
    let second = search(tt);

    assert_eq!(first.score, second.score);
    assert_eq!(first.pv.len(), 4);
    assert_eq!(second.pv.len(), 4);
}

#[test]
fn transposition_table_does_not_change_the_score() {
    let position =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();

    let (_, plain_score) = search_to_depth(position, 4, None);
    let (_, tt_score) = search_to_depth(position, 4, Some(Arc::new(TT::new(16))));

    assert_eq!(plain_score, tt_score);
}

#[test]
fn prefers_winning_a_hanging_queen() {
    let position = Position::from_fen("3q2k1/8/8/8/8/8/8/3R2K1 w - - 0 1").unwrap();
    let (best_move, score) = search_to_depth(position, 4, None);

    assert_eq!(best_move.to_uci(), "d1d8");
    assert!(score > 300, "score {score} does not reflect the won queen");
}
