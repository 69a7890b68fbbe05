use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crate::{
    chess::*,
    engine::{
        evaluation::evaluate,
        ordering::{order_moves, order_root, see},
        transposition::{Bound, TT, decode_mate, encode_mate},
    },
    send,
};
use tinyvec::ArrayVec;

pub const MAX_PLY: usize = 64;
pub const INF: i32 = 1_000_000;
pub const MATE: i32 = 900_000;
pub const MATE_THRESHOLD: i32 = MATE - 2 * MAX_PLY as i32;

/// Recursion entries poll the halt sources through a node counter, so the
/// clock read happens once per batch.
const HALT_CHECKPOINT: u64 = 1023;

pub type PvLine = ArrayVec<[Move; MAX_PLY]>;

#[derive(Clone, Copy, Default, Debug)]
pub struct ClockTime {
    pub white_time_ms: u64,
    pub black_time_ms: u64,
    pub white_increment_ms: u64,
    pub black_increment_ms: u64,
}

#[derive(Clone, Copy)]
pub enum TimeControl {
    MoveTime(u64),
    Depth(usize),
    Clock(ClockTime),
    Infinite,
}

pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
    pub pv: PvLine,
    pub nodes: u64,
}

pub struct Searcher {
    root: Position,
    stop: Arc<AtomicBool>,
    tt: Option<Arc<TT>>,

    deadline: Option<Instant>,
    halted: bool,
    nodes: u64,
}

impl Searcher {
    pub fn new(root: Position, stop: Arc<AtomicBool>, tt: Option<Arc<TT>>) -> Searcher {
        Searcher {
            root,
            stop,
            tt,
            deadline: None,
            halted: false,
            nodes: 0,
        }
    }

    pub fn start_search(&mut self, control: TimeControl) -> SearchResult {
        let (max_depth, budget_ms) = match control {
            TimeControl::Depth(depth) => (depth.clamp(1, MAX_PLY - 1), None),
            TimeControl::MoveTime(millis) => (MAX_PLY - 1, Some(millis)),
            TimeControl::Clock(clock) => {
                let (time_ms, increment_ms) = match self.root.side_to_move() {
                    Color::White => (clock.white_time_ms, clock.white_increment_ms),
                    Color::Black => (clock.black_time_ms, clock.black_increment_ms),
                };
                // https://www.chessprogramming.org/Time_Management#Basic_TM
                let base = (time_ms / 20 + increment_ms / 2).min(time_ms.max(1));
                (MAX_PLY - 1, Some(base))
            }
            TimeControl::Infinite => (MAX_PLY - 1, None),
        };

        self.deadline = budget_ms.map(|millis| Instant::now() + Duration::from_millis(millis));
        self.halted = false;
        self.nodes = 0;

        self.iterative_deepening(max_depth)
    }

    /// Forced poll of the halt sources, used at root-iteration boundaries.
    fn poll_halt(&mut self) -> bool {
        if !self.halted {
            self.halted = self.stop.load(Ordering::Relaxed)
                || self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        }
        self.halted
    }

    /// Node-gated poll used inside the recursion.
    #[inline(always)]
    fn should_halt(&mut self) -> bool {
        if self.halted {
            return true;
        }
        if self.nodes & HALT_CHECKPOINT == 0 {
            return self.poll_halt();
        }
        false
    }

    fn print_info(&self, depth: usize, score: i32, pv: &[Move], elapsed: Duration) {
        let score_str = if score.abs() > MATE_THRESHOLD {
            let mate_in = (MATE - score.abs() + 1) / 2;
            format!("mate {}", if score > 0 { mate_in } else { -mate_in })
        } else {
            format!("cp {score}")
        };

        send!(
            "info depth {} score {} nodes {} time {} pv {}",
            depth,
            score_str,
            self.nodes,
            elapsed.as_millis().max(1),
            pv.iter()
                .map(|mov| mov.to_uci())
                .reduce(|a, b| format!("{a} {b}"))
                .unwrap_or_default()
        );
    }

    fn iterative_deepening(&mut self, max_depth: usize) -> SearchResult {
        let root_moves = generate(&self.root, true, false);
        if root_moves.is_empty() {
            let color = self.root.side_to_move();
            return SearchResult {
                best_move: Move::NULL,
                score: if self.root.is_in_check(color) { -MATE } else { 0 },
                pv: PvLine::new(),
                nodes: 0,
            };
        }

        // First ordering comes from one-ply static evaluations; later
        // iterations re-sort on the scores carried from the previous depth.
        let mut scored: Vec<(Move, i32)> = root_moves
            .iter()
            .map(|&mov| (mov, -evaluate(&self.root.make_move(mov))))
            .collect();
        order_root(&mut scored);

        let mut best_move = scored[0].0;
        let mut best_score = scored[0].1;
        let mut best_pv = PvLine::new();
        let start = Instant::now();
        let mut depth = max_depth.min(2);

        loop {
            let mut step_best = Move::NULL;
            let mut step_score = -INF;
            let mut step_pv = PvLine::new();

            for (mov, carried) in scored.iter_mut() {
                if self.poll_halt() {
                    break;
                }

                let child = self.root.make_move(*mov);
                let mut child_pv = PvLine::new();
                let score = -self.negamax(&child, depth - 1, -INF, INF, 1, &mut child_pv);
                if self.halted {
                    // degraded score, never let it pick a move
                    break;
                }

                *carried = score;
                if score > step_score {
                    step_score = score;
                    step_best = *mov;
                    step_pv.clear();
                    step_pv.push(*mov);
                    step_pv.extend(child_pv.iter().copied());
                }
            }

            if step_best != Move::NULL {
                best_move = step_best;
                best_score = step_score;
                best_pv = step_pv;
                self.print_info(depth, best_score, &best_pv, start.elapsed());
            }

            if self.halted || depth >= max_depth {
                break;
            }

            order_root(&mut scored);
            depth += if max_depth - depth == 1 { 1 } else { 2 };
        }

        SearchResult {
            best_move,
            score: best_score,
            pv: best_pv,
            nodes: self.nodes,
        }
    }

    /// Fail-hard alpha-beta. Generates pseudo-legal moves and re-checks
    /// legality per child, which beats pre-filtering at pruned nodes.
    fn negamax(
        &mut self,
        position: &Position,
        depth: usize,
        mut alpha: i32,
        beta: i32,
        ply: usize,
        pv: &mut PvLine,
    ) -> i32 {
        self.nodes += 1;
        if self.should_halt() {
            return alpha;
        }
        if depth < 1 || ply >= MAX_PLY {
            pv.clear();
            return self.quiescence(position, alpha, beta, ply);
        }

        let key = position.0[HASH];
        if let Some(tt) = self.tt.as_deref()
            && let Some(entry) = tt.probe(key)
            && entry.depth as usize == depth
        {
            // Take the entry only when it decides the node at the window
            // boundary, exactly as the full search would, so the table never
            // changes results. An interior exact score is searched anyway:
            // shortcutting there would truncate the principal variation.
            let score = decode_mate(entry.score, ply);
            match entry.bound {
                Bound::Exact | Bound::Lower if score >= beta => return beta,
                Bound::Exact | Bound::Upper if score <= alpha => return alpha,
                _ => {}
            }
        }

        let color = position.side_to_move();
        let mut move_list = generate(position, false, false);
        order_moves(position, &mut move_list);

        let mut legal_moves = 0;
        let mut best_move = Move::NULL;
        let mut raised_alpha = false;

        for mov in move_list {
            let child = position.make_move(mov);
            if child.is_in_check(color) {
                continue;
            }
            legal_moves += 1;

            let mut child_pv = PvLine::new();
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, ply + 1, &mut child_pv);
            if self.halted {
                return alpha;
            }

            if score >= beta {
                if let Some(tt) = self.tt.as_deref() {
                    tt.save(key, encode_mate(beta, ply), depth, Bound::Lower, mov);
                }
                return beta;
            }
            if score > alpha {
                alpha = score;
                best_move = mov;
                raised_alpha = true;
                pv.clear();
                pv.push(mov);
                pv.extend(child_pv.iter().copied());
            }
        }

        if legal_moves == 0 {
            pv.clear();
            return if position.is_in_check(color) {
                -(MATE - ply as i32)
            } else {
                0 // stalemate
            };
        }

        if let Some(tt) = self.tt.as_deref() {
            let bound = if raised_alpha { Bound::Exact } else { Bound::Upper };
            tt.save(key, encode_mate(alpha, ply), depth, bound, best_move);
        }
        alpha
    }

    /// Captures-only extension at the leaf frontier. Mates are resolved by
    /// the full-width search, never here.
    fn quiescence(&mut self, position: &Position, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.nodes += 1;
        if self.should_halt() {
            return alpha;
        }

        let stand_pat = evaluate(position);
        if stand_pat >= beta {
            return beta;
        }
        // delta pruning: even winning a queen cannot recover this line
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
        let mut move_list = generate(position, false, true);
        order_moves(position, &mut move_list);

        // With a lone enemy king (or king plus one piece) the exchange
        // filter would prune legitimate lines, so it is disabled.
        let filter_exchanges = position.material_piece_count(color.toggle()) > 1;

        for mov in move_list {
            if filter_exchanges && losing_exchange(position, mov) {
                continue;
            }

            let child = position.make_move(mov);
            if child.is_in_check(color) {
                continue;
            }

            let score = -self.quiescence(&child, -beta, -alpha, ply + 1);
            if self.halted {
                return alpha;
            }

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

/// True when a higher-valued piece grabs a lower-valued one and the
/// exchange simulation confirms the recapture refutes it.
fn losing_exchange(position: &Position, mov: Move) -> bool {
    let captured = mov.get_captured();
    let victim_value = if captured != piece::NONE {
        piece::VALUES[piece::kind(captured) as usize]
    } else {
        // en-passant victim is a pawn; pawn takes pawn is never losing
        return false;
    };
    let mover_value = piece::VALUES[piece::kind(mov.get_mover()) as usize];

    mover_value > victim_value && see(position, mov.get_from(), mov.get_to()) < 0
}
