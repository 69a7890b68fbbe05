use crate::{
    chess::*,
    engine::{search::*, transposition::TT},
};
use std::{
    str::SplitWhitespace,
    sync::{
        Arc, mpsc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
};

#[macro_export]
macro_rules! send {
    ($($arg:tt)*) => {{
        use std::io::{self, Write};
        println!($($arg)*);
        io::stdout().flush().unwrap();
    }};
}

const TT_MEGABYTES: usize = 16;

/// Engine context: the current position, the snapshot history behind it,
/// the shared halt flag and the transposition table, plus the handle of the
/// worker thread running the search. Commands arrive over a channel fed by
/// a reader thread, so the command path never blocks on the search.
pub struct Uci {
    position: Position,
    history: Vec<Position>,

    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    tt: Arc<TT>,
}

fn perft(position: &Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    generate(position, true, false)
        .iter()
        .map(|&mov| perft(&position.make_move(mov), depth - 1))
        .sum()
}

fn divide(position: &Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for mov in generate(position, true, false) {
        let subtree_nodes = perft(&position.make_move(mov), depth - 1);
        nodes += subtree_nodes;
        send!("{}: {}", mov.to_uci(), subtree_nodes);
    }

    nodes
}

impl Uci {
    pub fn new() -> Uci {
        Uci {
            position: Position::startpos(),
            history: Vec::new(),

            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
            tt: Arc::new(TT::new(TT_MEGABYTES)),
        }
    }

    pub fn run(&mut self) {
        let (sender, receiver) = mpsc::channel::<String>();

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            let mut input = String::new();
            loop {
                input.clear();
                match stdin.read_line(&mut input) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if sender.send(input.clone()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        while let Ok(line) = receiver.recv() {
            if self.execute_command(&mut line.split_whitespace()) {
                break;
            }
        }
    }

    /// return true if is `quit` command
    fn execute_command(&mut self, tokens: &mut SplitWhitespace) -> bool {
        match tokens.next() {
            Some("uci") => {
                send!("id name Flint");
                send!("id author flint developers");
                send!("uciok");
            }
            Some("debug") | Some("setoption") => {}
            Some("isready") => send!("readyok"),
            Some("ucinewgame") => {
                self.stop_and_join();
                self.position = Position::startpos();
                self.history.clear();
                self.tt.clear();
            }
            Some("position") => {
                if let Err(e) = self.handle_position(tokens) {
                    send!("info string position error {e}");
                }
            }
            Some("go") => self.handle_go(tokens),
            Some("d") => send!("{}", self.position),
            Some("stop") => self.stop.store(true, Ordering::Relaxed),
            Some("quit") => {
                self.stop_and_join();
                return true;
            }
            None => {}
            Some(other) => log::warn!("unknown command {other:?}"),
        };

        false
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn handle_position(&mut self, tokens: &mut SplitWhitespace) -> Result<(), FenError> {
        let fen: String = match tokens.next() {
            Some("fen") => tokens
                .by_ref()
                .take_while(|&t| t != "moves")
                .collect::<Vec<&str>>()
                .join(" "),
            _ => STARTPOS_FEN.to_string(), // "startpos"
        };

        self.position = Position::from_fen(&fen)?;
        self.history.clear();
        self.history.push(self.position);

        // After "fen" the take_while above already ate the "moves" token;
        // after "startpos" it is still pending. skip_while covers both.
        for move_uci in tokens.skip_while(|&t| t == "moves") {
            let move_list = generate(&self.position, true, false);
            let Some(&mov) = move_list.iter().find(|m| m.to_uci() == move_uci) else {
                log::debug!("ignoring move {move_uci:?} not in the legal list");
                continue;
            };

            self.position = self.position.make_move(mov);
            self.history.push(self.position);
        }

        Ok(())
    }

    fn handle_go(&mut self, tokens: &mut SplitWhitespace) {
        let mut clock_time = ClockTime::default();
        let mut has_clock_time = false;
        let mut time_control = TimeControl::Infinite;

        while let Some(key) = tokens.next() {
            match key {
                "movetime" | "depth" | "wtime" | "btime" | "winc" | "binc" | "perft" => {
                    let Some(val) = tokens.next() else {
                        continue;
                    };
                    let Ok(val) = val.parse::<u64>() else {
                        continue;
                    };

                    match key {
                        "movetime" => time_control = TimeControl::MoveTime(val),
                        "depth" => time_control = TimeControl::Depth(val as usize),
                        "wtime" => {
                            has_clock_time = true;
                            clock_time.white_time_ms = val;
                        }
                        "btime" => {
                            has_clock_time = true;
                            clock_time.black_time_ms = val;
                        }
                        "winc" => clock_time.white_increment_ms = val,
                        "binc" => clock_time.black_increment_ms = val,
                        "perft" => {
                            send!("Nodes searched: {}", divide(&self.position, val as usize));
                            return; // intentional, perft must not search
                        }
                        _ => unreachable!(),
                    }
                }
                "infinite" => time_control = TimeControl::Infinite,
                _ => {}
            }
        }

        if has_clock_time {
            time_control = TimeControl::Clock(clock_time);
        }

        // A still-running worker keeps the previous search's flag; never
        // share it with the new one.
        self.stop_and_join();
        self.stop = Arc::new(AtomicBool::new(false));

        let mut searcher = Searcher::new(
            self.position,
            Arc::clone(&self.stop),
            Some(Arc::clone(&self.tt)),
        );

        self.worker = Some(std::thread::spawn(move || {
            let result = searcher.start_search(time_control);
            send!("bestmove {}", result.best_move.to_uci());
        }));
    }
}

impl Default for Uci {
    fn default() -> Self {
        Uci::new()
    }
}
