use flint::chess::*;

const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[repr(C, align(16))]
#[derive(Clone, Copy)]
struct PerftTTEntry {
    key: u64,
    nodes: u32,
    depth: u8,
    padding: [u8; 3], // force 16-byte size
}

struct PerftTT {
    table: Box<[PerftTTEntry]>,
    mask: usize,
}

impl PerftTT {
    fn new(megabytes: usize) -> Self {
        const MIB: usize = 1 << 20;
        let entries =
            (megabytes * MIB / std::mem::size_of::<PerftTTEntry>()).next_power_of_two();

        let table = vec![
            PerftTTEntry {
                key: 0,
                nodes: 0,
                depth: 0,
                padding: [0; 3],
            };
            entries
        ]
        .into_boxed_slice();

        Self {
            table,
            mask: entries - 1,
        }
    }

    fn probe(&self, key: u64, depth: u8) -> Option<u32> {
        let e = &self.table[(key as usize) & self.mask];
        (e.key == key && e.depth == depth).then_some(e.nodes)
    }

    fn store(&mut self, key: u64, depth: u8, nodes: u32) {
        let idx = (key as usize) & self.mask;
        let e = &mut self.table[idx];
        if depth >= e.depth {
            *e = PerftTTEntry {
                key,
                nodes,
                depth,
                padding: [0; 3],
            };
        }
    }
}

fn perft(position: &Position, depth: u8, tt: &mut PerftTT) -> u32 {
    assert_eq!(position.0[HASH], position.calculate_hash());

    if depth == 0 {
        return 1;
    }
    let key = position.0[HASH];
    if let Some(nodes) = tt.probe(key, depth) {
        return nodes;
    }

    let mut nodes = 0;
    for mov in generate(position, true, false) {
        nodes += perft(&position.make_move(mov), depth - 1, tt);
    }

    tt.store(key, depth, nodes);
    nodes
}

#[test]
fn perft_startpos() {
    let mut tt = PerftTT::new(16);
    let position = Position::startpos();

    for (depth, expected) in [(1, 20), (2, 400), (3, 8_902), (4, 197_281)] {
        assert_eq!(perft(&position, depth, &mut tt), expected, "depth {depth}");
    }
}

#[test]
fn perft_kiwipete() {
    let mut tt = PerftTT::new(16);
    let position = Position::from_fen(KIWIPETE_FEN).unwrap();

    for (depth, expected) in [(1, 48), (2, 2_039), (3, 97_862)] {
        assert_eq!(perft(&position, depth, &mut tt), expected, "depth {depth}");
    }
}

fn play_uci_moves(mut position: Position, moves: &[&str]) -> Position {
    for move_uci in moves {
        let move_list = generate(&position, true, false);
        let mov = move_list
            .iter()
            .find(|m| m.to_uci() == *move_uci)
            .unwrap_or_else(|| panic!("{move_uci} is not legal in {}", position.to_fen()));
        position = position.make_move(*mov);
    }
    position
}

#[test]
fn zobrist_stays_consistent_through_special_moves() {
    // castling, captures, a double push and an en-passant capture
    let line = [
        "e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1", "f8c5", "d2d4", "e5d4", "e4e5",
        "d7d5", "e5d6",
    ];

    let mut position = Position::startpos();
    for move_uci in line {
        position = play_uci_moves(position, &[move_uci]);

        assert_eq!(position.0[HASH], position.calculate_hash());
        let reloaded = Position::from_fen(&position.to_fen()).unwrap();
        assert_eq!(position.0[HASH], reloaded.0[HASH]);
        assert_eq!(position.0, reloaded.0);
    }
}

#[test]
fn fen_round_trip() {
    for fen in [
        STARTPOS_FEN,
        KIWIPETE_FEN,
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 3 17",
        "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
        "8/P6k/8/8/8/8/8/K7 w - - 0 60",
    ] {
        let position = Position::from_fen(fen).unwrap();
        assert_eq!(position.to_fen(), fen);
        assert_eq!(Position::from_fen(&position.to_fen()).unwrap().0, position.0);
    }
}

#[test]
fn fen_rejects_capturable_king() {
    // black to move could take the white king on a1
    assert_eq!(
        Position::from_fen("r6k/8/8/8/8/8/8/K7 b - - 0 1"),
        Err(FenError::KingCapturable)
    );
}

#[test]
fn move_list_holds_the_richest_known_position() {
    // 218 legal moves, the most of any known legal position
    let position =
        Position::from_fen("R6R/3Q4/1Q4Q1/4Q3/2Q4Q/Q4Q2/pp1Q4/kBNN1KB1 w - - 0 1").unwrap();

    assert_eq!(generate(&position, true, false).len(), 218);
}

#[test]
fn fools_mate_is_checkmate() {
    let position =
        Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 2")
            .unwrap();

    assert!(generate(&position, true, false).is_empty());
    assert!(position.is_in_check(Color::White));
}

#[test]
fn promotion_places_the_new_piece() {
    let position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 60").unwrap();
    let promoted = play_uci_moves(position, &["a7a8q"]);

    let a8 = to_square(7, 0);
    assert_eq!(promoted.piece_at(a8), piece::code(piece::QUEEN, Color::White));
    assert_eq!(promoted.pieces(piece::code(piece::PAWN, Color::White)), 0);
}

#[test]
fn null_move_flips_the_side_and_drops_en_passant() {
    // neither side in check anywhere below
    let startpos = Position::startpos();
    assert_eq!(startpos.null_move().null_move().0, startpos.0);

    let with_ep = play_uci_moves(startpos, &["e2e4"]);
    assert_eq!(with_ep.en_passant_square(), Some(to_square(2, 4)));
    assert_eq!(
        with_ep.null_move().null_move().side_to_move(),
        with_ep.side_to_move()
    );

    let nulled = with_ep.null_move();
    assert_eq!(nulled.side_to_move(), Color::White);
    assert_eq!(nulled.en_passant_square(), None);
    assert_eq!(nulled.0[HASH], nulled.calculate_hash());

    // everything but the side bit and the en-passant field is untouched
    let reloaded = Position::from_fen(&nulled.to_fen()).unwrap();
    assert_eq!(nulled.0, reloaded.0);
    assert_eq!(nulled.halfmove_clock(), with_ep.halfmove_clock());
    assert_eq!(nulled.fullmove_number(), with_ep.fullmove_number());
}

#[test]
fn halfmove_clock_tracks_quiet_moves() {
    let position = play_uci_moves(Position::startpos(), &["g1f3", "g8f6", "b1c3"]);
    assert_eq!(position.halfmove_clock(), 3);
    assert_eq!(position.fullmove_number(), 2);

    let after_pawn_move = play_uci_moves(position, &["e7e5"]);
    assert_eq!(after_pawn_move.halfmove_clock(), 0);
    assert_eq!(after_pawn_move.fullmove_number(), 3);
}
