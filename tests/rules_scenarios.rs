use chess_game_server::game::{
    Board, ChessMove, Color, GameState, InvalidMove, Piece, PieceType, Position,
};

fn pos(row: u8, column: u8) -> Position {
    Position::new(row, column)
}

fn play(state: &mut GameState, from: (u8, u8), to: (u8, u8)) {
    let mover = state.turn();
    state
        .make_move(ChessMove::simple(pos(from.0, from.1), pos(to.0, to.1)), mover)
        .unwrap();
}

fn scholars_mate() -> GameState {
    let mut state = GameState::new();
    play(&mut state, (2, 5), (4, 5)); // e4
    play(&mut state, (7, 5), (5, 5)); // e5
    play(&mut state, (1, 6), (4, 3)); // Bc4
    play(&mut state, (8, 2), (6, 3)); // Nc6
    play(&mut state, (1, 4), (5, 8)); // Qh5
    play(&mut state, (8, 7), (6, 6)); // Nf6
    play(&mut state, (5, 8), (7, 6)); // Qxf7#
    state
}

fn queen_stalemate() -> GameState {
    let mut board = Board::empty();
    board.set(pos(8, 1), Some(Piece::new(Color::Black, PieceType::King)));
    board.set(pos(7, 3), Some(Piece::new(Color::White, PieceType::Queen)));
    board.set(pos(1, 5), Some(Piece::new(Color::White, PieceType::King)));
    GameState::from_board(board, Color::Black)
}

#[test]
fn pawn_double_step_passes_the_turn() {
    let mut state = GameState::new();
    state
        .make_move(ChessMove::simple(pos(2, 1), pos(4, 1)), Color::White)
        .unwrap();

    assert_eq!(state.turn(), Color::Black);
    assert_eq!(state.board().get(pos(2, 1)), None);
    assert_eq!(
        state.board().get(pos(4, 1)),
        Some(Piece::new(Color::White, PieceType::Pawn))
    );
}

#[test]
fn pawn_cannot_overshoot() {
    let mut state = GameState::new();
    let overshoot = ChessMove::simple(pos(2, 1), pos(5, 1));
    assert_eq!(
        state.make_move(overshoot, Color::White),
        Err(InvalidMove::NotALegalMove(overshoot))
    );
    assert_eq!(state, GameState::new());
}

#[test]
fn scholars_mate_is_checkmate() {
    let state = scholars_mate();
    assert_eq!(state.turn(), Color::Black);
    assert!(state.is_in_check(Color::Black));
    assert!(state.is_in_checkmate(Color::Black));
    assert!(!state.is_in_stalemate(Color::Black));
    assert!(state.all_legal_moves(Color::Black).is_empty());
    assert!(state.is_game_over());
    assert_eq!(state.status(), "checkmate");
}

#[test]
fn cornered_king_is_stalemated() {
    let state = queen_stalemate();
    assert!(!state.is_in_check(Color::Black));
    assert!(state.is_in_stalemate(Color::Black));
    assert!(!state.is_in_checkmate(Color::Black));
    assert!(state.is_game_over());
    assert_eq!(state.status(), "stalemate");
}

#[test]
fn mate_and_stalemate_never_coincide() {
    for state in [GameState::new(), scholars_mate(), queen_stalemate()] {
        for color in [Color::White, Color::Black] {
            assert!(!(state.is_in_checkmate(color) && state.is_in_stalemate(color)));
        }
    }
}

#[test]
fn every_generated_destination_is_on_the_board() {
    for state in [GameState::new(), scholars_mate(), queen_stalemate()] {
        for color in [Color::White, Color::Black] {
            for m in state.all_legal_moves(color) {
                for p in [m.start_position, m.end_position] {
                    assert!((1..=8).contains(&p.row()) && (1..=8).contains(&p.column()));
                }
            }
        }
    }
}

#[test]
fn each_successful_move_flips_the_turn() {
    let mut state = GameState::new();
    for _ in 0..6 {
        let mover = state.turn();
        let next = state.all_legal_moves(mover)[0];
        state.make_move(next, mover).unwrap();
        assert_eq!(state.turn(), mover.opposite());
    }
}

#[test]
fn moving_into_check_is_refused_without_side_effects() {
    let mut board = Board::empty();
    board.set(pos(1, 5), Some(Piece::new(Color::White, PieceType::King)));
    board.set(pos(8, 4), Some(Piece::new(Color::Black, PieceType::Rook)));
    board.set(pos(8, 8), Some(Piece::new(Color::Black, PieceType::King)));
    let mut state = GameState::from_board(board, Color::White);
    let before = state.clone();

    let into_file = ChessMove::simple(pos(1, 5), pos(1, 4));
    assert_eq!(
        state.make_move(into_file, Color::White),
        Err(InvalidMove::NotALegalMove(into_file))
    );
    assert_eq!(state, before);
}

#[test]
fn promotion_replaces_the_pawn() {
    let mut board = Board::empty();
    board.set(pos(7, 1), Some(Piece::new(Color::White, PieceType::Pawn)));
    board.set(pos(1, 5), Some(Piece::new(Color::White, PieceType::King)));
    board.set(pos(8, 8), Some(Piece::new(Color::Black, PieceType::King)));
    let mut state = GameState::from_board(board, Color::White);

    assert_eq!(state.valid_moves(pos(7, 1)).map(|m| m.len()), Some(4));
    state
        .make_move(
            ChessMove::new(pos(7, 1), pos(8, 1), Some(PieceType::Knight)),
            Color::White,
        )
        .unwrap();
    assert_eq!(
        state.board().get(pos(8, 1)),
        Some(Piece::new(Color::White, PieceType::Knight))
    );
}

#[test]
fn game_state_wire_shape() {
    let json = serde_json::to_value(GameState::new()).unwrap();
    assert_eq!(json["teamTurn"], "WHITE");
    assert_eq!(json["board"]["squares"][0][0]["type"], "ROOK");
    assert_eq!(json["board"]["squares"][0][0]["pieceColor"], "WHITE");
    assert!(json["board"]["squares"][3][3].is_null());
    assert_eq!(json["board"]["squares"][7][4]["type"], "KING");

    let back: GameState = serde_json::from_value(json).unwrap();
    assert_eq!(back, GameState::new());
}
