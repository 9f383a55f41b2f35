use crate::game::board::{Color, Piece};
use crate::game::moves::ChessMove;
use crate::game::rules::GameState;
use crate::models::game_state::Role;

/// Announcement sent to everyone else when `username` connects
pub fn connect_notification(username: &str, role: Role) -> String {
    match role {
        Role::Player(color) => format!("{} joined the game as {}", username, color),
        Role::Observer => format!("{} joined the game as an observer", username),
    }
}

/// Describe a move that has just been applied; `moved` is the piece before promotion
pub fn move_notification(username: &str, moved: Piece, chess_move: &ChessMove) -> String {
    let mut text = format!(
        "{} moved {} from {} to {}",
        username, moved.piece_type, chess_move.start_position, chess_move.end_position
    );
    if let Some(promotion) = chess_move.promotion_piece {
        text.push_str(&format!(" and promoted to {}", promotion));
    }
    text
}

/// Check, checkmate or stalemate for `side` (usually the side now to move).
/// `name` is whoever holds that seat.
pub fn status_notification(game: &GameState, side: Color, name: &str) -> Option<String> {
    let condition = game.condition(side)?;
    Some(format!("{} ({}) is in {}", name, side, condition))
}

pub fn leave_notification(username: &str) -> String {
    format!("{} left the game", username)
}

pub fn resign_notification(username: &str) -> String {
    format!("{} resigned the game", username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::{Board, PieceType, Position};

    #[test]
    fn move_text_mentions_promotion() {
        let pawn = Piece::new(Color::White, PieceType::Pawn);
        let plain = ChessMove::simple(Position::new(2, 1), Position::new(4, 1));
        assert_eq!(
            move_notification("alice", pawn, &plain),
            "alice moved pawn from a2 to a4"
        );

        let promote = ChessMove::new(
            Position::new(7, 8),
            Position::new(8, 8),
            Some(PieceType::Queen),
        );
        assert_eq!(
            move_notification("alice", pawn, &promote),
            "alice moved pawn from h7 to h8 and promoted to queen"
        );
    }

    #[test]
    fn connect_text_by_role() {
        assert_eq!(
            connect_notification("bob", Role::Player(Color::Black)),
            "bob joined the game as black"
        );
        assert_eq!(
            connect_notification("eve", Role::Observer),
            "eve joined the game as an observer"
        );
    }

    #[test]
    fn quiet_position_has_no_status_line() {
        assert_eq!(
            status_notification(&GameState::new(), Color::Black, "bob"),
            None
        );
        assert_eq!(GameState::new().status(), "in_progress");
    }

    #[test]
    fn check_is_announced() {
        let mut board = Board::empty();
        board.set(
            Position::new(8, 5),
            Some(Piece::new(Color::Black, PieceType::King)),
        );
        board.set(
            Position::new(1, 5),
            Some(Piece::new(Color::White, PieceType::Rook)),
        );
        board.set(
            Position::new(1, 1),
            Some(Piece::new(Color::White, PieceType::King)),
        );
        let game = GameState::from_board(board, Color::Black);
        assert_eq!(
            status_notification(&game, Color::Black, "bob").as_deref(),
            Some("bob (black) is in check")
        );
        assert_eq!(game.status(), "check");
    }
}
