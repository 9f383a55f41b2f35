use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::board::{Board, Color, Piece, Position};
use crate::game::moves::{piece_moves, ChessMove};

/// Why a move was refused. The game is unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMove {
    #[error("no piece at {0}")]
    NoPieceAtSource(Position),
    #[error("it is not your turn")]
    WrongTurn,
    #[error("cannot capture your own piece")]
    FriendlyCapture,
    #[error("{0} is not a legal move")]
    NotALegalMove(ChessMove),
}

/// Board plus the color to move
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    #[serde(rename = "teamTurn")]
    turn: Color,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Standard starting position, white to move
    pub fn new() -> Self {
        Self {
            board: Board::standard(),
            turn: Color::White,
        }
    }

    pub fn from_board(board: Board, turn: Color) -> Self {
        Self { board, turn }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    /// True if some piece of `by` has `target` among its pseudo-legal destinations
    pub fn is_attacked(&self, target: Position, by: Color) -> bool {
        attacked_on(&self.board, target, by)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        in_check_on(&self.board, color)
    }

    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    /// Checkmate or stalemate for either color
    pub fn is_game_over(&self) -> bool {
        [Color::White, Color::Black]
            .into_iter()
            .any(|color| self.is_in_checkmate(color) || self.is_in_stalemate(color))
    }

    /// Legal moves for the piece at `from`, or `None` if the square is empty
    pub fn valid_moves(&self, from: Position) -> Option<Vec<ChessMove>> {
        let piece = self.board.get(from)?;
        Some(self.legal_moves_for(from, piece))
    }

    /// Every legal move available to `color`
    pub fn all_legal_moves(&self, color: Color) -> Vec<ChessMove> {
        self.board
            .pieces(color)
            .flat_map(|(from, piece)| self.legal_moves_for(from, piece))
            .collect()
    }

    /// Validate `chess_move` for `mover` and apply it, flipping the turn.
    pub fn make_move(&mut self, chess_move: ChessMove, mover: Color) -> Result<(), InvalidMove> {
        let start = chess_move.start_position;
        let end = chess_move.end_position;

        let moving = self
            .board
            .get(start)
            .ok_or(InvalidMove::NoPieceAtSource(start))?;
        if moving.color != self.turn || moving.color != mover {
            return Err(InvalidMove::WrongTurn);
        }
        if matches!(self.board.get(end), Some(target) if target.color == moving.color) {
            return Err(InvalidMove::FriendlyCapture);
        }
        if !self.legal_moves_for(start, moving).contains(&chess_move) {
            return Err(InvalidMove::NotALegalMove(chess_move));
        }

        apply(&mut self.board, chess_move, moving);
        self.turn = self.turn.opposite();
        Ok(())
    }

    /// `checkmate`, `stalemate` or `check` for `color`, first match wins
    pub fn condition(&self, color: Color) -> Option<&'static str> {
        if self.is_in_checkmate(color) {
            Some("checkmate")
        } else if self.is_in_stalemate(color) {
            Some("stalemate")
        } else if self.is_in_check(color) {
            Some("check")
        } else {
            None
        }
    }

    /// `in_progress`, `check`, `checkmate` or `stalemate` for the side to move
    pub fn status(&self) -> &'static str {
        self.condition(self.turn).unwrap_or("in_progress")
    }

    fn has_any_legal_move(&self, color: Color) -> bool {
        self.board
            .pieces(color)
            .any(|(from, piece)| !self.legal_moves_for(from, piece).is_empty())
    }

    fn legal_moves_for(&self, from: Position, piece: Piece) -> Vec<ChessMove> {
        piece_moves(&self.board, from)
            .into_iter()
            .filter(|&candidate| keeps_king_safe(&self.board, candidate, piece))
            .collect()
    }
}

/// Play `chess_move` on a scratch copy and ask whether the mover is still safe.
/// `Board` is `Copy`, so the live board is never touched.
fn keeps_king_safe(board: &Board, chess_move: ChessMove, moving: Piece) -> bool {
    let mut scratch = *board;
    apply(&mut scratch, chess_move, moving);
    !in_check_on(&scratch, moving.color)
}

fn apply(board: &mut Board, chess_move: ChessMove, moving: Piece) {
    let placed = match chess_move.promotion_piece {
        Some(promotion) => Piece::new(moving.color, promotion),
        None => moving,
    };
    board.set(chess_move.end_position, Some(placed));
    board.set(chess_move.start_position, None);
}

fn in_check_on(board: &Board, color: Color) -> bool {
    match board.find_king(color) {
        Some(king) => attacked_on(board, king, color.opposite()),
        None => false,
    }
}

fn attacked_on(board: &Board, target: Position, by: Color) -> bool {
    board.pieces(by).any(|(from, _)| {
        piece_moves(board, from)
            .iter()
            .any(|m| m.end_position == target)
    })
}
