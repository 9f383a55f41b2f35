use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::board::{Board, Piece, PieceType, Position};

/// A requested or generated move. Equal only when start, end and promotion all match.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ChessMove {
    pub start_position: Position,
    pub end_position: Position,
    #[serde(default)]
    pub promotion_piece: Option<PieceType>,
}

impl ChessMove {
    pub const fn new(start: Position, end: Position, promotion: Option<PieceType>) -> Self {
        Self {
            start_position: start,
            end_position: end,
            promotion_piece: promotion,
        }
    }

    pub const fn simple(start: Position, end: Position) -> Self {
        Self::new(start, end, None)
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.promotion_piece {
            Some(promotion) => write!(
                f,
                "{}{}={}",
                self.start_position, self.end_position, promotion
            ),
            None => write!(f, "{}{}", self.start_position, self.end_position),
        }
    }
}

type Direction = (i8, i8);

const DIAGONALS: [Direction; 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];
const ORTHOGONALS: [Direction; 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
const ALL_DIRECTIONS: [Direction; 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const KNIGHT_JUMPS: [Direction; 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Pseudo-legal move rule for one piece type
type MoveRule = fn(&Board, Position, Piece) -> Vec<ChessMove>;

fn rule_for(piece_type: PieceType) -> MoveRule {
    match piece_type {
        PieceType::Bishop => bishop_moves,
        PieceType::Rook => rook_moves,
        PieceType::Queen => queen_moves,
        PieceType::Knight => knight_moves,
        PieceType::King => king_moves,
        PieceType::Pawn => pawn_moves,
    }
}

/// Every destination the piece at `from` could reach by its movement pattern,
/// ignoring whether the mover's king is left attacked. Empty if `from` is empty.
pub fn piece_moves(board: &Board, from: Position) -> Vec<ChessMove> {
    match board.get(from) {
        Some(piece) => rule_for(piece.piece_type)(board, from, piece),
        None => Vec::new(),
    }
}

fn bishop_moves(board: &Board, from: Position, piece: Piece) -> Vec<ChessMove> {
    slide(board, from, piece, &DIAGONALS)
}

fn rook_moves(board: &Board, from: Position, piece: Piece) -> Vec<ChessMove> {
    slide(board, from, piece, &ORTHOGONALS)
}

fn queen_moves(board: &Board, from: Position, piece: Piece) -> Vec<ChessMove> {
    slide(board, from, piece, &ALL_DIRECTIONS)
}

fn knight_moves(board: &Board, from: Position, piece: Piece) -> Vec<ChessMove> {
    step(board, from, piece, &KNIGHT_JUMPS)
}

fn king_moves(board: &Board, from: Position, piece: Piece) -> Vec<ChessMove> {
    step(board, from, piece, &ALL_DIRECTIONS)
}

fn slide(board: &Board, from: Position, piece: Piece, directions: &[Direction]) -> Vec<ChessMove> {
    let mut moves = Vec::new();
    for &(d_row, d_col) in directions {
        let mut cursor = from.offset(d_row, d_col);
        while let Some(to) = cursor {
            match board.get(to) {
                None => moves.push(ChessMove::simple(from, to)),
                Some(target) => {
                    if target.color != piece.color {
                        moves.push(ChessMove::simple(from, to));
                    }
                    break;
                }
            }
            cursor = to.offset(d_row, d_col);
        }
    }
    moves
}

fn step(board: &Board, from: Position, piece: Piece, offsets: &[Direction]) -> Vec<ChessMove> {
    offsets
        .iter()
        .filter_map(|&(d_row, d_col)| from.offset(d_row, d_col))
        .filter(|&to| board.get(to).map_or(true, |target| target.color != piece.color))
        .map(|to| ChessMove::simple(from, to))
        .collect()
}

fn pawn_moves(board: &Board, from: Position, piece: Piece) -> Vec<ChessMove> {
    let mut moves = Vec::new();
    let dir = piece.color.forward();

    if let Some(one) = from.offset(dir, 0) {
        if board.get(one).is_none() {
            push_pawn_move(&mut moves, from, one, piece);

            if from.row() == piece.color.pawn_start_row() {
                if let Some(two) = from.offset(2 * dir, 0) {
                    if board.get(two).is_none() {
                        moves.push(ChessMove::simple(from, two));
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        let Some(diagonal) = from.offset(dir, d_col) else {
            continue;
        };
        if let Some(target) = board.get(diagonal) {
            if target.color != piece.color {
                push_pawn_move(&mut moves, from, diagonal, piece);
            }
        }
    }

    moves
}

/// Landing on the last rank fans out into one move per promotion choice
fn push_pawn_move(moves: &mut Vec<ChessMove>, from: Position, to: Position, piece: Piece) {
    if to.row() == piece.color.promotion_row() {
        moves.extend(
            PieceType::PROMOTIONS
                .iter()
                .map(|&promotion| ChessMove::new(from, to, Some(promotion))),
        );
    } else {
        moves.push(ChessMove::simple(from, to));
    }
}
