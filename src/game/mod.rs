pub mod board;
pub mod moves;
pub mod rules;
pub mod utils;

// Re-export important types
pub use board::{Board, Color, Piece, PieceType, Position};
pub use moves::{piece_moves, ChessMove};
pub use rules::{GameState, InvalidMove};
