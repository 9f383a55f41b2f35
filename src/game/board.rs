use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the board
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row direction pawns of this color advance in
    pub(crate) const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub(crate) const fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    pub(crate) const fn promotion_row(self) -> u8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceType {
    King,
    Queen,
    Bishop,
    Knight,
    Rook,
    Pawn,
}

impl PieceType {
    /// Pieces a pawn may become on the last rank, in generation order
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceType::King => "king",
            PieceType::Queen => "queen",
            PieceType::Bishop => "bishop",
            PieceType::Knight => "knight",
            PieceType::Rook => "rook",
            PieceType::Pawn => "pawn",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    #[serde(rename = "pieceColor")]
    pub color: Color,
    #[serde(rename = "type")]
    pub piece_type: PieceType,
}

impl Piece {
    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        Self { color, piece_type }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.piece_type)
    }
}

/// A square on the board, 1-based: row is the rank, column is the file.
///
/// Deserialisation rejects coordinates outside 1..=8, so a `Position` that
/// arrived over the wire can always index a [`Board`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    row: u8,
    column: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    row: i64,
    column: i64,
}

impl TryFrom<RawPosition> for Position {
    type Error = String;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        let in_range = |v: i64| (1..=8).contains(&v);
        if in_range(raw.row) && in_range(raw.column) {
            Ok(Position::new(raw.row as u8, raw.column as u8))
        } else {
            Err(format!(
                "position ({}, {}) is off the board",
                raw.row, raw.column
            ))
        }
    }
}

impl Position {
    /// Callers must pass coordinates in 1..=8.
    pub const fn new(row: u8, column: u8) -> Self {
        Self { row, column }
    }

    pub const fn row(self) -> u8 {
        self.row
    }

    pub const fn column(self) -> u8 {
        self.column
    }

    /// The square `(d_row, d_col)` away, or `None` past the edge
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Position> {
        let row = self.row as i8 + d_row;
        let column = self.column as i8 + d_col;
        if (1..=8).contains(&row) && (1..=8).contains(&column) {
            Some(Position::new(row as u8, column as u8))
        } else {
            None
        }
    }

    /// All 64 squares, row by row from a1
    pub fn all() -> impl Iterator<Item = Position> {
        (1..=8u8).flat_map(|row| (1..=8u8).map(move |column| Position::new(row, column)))
    }

    fn index(self) -> (usize, usize) {
        (self.row as usize - 1, self.column as usize - 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.column - 1) as char;
        write!(f, "{}{}", file, self.row)
    }
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// 8x8 grid of optional pieces. Equality is piece placement.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// Board in the standard opening layout
    pub fn standard() -> Self {
        let mut board = Self::empty();
        board.reset_to_standard_start();
        board
    }

    pub fn get(&self, position: Position) -> Option<Piece> {
        let (r, c) = position.index();
        self.squares[r][c]
    }

    pub fn set(&mut self, position: Position, piece: Option<Piece>) {
        let (r, c) = position.index();
        self.squares[r][c] = piece;
    }

    pub fn reset_to_standard_start(&mut self) {
        self.squares = [[None; 8]; 8];

        for column in 1..=8u8 {
            let back = BACK_RANK[column as usize - 1];
            self.set(
                Position::new(1, column),
                Some(Piece::new(Color::White, back)),
            );
            self.set(
                Position::new(2, column),
                Some(Piece::new(Color::White, PieceType::Pawn)),
            );
            self.set(
                Position::new(7, column),
                Some(Piece::new(Color::Black, PieceType::Pawn)),
            );
            self.set(
                Position::new(8, column),
                Some(Piece::new(Color::Black, back)),
            );
        }
    }

    /// Occupied squares holding a piece of `color`
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| match self.get(pos) {
            Some(piece) if piece.color == color => Some((pos, piece)),
            _ => None,
        })
    }

    /// First king of `color` in a1..h8 scan order
    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces(color)
            .find(|(_, piece)| piece.piece_type == PieceType::King)
            .map(|(pos, _)| pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout() {
        let board = Board::standard();
        assert_eq!(
            board.get(Position::new(1, 5)),
            Some(Piece::new(Color::White, PieceType::King))
        );
        assert_eq!(
            board.get(Position::new(8, 4)),
            Some(Piece::new(Color::Black, PieceType::Queen))
        );
        assert_eq!(
            board.get(Position::new(7, 1)),
            Some(Piece::new(Color::Black, PieceType::Pawn))
        );
        assert_eq!(board.get(Position::new(4, 4)), None);
        assert_eq!(board.pieces(Color::White).count(), 16);
        assert_eq!(board.pieces(Color::Black).count(), 16);
    }

    #[test]
    fn reset_clears_stray_pieces() {
        let mut board = Board::empty();
        board.set(
            Position::new(5, 5),
            Some(Piece::new(Color::Black, PieceType::Queen)),
        );
        board.reset_to_standard_start();
        assert_eq!(board.get(Position::new(5, 5)), None);
        assert_eq!(board, Board::standard());
    }

    #[test]
    fn offsets_stop_at_edge() {
        let corner = Position::new(1, 1);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(0, -1), None);
        assert_eq!(corner.offset(7, 7), Some(Position::new(8, 8)));
        assert_eq!(Position::new(8, 8).offset(1, 1), None);
    }

    #[test]
    fn algebraic_display() {
        assert_eq!(Position::new(2, 1).to_string(), "a2");
        assert_eq!(Position::new(8, 8).to_string(), "h8");
    }

    #[test]
    fn position_rejects_off_board_json() {
        let ok: Position = serde_json::from_str(r#"{"row":3,"column":8}"#).unwrap();
        assert_eq!(ok, Position::new(3, 8));
        assert!(serde_json::from_str::<Position>(r#"{"row":0,"column":1}"#).is_err());
        assert!(serde_json::from_str::<Position>(r#"{"row":4,"column":9}"#).is_err());
    }

    #[test]
    fn piece_wire_shape() {
        let json = serde_json::to_value(Piece::new(Color::White, PieceType::Rook)).unwrap();
        assert_eq!(json["pieceColor"], "WHITE");
        assert_eq!(json["type"], "ROOK");
    }
}
