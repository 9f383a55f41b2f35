use serde::{Deserialize, Serialize};

use crate::game::{Color, GameState};

pub type GameId = i32;

/// How an identity relates to a game, inferred from the seats it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player(Color),
    Observer,
}

/// Stored game: the two seats, a display name and the position if play has begun
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameRecord {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    #[serde(rename = "whiteUsername")]
    pub white_player: Option<String>,
    #[serde(rename = "blackUsername")]
    pub black_player: Option<String>,
    #[serde(rename = "gameName")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameState>,
}

impl GameRecord {
    pub fn new(game_id: GameId, name: impl Into<String>) -> Self {
        Self {
            game_id,
            white_player: None,
            black_player: None,
            name: name.into(),
            game: None,
        }
    }

    pub fn seat(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white_player.as_deref(),
            Color::Black => self.black_player.as_deref(),
        }
    }

    pub fn set_seat(&mut self, color: Color, username: Option<String>) {
        match color {
            Color::White => self.white_player = username,
            Color::Black => self.black_player = username,
        }
    }

    pub fn holds_seat(&self, color: Color, username: &str) -> bool {
        self.seat(color) == Some(username)
    }

    /// White wins the tie when one identity holds both seats
    pub fn role_of(&self, username: &str) -> Role {
        if self.holds_seat(Color::White, username) {
            Role::Player(Color::White)
        } else if self.holds_seat(Color::Black, username) {
            Role::Player(Color::Black)
        } else {
            Role::Observer
        }
    }

    pub fn is_full(&self) -> bool {
        self.white_player.is_some() && self.black_player.is_some()
    }

    /// Empty every seat `username` holds; returns whether anything changed
    pub fn vacate(&mut self, username: &str) -> bool {
        let mut vacated = false;
        for color in [Color::White, Color::Black] {
            if self.holds_seat(color, username) {
                self.set_seat(color, None);
                vacated = true;
            }
        }
        vacated
    }

    /// Stored position, starting a fresh game if none has been stored yet
    pub fn game_or_new(&mut self) -> &mut GameState {
        self.game.get_or_insert_with(GameState::new)
    }
}
