//! Collaborators the game coordinator consumes: identity lookup and game
//! record persistence. `MemoryStore` backs both for a single process.

mod memory;

pub use memory::MemoryStore;

use thiserror::Error;

use crate::models::game_state::{GameId, GameRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("game {0} does not exist")]
    MissingGame(GameId),
    #[error("game name required")]
    BlankName,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Resolves an auth token to the identity (username) it was issued to
pub trait AuthLookup: Send + Sync {
    fn resolve_identity(&self, auth_token: &str) -> Option<String>;
}

/// Loads and stores game records by id
pub trait GameStore: Send + Sync {
    fn load_game_record(&self, game_id: GameId) -> Result<Option<GameRecord>, StoreError>;
    fn save_game_record(&self, record: &GameRecord) -> Result<(), StoreError>;
}
