use log::info;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::models::game_state::{GameId, GameRecord};
use crate::store::{AuthLookup, GameStore, StoreError};

/// Process-local tokens and games
pub struct MemoryStore {
    auths: Mutex<HashMap<String, String>>,
    games: Mutex<HashMap<GameId, GameRecord>>,
    next_id: AtomicI32,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            auths: Mutex::new(HashMap::new()),
            games: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
        }
    }

    /// Issue a fresh token for `username`
    pub fn issue_token(&self, username: &str) -> String {
        let token = Uuid::new_v4().to_string();
        lock(&self.auths).insert(token.clone(), username.to_string());
        info!("Issued auth token for {}", username);
        token
    }

    /// Create an empty, unseated game and return its id
    pub fn create_game(&self, name: &str) -> Result<GameId, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::BlankName);
        }
        let game_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.games).insert(game_id, GameRecord::new(game_id, name));
        info!("Created game {} ({})", game_id, name);
        Ok(game_id)
    }

    /// All games, ordered by id
    pub fn list_games(&self) -> Vec<GameRecord> {
        let mut games: Vec<GameRecord> = lock(&self.games).values().cloned().collect();
        games.sort_by_key(|record| record.game_id);
        games
    }
}

impl AuthLookup for MemoryStore {
    fn resolve_identity(&self, auth_token: &str) -> Option<String> {
        lock(&self.auths).get(auth_token).cloned()
    }
}

impl GameStore for MemoryStore {
    fn load_game_record(&self, game_id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(lock(&self.games).get(&game_id).cloned())
    }

    fn save_game_record(&self, record: &GameRecord) -> Result<(), StoreError> {
        let mut games = lock(&self.games);
        match games.get_mut(&record.game_id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(StoreError::MissingGame(record.game_id)),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Color;

    #[test]
    fn tokens_resolve_to_their_owner() {
        let store = MemoryStore::new();
        let token = store.issue_token("alice");
        assert_eq!(store.resolve_identity(&token).as_deref(), Some("alice"));
        assert_eq!(store.resolve_identity("forged"), None);
    }

    #[test]
    fn ids_are_sequential_and_names_required() {
        let store = MemoryStore::new();
        assert_eq!(store.create_game("first"), Ok(1));
        assert_eq!(store.create_game("second"), Ok(2));
        assert_eq!(store.create_game("   "), Err(StoreError::BlankName));
        let names: Vec<String> = store.list_games().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn save_replaces_existing_record_only() {
        let store = MemoryStore::new();
        let id = store.create_game("g").unwrap();
        let mut record = store.load_game_record(id).unwrap().unwrap();
        record.set_seat(Color::White, Some("alice".into()));
        store.save_game_record(&record).unwrap();
        assert_eq!(store.load_game_record(id).unwrap(), Some(record));

        let ghost = GameRecord::new(99, "ghost");
        assert_eq!(
            store.save_game_record(&ghost),
            Err(StoreError::MissingGame(99))
        );
        assert_eq!(store.load_game_record(99).unwrap(), None);
    }
}
