//! Command dispatch for live games.
//!
//! Each command runs its whole load, validate, apply, persist and broadcast
//! cycle while holding that game's lock, so the messages produced by two
//! moves on one game never interleave. Different games never contend.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ChessError;
use crate::game::utils::{
    connect_notification, leave_notification, move_notification, resign_notification,
    status_notification,
};
use crate::game::{Color, InvalidMove};
use crate::models::game_state::{GameId, GameRecord};
use crate::models::messages::{CommandType, ServerMessage, UserGameCommand};
use crate::store::{AuthLookup, GameStore};
use crate::websocket::registry::{ConnectionId, SessionRegistry};

/// One mutex per game id. An entry lives only while some caller holds or
/// waits on it.
#[derive(Default)]
struct GameLocks {
    locks: Mutex<HashMap<GameId, Arc<Mutex<()>>>>,
}

impl GameLocks {
    fn entries(&self) -> MutexGuard<'_, HashMap<GameId, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self, game_id: GameId) -> Arc<Mutex<()>> {
        self.entries().entry(game_id).or_default().clone()
    }

    /// Hand back a lock from `acquire`, dropping the entry if nobody else has it
    fn release(&self, game_id: GameId, lock: Arc<Mutex<()>>) {
        let mut locks = self.entries();
        // clones are made and dropped only under `locks`, so the count is exact
        let last_holder = Arc::strong_count(&lock) == 2;
        drop(lock);
        if last_holder {
            locks.remove(&game_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries().len()
    }
}

pub struct CommandDispatcher {
    auth: Arc<dyn AuthLookup>,
    store: Arc<dyn GameStore>,
    registry: Arc<SessionRegistry>,
    locks: GameLocks,
}

impl CommandDispatcher {
    pub fn new(
        auth: Arc<dyn AuthLookup>,
        store: Arc<dyn GameStore>,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            auth,
            store,
            registry,
            locks: GameLocks::default(),
        }
    }

    /// Run one command from `connection`. Failures go back to that connection
    /// only, as an `ERROR` message.
    pub fn dispatch(&self, connection: &ConnectionId, command: UserGameCommand) {
        info!(
            "Connection {} sent {:?} for game {}",
            connection, command.command_type, command.game_id
        );

        let outcome = self.with_game_lock(command.game_id, || match command.command_type {
            CommandType::Connect => self.handle_connect(connection, &command),
            CommandType::MakeMove => self.handle_make_move(connection, &command),
            CommandType::Leave => self.handle_leave(connection, &command),
            CommandType::Resign => self.handle_resign(&command),
        });

        if let Err(err) = outcome {
            self.reject(connection, &err);
        }
    }

    /// Report a failure to `connection` alone
    pub fn reject(&self, connection: &ConnectionId, err: &ChessError) {
        match err {
            ChessError::Storage(cause) => warn!("Storage failure for {}: {}", connection, cause),
            _ => warn!("Rejected command from {}: {}", connection, err),
        }
        self.registry
            .send_to(connection, &ServerMessage::error(err.to_string()));
    }

    /// Seat the token's identity as `color`. Re-claiming your own seat succeeds.
    pub fn claim_seat(
        &self,
        auth_token: &str,
        color: Color,
        game_id: GameId,
    ) -> Result<(), ChessError> {
        self.with_game_lock(game_id, || {
            let username = self.authorize(auth_token)?;
            let mut record = self.load_record(game_id)?;
            match record.seat(color) {
                Some(holder) if holder == username => return Ok(()),
                Some(_) => return Err(ChessError::AlreadyTaken),
                None => {}
            }
            record.set_seat(color, Some(username.clone()));
            self.store.save_game_record(&record)?;
            info!("{} took the {} seat in game {}", username, color, game_id);
            Ok(())
        })
    }

    fn with_game_lock<T>(&self, game_id: GameId, work: impl FnOnce() -> T) -> T {
        let lock = self.locks.acquire(game_id);
        let outcome = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            work()
        };
        self.locks.release(game_id, lock);
        outcome
    }

    fn handle_connect(
        &self,
        connection: &ConnectionId,
        command: &UserGameCommand,
    ) -> Result<(), ChessError> {
        let username = self.authorize(&command.auth_token)?;
        let mut record = self.load_record(command.game_id)?;

        if record.game.is_none() {
            record.game_or_new();
            self.store.save_game_record(&record)?;
            debug!("Started a fresh board for game {}", record.game_id);
        }
        let game = record.game_or_new().clone();

        self.registry.join(connection, record.game_id);
        self.registry
            .send_to(connection, &ServerMessage::load_game(game));

        let note = connect_notification(&username, record.role_of(&username));
        self.registry.broadcast_others(
            record.game_id,
            connection,
            &ServerMessage::notification(note),
        );
        Ok(())
    }

    fn handle_make_move(
        &self,
        connection: &ConnectionId,
        command: &UserGameCommand,
    ) -> Result<(), ChessError> {
        let username = self.authorize(&command.auth_token)?;
        let chess_move = command
            .chess_move
            .ok_or_else(|| ChessError::BadRequest("MAKE_MOVE requires a move".to_string()))?;
        let mut record = self.load_record(command.game_id)?;

        let mut game = record.game.clone().unwrap_or_default();
        if game.is_game_over() {
            return Err(ChessError::GameOver("the game is already over".to_string()));
        }
        if !record.is_full() {
            return Err(ChessError::GameOver(
                "the game is not in progress".to_string(),
            ));
        }

        let mover = seat_on_turn(&record, &username, game.turn())?;
        let moved = game
            .board()
            .get(chess_move.start_position)
            .ok_or(InvalidMove::NoPieceAtSource(chess_move.start_position))?;
        game.make_move(chess_move, mover)?;

        record.game = Some(game.clone());
        self.store.save_game_record(&record)?;
        info!(
            "{} played {} in game {}",
            username, chess_move, record.game_id
        );

        let game_id = record.game_id;
        self.registry
            .broadcast_all(game_id, &ServerMessage::load_game(game.clone()));
        self.registry.broadcast_others(
            game_id,
            connection,
            &ServerMessage::notification(move_notification(&username, moved, &chess_move)),
        );

        let opponent = mover.opposite();
        let opponent_name = record
            .seat(opponent)
            .map(str::to_string)
            .unwrap_or_else(|| opponent.to_string());
        if let Some(note) = status_notification(&game, opponent, &opponent_name) {
            self.registry
                .broadcast_all(game_id, &ServerMessage::notification(note));
        }
        Ok(())
    }

    fn handle_leave(
        &self,
        connection: &ConnectionId,
        command: &UserGameCommand,
    ) -> Result<(), ChessError> {
        if let Some(bound) = self.registry.game_of(connection) {
            if bound != command.game_id {
                return Err(ChessError::BadRequest(format!(
                    "this connection is in game {}",
                    bound
                )));
            }
        }

        let vacated = self.vacate_seat(command);
        // the connection goes whether or not the record update worked
        self.registry.leave(connection);
        let username = vacated?;

        self.registry.broadcast_others(
            command.game_id,
            connection,
            &ServerMessage::notification(leave_notification(&username)),
        );
        Ok(())
    }

    fn vacate_seat(&self, command: &UserGameCommand) -> Result<String, ChessError> {
        let username = self.authorize(&command.auth_token)?;
        let mut record = self.load_record(command.game_id)?;
        if record.vacate(&username) {
            self.store.save_game_record(&record)?;
            info!("{} gave up their seat in game {}", username, record.game_id);
        }
        Ok(username)
    }

    fn handle_resign(&self, command: &UserGameCommand) -> Result<(), ChessError> {
        let username = self.authorize(&command.auth_token)?;
        let mut record = self.load_record(command.game_id)?;

        if !record.holds_seat(Color::White, &username) && !record.holds_seat(Color::Black, &username)
        {
            return Err(ChessError::NotAPlayer);
        }
        if record.game.as_ref().is_some_and(|game| game.is_game_over()) {
            return Err(ChessError::GameOver("the game is already over".to_string()));
        }

        record.set_seat(Color::White, None);
        record.set_seat(Color::Black, None);
        self.store.save_game_record(&record)?;
        info!("{} resigned game {}", username, record.game_id);

        self.registry.broadcast_all(
            record.game_id,
            &ServerMessage::notification(resign_notification(&username)),
        );
        Ok(())
    }

    fn authorize(&self, auth_token: &str) -> Result<String, ChessError> {
        self.auth
            .resolve_identity(auth_token)
            .ok_or(ChessError::Unauthorized)
    }

    fn load_record(&self, game_id: GameId) -> Result<GameRecord, ChessError> {
        self.store
            .load_game_record(game_id)?
            .ok_or(ChessError::GameNotFound(game_id))
    }
}

/// The color `username` may move right now
fn seat_on_turn(record: &GameRecord, username: &str, turn: Color) -> Result<Color, ChessError> {
    if record.holds_seat(turn, username) {
        Ok(turn)
    } else if record.holds_seat(turn.opposite(), username) {
        Err(InvalidMove::WrongTurn.into())
    } else {
        Err(ChessError::NotAPlayer)
    }
}
