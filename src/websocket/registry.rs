//! Which live connections watch which game, and fan-out of server messages.
//!
//! One mutex guards the three maps so a join or leave is never half applied.
//! Sends happen after the lock is released; a recipient that fails to take a
//! frame is logged and skipped, the rest still receive it.

use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use uuid::Uuid;

use crate::models::game_state::GameId;
use crate::models::messages::ServerMessage;

/// Opaque id of one live websocket connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        ConnectionId(Uuid::new_v4().to_string())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        ConnectionId(id.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("connection closed")]
    Closed,
}

/// Where frames for one connection go
pub trait MessageSink: Send + Sync {
    fn deliver(&self, payload: &str) -> Result<(), DeliveryError>;
}

#[derive(Default)]
struct Sessions {
    sinks: HashMap<ConnectionId, Arc<dyn MessageSink>>,
    games: HashMap<GameId, HashSet<ConnectionId>>,
    bindings: HashMap<ConnectionId, GameId>,
}

impl Sessions {
    fn unbind(&mut self, connection: &ConnectionId) -> Option<GameId> {
        let game_id = self.bindings.remove(connection)?;
        if let Some(members) = self.games.get_mut(&game_id) {
            members.remove(connection);
            if members.is_empty() {
                self.games.remove(&game_id);
            }
        }
        Some(game_id)
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<Sessions>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, Sessions> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach the delivery sink for a newly opened connection
    pub fn register(&self, connection: ConnectionId, sink: Arc<dyn MessageSink>) {
        let mut sessions = self.sessions();
        sessions.sinks.insert(connection.clone(), sink);
        info!(
            "Registered connection {} ({} open)",
            connection,
            sessions.sinks.len()
        );
    }

    /// Bind `connection` to `game_id`, moving it off any other game
    pub fn join(&self, connection: &ConnectionId, game_id: GameId) {
        let mut sessions = self.sessions();
        if sessions.bindings.get(connection) == Some(&game_id) {
            return;
        }
        if let Some(previous) = sessions.unbind(connection) {
            debug!("Connection {} moved from game {}", connection, previous);
        }
        sessions.bindings.insert(connection.clone(), game_id);
        sessions
            .games
            .entry(game_id)
            .or_default()
            .insert(connection.clone());
        info!("Connection {} joined game {}", connection, game_id);
    }

    /// Unbind `connection` from its game. The connection stays open.
    pub fn leave(&self, connection: &ConnectionId) -> Option<GameId> {
        let left = self.sessions().unbind(connection);
        if let Some(game_id) = left {
            info!("Connection {} left game {}", connection, game_id);
        }
        left
    }

    /// Forget `connection` entirely: its game binding and its sink
    pub fn disconnect(&self, connection: &ConnectionId) -> Option<GameId> {
        let mut sessions = self.sessions();
        let left = sessions.unbind(connection);
        sessions.sinks.remove(connection);
        info!(
            "Dropped connection {} ({} open)",
            connection,
            sessions.sinks.len()
        );
        left
    }

    pub fn game_of(&self, connection: &ConnectionId) -> Option<GameId> {
        self.sessions().bindings.get(connection).copied()
    }

    /// Connections bound to `game_id`, sorted; empty for an unknown game
    pub fn connections(&self, game_id: GameId) -> Vec<ConnectionId> {
        let mut members: Vec<ConnectionId> = self
            .sessions()
            .games
            .get(&game_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    /// Send to one connection; false if it is unknown or delivery failed
    pub fn send_to(&self, connection: &ConnectionId, message: &ServerMessage) -> bool {
        let sink = self.sessions().sinks.get(connection).cloned();
        let Some(sink) = sink else {
            warn!("Session not found for connection ID: {}", connection);
            return false;
        };
        let Some(payload) = encode(message) else {
            return false;
        };
        deliver(connection, sink.as_ref(), &payload)
    }

    /// Send to every connection in the game; returns how many took the frame
    pub fn broadcast_all(&self, game_id: GameId, message: &ServerMessage) -> usize {
        self.fan_out(game_id, None, message)
    }

    /// Send to every connection in the game except `excluding`
    pub fn broadcast_others(
        &self,
        game_id: GameId,
        excluding: &ConnectionId,
        message: &ServerMessage,
    ) -> usize {
        self.fan_out(game_id, Some(excluding), message)
    }

    fn fan_out(
        &self,
        game_id: GameId,
        excluding: Option<&ConnectionId>,
        message: &ServerMessage,
    ) -> usize {
        let recipients: Vec<(ConnectionId, Arc<dyn MessageSink>)> = {
            let sessions = self.sessions();
            let Some(members) = sessions.games.get(&game_id) else {
                debug!("No connections found for game {}", game_id);
                return 0;
            };
            members
                .iter()
                .filter(|id| Some(*id) != excluding)
                .filter_map(|id| sessions.sinks.get(id).map(|sink| (id.clone(), sink.clone())))
                .collect()
        };

        let Some(payload) = encode(message) else {
            return 0;
        };

        let delivered = recipients
            .iter()
            .filter(|(id, sink)| deliver(id, sink.as_ref(), &payload))
            .count();
        debug!(
            "Broadcast to game {}: {} of {} delivered",
            game_id,
            delivered,
            recipients.len()
        );
        delivered
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("Error serializing message: {}", e);
            None
        }
    }
}

fn deliver(connection: &ConnectionId, sink: &dyn MessageSink, payload: &str) -> bool {
    match sink.deliver(payload) {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not deliver to connection {}: {}", connection, e);
            false
        }
    }
}
