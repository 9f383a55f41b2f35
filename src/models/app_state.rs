use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::MemoryStore;
use crate::websocket::{CommandDispatcher, SessionRegistry};

/// Application state shared between connections
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub registry: Arc<SessionRegistry>,
    pub dispatcher: CommandDispatcher,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let registry = Arc::new(SessionRegistry::new());
        let dispatcher = CommandDispatcher::new(store.clone(), store.clone(), registry.clone());
        Self {
            store,
            registry,
            dispatcher,
            config,
        }
    }
}
