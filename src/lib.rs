//! Live two-player chess over websockets: a rules engine plus the
//! coordinator that routes player commands and fans out game updates.

pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod routes;
pub mod store;
pub mod websocket;

pub use config::ServerConfig;
pub use error::ChessError;
pub use models::app_state::AppState;
