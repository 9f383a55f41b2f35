pub mod game_handlers;
pub mod handler;
pub mod registry;

// Re-export important types
pub use game_handlers::CommandDispatcher;
pub use handler::{ws_index, ChessWebSocket};
pub use registry::{ConnectionId, DeliveryError, MessageSink, SessionRegistry};
