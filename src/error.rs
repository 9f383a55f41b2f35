use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::game::InvalidMove;
use crate::models::game_state::GameId;
use crate::store::StoreError;

/// Every way a command can fail. The display string is the `errorMessage`
/// sent back to the originating connection.
#[derive(Debug, Error)]
pub enum ChessError {
    #[error("Error: unauthorized")]
    Unauthorized,
    #[error("Error: bad request ({0})")]
    BadRequest(String),
    #[error("Error: game {0} not found")]
    GameNotFound(GameId),
    #[error("Error: {0}")]
    InvalidMove(#[from] InvalidMove),
    #[error("Error: {0}")]
    GameOver(String),
    #[error("Error: you are not a player in this game")]
    NotAPlayer,
    #[error("Error: already taken")]
    AlreadyTaken,
    /// Cause is logged, never shown to clients
    #[error("Error: the game could not be saved, try again")]
    Storage(#[from] StoreError),
}

impl ResponseError for ChessError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChessError::Unauthorized => StatusCode::UNAUTHORIZED,
            ChessError::BadRequest(_) | ChessError::InvalidMove(_) => StatusCode::BAD_REQUEST,
            ChessError::GameNotFound(_) => StatusCode::NOT_FOUND,
            ChessError::NotAPlayer | ChessError::AlreadyTaken => StatusCode::FORBIDDEN,
            ChessError::GameOver(_) => StatusCode::CONFLICT,
            ChessError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}
