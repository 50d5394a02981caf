//! Session error taxonomy
//!
//! Every rejected command turns into one ERROR message for the sender. The `Display`
//! output is the `errorMessage` sent on the wire.

use crate::store::StoreError;
use chess_engine::ChessEngineError;
use shared::ServerMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Error: unauthorized")]
    Unauthorized,

    #[error("Error: {0}")]
    BadRequest(String),

    #[error("Error: {0}")]
    IllegalMove(String),

    #[error("Error: game is already over")]
    GameOver,

    #[error("Error: internal server error")]
    Internal(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        SessionError::BadRequest(message.into())
    }

    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::error(self.to_string())
    }
}

impl From<ChessEngineError> for SessionError {
    fn from(err: ChessEngineError) -> Self {
        if err.is_internal() {
            return SessionError::Internal(err.to_string());
        }
        match err {
            ChessEngineError::GameOver => SessionError::GameOver,
            ChessEngineError::MissingPromotion { .. }
            | ChessEngineError::InvalidPromotion { .. } => {
                SessionError::BadRequest(err.to_string())
            }
            _ => SessionError::IllegalMove(err.to_string()),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => SessionError::BadRequest(err.to_string()),
            StoreError::AlreadyExists(_)
            | StoreError::Database(_)
            | StoreError::Serialization(_) => SessionError::Internal(err.to_string()),
        }
    }
}
