use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use matchpoint_core::{CleanupError, GameError};
use serde_json::json;
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    UnprocessableEvent(String),
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::UnprocessableEvent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.as_status_code();

        // Internal details are logged, never sent back
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{self}");
            return (status, Json(json!({ "error": "Internal server error" }))).into_response();
        }

        (status, self.to_string()).into_response()
    }
}

impl From<GameError> for ServerError {
    fn from(value: GameError) -> Self {
        match value {
            e @ GameError::MalformedState(_) => Self::UnprocessableEvent(e.to_string()),
        }
    }
}

impl From<CleanupError> for ServerError {
    fn from(value: CleanupError) -> Self {
        Self::Unknown(value.to_string())
    }
}
