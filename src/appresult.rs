use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::error::ChatError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Chat(ChatError),
    /// No user attached to the session.
    Unauthenticated,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated", "log in first".to_owned()),
            AppError::Chat(err) => {
                use ChatError::*;
                let status = match &err {
                    DuplicateIdentity => StatusCode::CONFLICT,
                    InvalidCredentials => StatusCode::UNAUTHORIZED,
                    RoomNotFound | MessageNotFound => StatusCode::NOT_FOUND,
                    NotAMember | PermissionDenied => StatusCode::FORBIDDEN,
                    Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    Database(_) | Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let message = if status.is_server_error() {
                    error!(error = %err, "request failed");
                    "something went wrong".to_owned()
                } else {
                    err.to_string()
                };
                (status, err.kind(), message)
            }
        };

        (status, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Chat(ChatError::from(err))
            }
        }
    };
}

apperr_impl!(ChatError);
apperr_impl!(sqlx::Error);
apperr_impl!(anyhow::Error);

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Chat(ChatError::Internal(anyhow::Error::from(err)))
    }
}
