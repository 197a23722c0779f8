use thiserror::Error;

/// Everything a gateway operation can fail with.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("a user with that username or email already exists")]
    DuplicateIdentity,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("room not found")]
    RoomNotFound,

    #[error("not a member of this room")]
    NotAMember,

    #[error("message not found")]
    MessageNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ChatError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable name, used in response bodies.
    pub fn kind(&self) -> &'static str {
        use ChatError::*;
        match self {
            DuplicateIdentity => "duplicate_identity",
            InvalidCredentials => "invalid_credentials",
            RoomNotFound => "room_not_found",
            NotAMember => "not_a_member",
            MessageNotFound => "message_not_found",
            Validation(_) => "validation_error",
            PermissionDenied => "permission_denied",
            Database(_) | Internal(_) => "internal_error",
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

/// True when `err` is a unique-constraint failure mentioning `constraint`
/// (sqlite reports these as `UNIQUE constraint failed: table.column`).
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation() && db.message().contains(constraint),
        _ => false,
    }
}
