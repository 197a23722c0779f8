use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::appresult::AppError;

pub const USER_ID: &str = "user_id";

/// The user id the session cookie resolves to. Rejects with 401 when the
/// session carries none.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::from(anyhow!(msg)))?;

        match session.get::<i64>(USER_ID).await? {
            Some(user_id) => Ok(Self(user_id)),
            None => Err(AppError::Unauthenticated),
        }
    }
}

/// Binds the session to `user_id` under a fresh session id.
pub async fn log_in(session: &Session, user_id: i64) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(USER_ID, user_id).await
}
