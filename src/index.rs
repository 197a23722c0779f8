use axum::{Json, debug_handler, extract::State};

use crate::{AppError, AppResult, AppState, gateway::Gateway, model::User, session::CurrentUser};

#[debug_handler]
pub async fn health() -> &'static str {
    "ok"
}

#[debug_handler(state = AppState)]
pub async fn me(
    State(gateway): State<Gateway>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<User>> {
    let Some(user) = gateway.user(user_id).await? else {
        return Err(AppError::Unauthenticated);
    };
    Ok(Json(user))
}
