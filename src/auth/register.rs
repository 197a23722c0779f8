use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{AppResult, AppState, gateway::Gateway, model::User, session};

#[derive(Deserialize)]
pub(crate) struct RegisterForm {
    username: String,
    email: String,
    password: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(gateway): State<Gateway>,
    session: Session,
    Json(RegisterForm { username, email, password }): Json<RegisterForm>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = gateway.register(&username, &email, &password).await?;
    session::log_in(&session, user.id).await?;

    Ok((StatusCode::CREATED, Json(user)))
}
