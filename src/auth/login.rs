use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::{AppResult, AppState, gateway::Gateway, model::User, session};

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(gateway): State<Gateway>,
    session: Session,
    Json(LoginForm { username, password }): Json<LoginForm>,
) -> AppResult<Json<User>> {
    let user = gateway.login(&username, &password).await?;
    session::log_in(&session, user.id).await?;

    info!(user_id = user.id, "welcome back");
    Ok(Json(user))
}
