use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;

use crate::{AppResult, AppState, gateway::Gateway, model::Room, session::CurrentUser};

#[derive(Debug, Deserialize)]
pub(crate) struct JoinForm {
    code: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn join_room(
    State(gateway): State<Gateway>,
    CurrentUser(user_id): CurrentUser,
    Json(JoinForm { code }): Json<JoinForm>,
) -> AppResult<Json<Room>> {
    Ok(Json(gateway.join_by_code(user_id, &code).await?))
}
