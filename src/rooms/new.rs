use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{AppResult, AppState, gateway::Gateway, model::Room, session::CurrentUser};

#[derive(Debug, Deserialize)]
pub(crate) struct NewRoomForm {
    name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_room(
    State(gateway): State<Gateway>,
    CurrentUser(user_id): CurrentUser,
    Json(NewRoomForm { name }): Json<NewRoomForm>,
) -> AppResult<(StatusCode, Json<Room>)> {
    let room = gateway.create_and_join(user_id, &name).await?;
    Ok((StatusCode::CREATED, Json(room)))
}
