use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{AppResult, AppState, gateway::Gateway, model::Message, session::CurrentUser};

#[derive(Deserialize)]
pub(crate) struct SendMessageForm {
    content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_msg(
    Path(room_id): Path<i64>,
    State(gateway): State<Gateway>,
    CurrentUser(user_id): CurrentUser,
    Json(SendMessageForm { content }): Json<SendMessageForm>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let message = gateway.post_message(user_id, room_id, &content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_msg(
    Path(message_id): Path<i64>,
    State(gateway): State<Gateway>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<StatusCode> {
    gateway.delete_message(user_id, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
