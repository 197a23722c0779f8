use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{AppResult, AppState, gateway::Gateway, model::RoomView, session::CurrentUser};

#[debug_handler(state = AppState)]
pub(crate) async fn room(
    Path(room_id): Path<i64>,
    State(gateway): State<Gateway>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<RoomView>> {
    Ok(Json(gateway.view_room(user_id, room_id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_room(
    Path(room_id): Path<i64>,
    State(gateway): State<Gateway>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<StatusCode> {
    gateway.delete_room(user_id, room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
