use axum::{Json, debug_handler, extract::State};

use crate::{AppResult, AppState, gateway::Gateway, model::Room, session::CurrentUser};

#[debug_handler(state = AppState)]
pub(crate) async fn rooms(
    State(gateway): State<Gateway>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<Vec<Room>>> {
    Ok(Json(gateway.rooms_for_user(user_id).await?))
}
