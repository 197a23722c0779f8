use axum::{
    Json, debug_handler,
    extract::{Path, State},
};

use crate::{AppResult, AppState, gateway::Gateway, model::Membership, session::CurrentUser};

#[debug_handler(state = AppState)]
pub(crate) async fn members(
    Path(room_id): Path<i64>,
    State(gateway): State<Gateway>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<Vec<Membership>>> {
    Ok(Json(gateway.members(user_id, room_id).await?))
}
