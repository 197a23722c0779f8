mod join;
mod list;
mod members;
mod msg;
mod new;
mod room;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list::rooms).post(new::new_room))
        .route("/rooms/join", post(join::join_room))
        .route("/rooms/{room_id}", get(room::room).delete(room::delete_room))
        .route("/rooms/{room_id}/members", get(members::members))
        .route("/rooms/{room_id}/messages", post(msg::send_msg))
        .route("/messages/{message_id}", delete(msg::delete_msg))
}
