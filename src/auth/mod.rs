mod login;
mod logout;
mod password;
mod register;

use axum::{Router, routing::post};

use crate::AppState;

pub use password::Credentials;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
}
