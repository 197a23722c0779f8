pub mod appresult;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod index;
pub mod model;
pub mod rooms;
pub mod session;
pub mod store;

use axum::{Router, extract::FromRef, routing::get};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

pub use appresult::{AppError, AppResult};
pub use config::Config;
pub use error::{ChatError, ChatResult};
pub use gateway::Gateway;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub gateway: Gateway,
}

/// The full HTTP surface, sessions included.
pub fn app(app_state: AppState, config: &Config) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.session_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(config.session_idle_minutes)));

    Router::new()
        .route("/health", get(index::health))
        .route("/me", get(index::me))
        .nest("/auth", auth::router())
        .merge(rooms::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
