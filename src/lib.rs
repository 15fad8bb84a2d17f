pub mod activity;
pub mod appresult;
pub mod auth;
pub mod config;
pub mod db;
pub mod index;
pub mod messages;
pub mod profiles;
pub mod res;
pub mod rooms;
pub mod session;
pub mod topics;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer, SessionStore};

pub use appresult::{AppError, AppResult};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Config,
}

/// Builds the full application: every route, the session layer and request tracing.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.session_inactivity_minutes.into(),
        )));

    Router::new()
        .route("/", get(index::home))
        .route("/health", get(health))
        .route("/static/style.css", get(res::stylesheet))
        .route("/topics", get(topics::topics))
        .route("/activity", get(activity::activity))

        .merge(auth::router())
        .nest("/room", rooms::router())
        .nest("/message", messages::router())
        .nest("/profile", profiles::router())

        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}
