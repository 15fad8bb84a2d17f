mod login;
mod logout;
mod password;
mod register;
pub mod validate;

use axum::{routing::get, Router};
use sqlx::SqlitePool;

use crate::{db, AppResult, AppState};

pub use login::{login, login_page};
pub use logout::logout;
pub use password::{hash_password, verify_password};
pub use register::{register, register_page};
pub(crate) use register::{is_unique_violation, username_taken};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_page).post(register))
}

/// Inserts a user with a freshly hashed password and returns the new id.
/// `username` must already be validated and lowercased.
pub async fn create_user(db_pool: &SqlitePool, username: &str, password: &str) -> AppResult<String> {
    let id = db::new_id();
    let password_hash = hash_password(password)?;

    tracing::info!("adding @{username}#{id}");
    sqlx::query("INSERT INTO users (id,username,password_hash,created) VALUES (?,?,?,?)")
        .bind(&id)
        .bind(username)
        .bind(password_hash)
        .bind(db::now())
        .execute(db_pool)
        .await?;

    Ok(id)
}

/// Returns the user id when `username` exists and `password` matches its hash.
pub async fn authenticate(db_pool: &SqlitePool, username: &str, password: &str) -> AppResult<Option<String>> {
    let row: Option<(String, String)> = sqlx::query_as("SELECT id,password_hash FROM users WHERE username=?")
        .bind(username)
        .fetch_optional(db_pool)
        .await?;

    let Some((id, password_hash)) = row else {
        return Ok(None);
    };

    Ok(verify_password(password, &password_hash)?.then_some(id))
}
