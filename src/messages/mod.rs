mod delete;
mod edit;

use axum::{routing::get, Router};
use sqlx::SqlitePool;

use crate::{db::{Message, User}, AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/edit", get(edit::edit_message_page).post(edit::edit_message))
        .route("/{id}/delete", get(delete::delete_message_page).post(delete::delete_message))
}

/// Loads the message and checks that `user` wrote it.
pub(crate) async fn authored_message(db_pool: &SqlitePool, message_id: &str, user: &User) -> AppResult<Message> {
    let message: Message = sqlx::query_as("SELECT id,user_id,room_id,body,updated,created FROM messages WHERE id=?")
        .bind(message_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound("message"))?;

    if message.user_id != user.id {
        tracing::warn!("@{} tried to modify message {} they didn't write", user.username, message.id);
        return Err(AppError::Forbidden);
    }
    Ok(message)
}
