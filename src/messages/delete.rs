use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{rooms, session::SignedIn, AppResult, AppState};

/// How much of the body the confirmation page quotes.
const PREVIEW_CHARS: usize = 50;

#[debug_handler(state = AppState)]
pub(crate) async fn delete_message_page(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
    Path(message_id): Path<String>,
) -> AppResult<Response> {
    let message = super::authored_message(&db_pool, &message_id, &user).await?;

    let mut preview: String = message.body.chars().take(PREVIEW_CHARS).collect();
    if message.body.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    rooms::confirm_page(
        &session,
        &user,
        &format!("/message/{}/delete", message.id),
        &format!("\"{preview}\""),
        &format!("/room/{}", message.room_id),
    ).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_message(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    Path(message_id): Path<String>,
) -> AppResult<Response> {
    let message = super::authored_message(&db_pool, &message_id, &user).await?;

    sqlx::query("DELETE FROM messages WHERE id=?")
        .bind(&message.id)
        .execute(&db_pool)
        .await?;

    tracing::info!("@{} deleted message {}", user.username, message.id);
    Ok(Redirect::to("/").into_response())
}
