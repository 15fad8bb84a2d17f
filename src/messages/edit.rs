use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, User}, include_res, res, session::{self, Level, SignedIn}, AppResult, AppState};

#[derive(Deserialize)]
pub(crate) struct EditMessageForm {
    #[serde(default)]
    body: String,
}

async fn message_form(session: &Session, viewer: &User, message_id: &str, room_id: &str, body: &str) -> AppResult<Response> {
    let content = res::fill(include_res!(str, "/pages/message_form.html"), &[
        ("id", message_id),
        ("room_id", room_id),
        ("body", &res::escape(body)),
    ]);
    Ok(res::page(session, Some(viewer), "Edit Message", &content).await?.into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_message_page(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
    Path(message_id): Path<String>,
) -> AppResult<Response> {
    let message = super::authored_message(&db_pool, &message_id, &user).await?;
    message_form(&session, &user, &message.id, &message.room_id, &message.body).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_message(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
    Path(message_id): Path<String>,
    Form(EditMessageForm { body }): Form<EditMessageForm>,
) -> AppResult<Response> {
    let message = super::authored_message(&db_pool, &message_id, &user).await?;

    if body.trim().is_empty() {
        session::flash(&session, Level::Error, "Message can't be empty.").await?;
        return message_form(&session, &user, &message.id, &message.room_id, &body).await;
    }

    sqlx::query("UPDATE messages SET body=?, updated=? WHERE id=?")
        .bind(&body)
        .bind(db::now())
        .bind(&message.id)
        .execute(&db_pool)
        .await?;

    tracing::info!("@{} edited message {}", user.username, message.id);
    Ok(Redirect::to(&format!("/room/{}", message.room_id)).into_response())
}
