use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{include_res, res, session::SignedIn, AppResult, AppState};

/// Confirmation page shared by every "are you sure" delete flow.
pub(crate) async fn confirm_page(
    session: &Session,
    viewer: &crate::db::User,
    action: &str,
    what: &str,
    cancel: &str,
) -> AppResult<Response> {
    let content = res::fill(include_res!(str, "/pages/delete.html"), &[
        ("action", action),
        ("obj", &res::escape(what)),
        ("cancel", cancel),
    ]);
    Ok(res::page(session, Some(viewer), "Delete", &content).await?.into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_room_page(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let room = super::hosted_room(&db_pool, &room_id, &user).await?;
    confirm_page(&session, &user, &format!("/room/{room_id}/delete"), &room.name, &format!("/room/{room_id}")).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_room(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let room = super::hosted_room(&db_pool, &room_id, &user).await?;

    // messages and participant links go with it
    sqlx::query("DELETE FROM rooms WHERE id=?")
        .bind(&room.id)
        .execute(&db_pool)
        .await?;

    tracing::info!("@{} deleted room {}", user.username, room.id);
    Ok(Redirect::to("/").into_response())
}
