use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, session::SignedIn, topics, AppResult, AppState};

use super::form::{self, RoomForm};

#[debug_handler(state = AppState)]
pub(crate) async fn edit_room_page(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let room = super::hosted_room(&db_pool, &room_id, &user).await?;
    let topic = super::topic_name(&db_pool, room.topic_id.as_deref()).await?;

    let prefilled = RoomForm {
        name: room.name,
        topic: topic.unwrap_or_default(),
        description: room.description.unwrap_or_default(),
    };
    form::render(&db_pool, &session, &user, &format!("/room/{room_id}/edit"), "Update Room", &prefilled).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_room(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
    Path(room_id): Path<String>,
    Form(room_form): Form<RoomForm>,
) -> AppResult<Response> {
    let room = super::hosted_room(&db_pool, &room_id, &user).await?;

    let problems = room_form.problems();
    if !problems.is_empty() {
        form::flash_problems(&session, problems).await?;
        return form::render(&db_pool, &session, &user, &format!("/room/{room_id}/edit"), "Update Room", &room_form).await;
    }

    let topic_id = topics::get_or_create(&db_pool, &room_form.topic).await?;
    sqlx::query("UPDATE rooms SET name=?, topic_id=?, description=?, updated=? WHERE id=?")
        .bind(room_form.name.trim())
        .bind(&topic_id)
        .bind(room_form.description())
        .bind(db::now())
        .bind(&room.id)
        .execute(&db_pool)
        .await?;

    tracing::info!("@{} updated room {}", user.username, room.id);
    Ok(Redirect::to("/").into_response())
}
