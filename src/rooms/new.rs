use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, session::SignedIn, topics, AppResult, AppState};

use super::form::{self, RoomForm};

#[debug_handler(state = AppState)]
pub(crate) async fn new_room_page(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
) -> AppResult<Response> {
    form::render(&db_pool, &session, &user, "/room/new", "Create Room", &RoomForm::default()).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_room(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
    Form(room_form): Form<RoomForm>,
) -> AppResult<Response> {
    let problems = room_form.problems();
    if !problems.is_empty() {
        form::flash_problems(&session, problems).await?;
        return form::render(&db_pool, &session, &user, "/room/new", "Create Room", &room_form).await;
    }

    let topic_id = topics::get_or_create(&db_pool, &room_form.topic).await?;
    let id = db::new_id();
    let now = db::now();
    sqlx::query("INSERT INTO rooms (id,host_id,topic_id,name,description,updated,created) VALUES (?,?,?,?,?,?,?)")
        .bind(&id)
        .bind(&user.id)
        .bind(&topic_id)
        .bind(room_form.name.trim())
        .bind(room_form.description())
        .bind(now)
        .bind(now)
        .execute(&db_pool)
        .await?;

    tracing::info!("@{} created room {id}", user.username);
    Ok(Redirect::to("/").into_response())
}
