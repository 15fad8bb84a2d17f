use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, User}, include_res, res, session::{self, Level, SignedIn, Viewer}, AppResult, AppState};

use super::msg;

#[derive(Deserialize)]
pub(crate) struct MessageForm {
    #[serde(default)]
    body: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn room(
    State(db_pool): State<SqlitePool>,
    Viewer(viewer): Viewer,
    session: Session,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let room = super::find_room(&db_pool, &room_id).await?;
    let topic = super::topic_name(&db_pool, room.topic_id.as_deref()).await?;
    let host = match &room.host_id {
        Some(host_id) => db::find_user(&db_pool, host_id).await?,
        None => None,
    };

    let messages = msg::room_messages(&db_pool, &room.id).await?;
    let participants: Vec<User> = sqlx::query_as(
        "SELECT u.id,u.username,u.name,u.email,u.bio,u.created FROM users u \
         JOIN room_participants p ON p.user_id=u.id WHERE p.room_id=? ORDER BY u.username")
        .bind(&room.id)
        .fetch_all(&db_pool)
        .await?;

    let is_host = matches!((&viewer, &room.host_id), (Some(v), Some(h)) if &v.id == h);
    let room_actions = if is_host {
        res::fill(include_res!(str, "/pages/rooms/room_actions.html"), &[("room_id", &room.id)])
    } else {
        String::new()
    };

    let composer = match &viewer {
        Some(_) => res::fill(include_res!(str, "/pages/rooms/composer.html"), &[("room_id", &room.id)]),
        None => res::fill(include_res!(str, "/pages/rooms/composer_anon.html"), &[("room_id", &room.id)]),
    };

    let host_link = match &host {
        Some(host) => format!("<a href=\"/profile/{}\">@{}</a>", host.id, res::escape(&host.username)),
        None => "<span class=\"muted\">nobody</span>".to_owned(),
    };

    let participant_items: String = participants.iter()
        .map(|user| res::fill(include_res!(str, "/pages/rooms/participant.html"), &[
            ("id", &user.id),
            ("username", &res::escape(&user.username)),
            ("name", &res::escape(user.display_name())),
        ]))
        .collect();

    let content = res::fill(include_res!(str, "/pages/rooms/room.html"), &[
        ("room_id", &room.id),
        ("room_name", &res::escape(&room.name)),
        ("description", &res::escape(room.description.as_deref().unwrap_or(""))),
        ("topic", &res::escape(topic.as_deref().unwrap_or(""))),
        ("host", &host_link),
        ("since", &res::timesince(room.created, db::now())),
        ("room_actions", &room_actions),
        ("messages", &msg::message_items(&messages, viewer.as_ref())),
        ("composer", &composer),
        ("participant_count", &participants.len().to_string()),
        ("participants", &participant_items),
    ]);

    Ok(res::page(&session, viewer.as_ref(), &room.name, &content).await?.into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn post_message(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
    Path(room_id): Path<String>,
    Form(MessageForm { body }): Form<MessageForm>,
) -> AppResult<Response> {
    let room = super::find_room(&db_pool, &room_id).await?;
    if body.trim().is_empty() {
        session::flash(&session, Level::Error, "Message can't be empty.").await?;
    } else {
        let id = msg::send_msg(&db_pool, &user, &room.id, &body).await?;
        tracing::info!("@{} posted {id} in room {}", user.username, room.id);
    }

    Ok(Redirect::to(&format!("/room/{}", room.id)).into_response())
}
