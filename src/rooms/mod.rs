mod delete;
mod edit;
mod form;
mod msg;
mod new;
mod room;

use axum::{routing::get, Router};
use sqlx::SqlitePool;

use crate::{db::{self, Room, User}, include_res, res, AppError, AppResult, AppState};

pub(crate) use delete::confirm_page;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", get(new::new_room_page).post(new::new_room))
        .route("/{id}", get(room::room).post(room::post_message))
        .route("/{id}/edit", get(edit::edit_room_page).post(edit::edit_room))
        .route("/{id}/delete", get(delete::delete_room_page).post(delete::delete_room))
}

/// Room listing row: the room plus the names it is shown with.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomCard {
    pub id: String,
    pub name: String,
    pub host_id: Option<String>,
    pub host_username: Option<String>,
    pub topic_name: Option<String>,
    pub participant_count: i64,
    pub created: i64,
}

const CARD_SELECT: &str = "SELECT r.id, r.name, r.host_id, u.username AS host_username, t.name AS topic_name, \
    (SELECT COUNT(*) FROM room_participants p WHERE p.room_id=r.id) AS participant_count, r.created \
    FROM rooms r LEFT JOIN users u ON u.id=r.host_id LEFT JOIN topics t ON t.id=r.topic_id";

/// Rooms whose topic, name or description contains `q`, most recently updated first.
pub async fn search(db_pool: &SqlitePool, q: &str) -> AppResult<Vec<RoomCard>> {
    let pattern = db::like_pattern(q);
    Ok(
        sqlx::query_as(&format!(
            "{CARD_SELECT} WHERE t.name LIKE ?1 ESCAPE '\\' OR r.name LIKE ?1 ESCAPE '\\' \
             OR r.description LIKE ?1 ESCAPE '\\' ORDER BY r.updated DESC, r.created DESC"))
            .bind(pattern)
            .fetch_all(db_pool)
            .await?
    )
}

pub async fn hosted_by(db_pool: &SqlitePool, user_id: &str) -> AppResult<Vec<RoomCard>> {
    Ok(
        sqlx::query_as(&format!("{CARD_SELECT} WHERE r.host_id=? ORDER BY r.updated DESC, r.created DESC"))
            .bind(user_id)
            .fetch_all(db_pool)
            .await?
    )
}

pub async fn count(db_pool: &SqlitePool) -> AppResult<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM rooms").fetch_one(db_pool).await?)
}

pub fn cards(rooms: &[RoomCard]) -> String {
    let now = db::now();
    let mut html = String::new();
    for room in rooms {
        let host = match (&room.host_id, &room.host_username) {
            (Some(id), Some(username)) => format!("<a href=\"/profile/{id}\">@{}</a>", res::escape(username)),
            _ => "<span class=\"muted\">nobody</span>".to_owned(),
        };
        html += &res::fill(include_res!(str, "/pages/rooms/card.html"), &[
            ("id", &room.id),
            ("name", &res::escape(&room.name)),
            ("host", &host),
            ("topic", &res::escape(room.topic_name.as_deref().unwrap_or(""))),
            ("participants", &room.participant_count.to_string()),
            ("since", &res::timesince(room.created, now)),
        ]);
    }
    if html.is_empty() {
        html.push_str("<p class=\"empty\">No rooms available.</p>");
    }
    html
}

pub(crate) async fn find_room(db_pool: &SqlitePool, room_id: &str) -> AppResult<Room> {
    sqlx::query_as("SELECT id,host_id,topic_id,name,description,updated,created FROM rooms WHERE id=?")
        .bind(room_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound("room"))
}

/// Loads the room and checks that `user` hosts it.
pub(crate) async fn hosted_room(db_pool: &SqlitePool, room_id: &str, user: &User) -> AppResult<Room> {
    let room = find_room(db_pool, room_id).await?;
    if room.host_id.as_deref() != Some(user.id.as_str()) {
        tracing::warn!("@{} tried to modify room {} they don't host", user.username, room.id);
        return Err(AppError::Forbidden);
    }
    Ok(room)
}

pub(crate) async fn topic_name(db_pool: &SqlitePool, topic_id: Option<&str>) -> AppResult<Option<String>> {
    let Some(topic_id) = topic_id else {
        return Ok(None);
    };
    Ok(
        sqlx::query_scalar("SELECT name FROM topics WHERE id=?")
            .bind(topic_id)
            .fetch_optional(db_pool)
            .await?
    )
}
