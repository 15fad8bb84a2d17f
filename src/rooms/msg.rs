use sqlx::SqlitePool;

use crate::{db::{self, User}, include_res, res, AppResult};

/// A room message with its author's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct RoomMessage {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) username: String,
    pub(crate) body: String,
    pub(crate) created: i64,
}

/// Stores the message and makes the author a participant of the room.
pub(crate) async fn send_msg(
    db_pool: &SqlitePool,
    author: &User,
    room_id: &str,
    body: &str,
) -> AppResult<String> {
    let id = db::new_id();
    let now = db::now();

    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO messages (id,user_id,room_id,body,updated,created) VALUES (?,?,?,?,?,?)")
        .bind(&id)
        .bind(&author.id)
        .bind(room_id)
        .bind(body)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT OR IGNORE INTO room_participants (room_id,user_id) VALUES (?,?)")
        .bind(room_id)
        .bind(&author.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(id)
}

pub(crate) async fn room_messages(db_pool: &SqlitePool, room_id: &str) -> AppResult<Vec<RoomMessage>> {
    Ok(
        sqlx::query_as(
            "SELECT m.id, m.user_id, u.username, m.body, m.created FROM messages m \
             JOIN users u ON u.id=m.user_id WHERE m.room_id=? ORDER BY m.created DESC, m.id DESC")
            .bind(room_id)
            .fetch_all(db_pool)
            .await?
    )
}

/// Renders the messages; edit and delete links appear only on the viewer's own messages.
pub(crate) fn message_items(messages: &[RoomMessage], viewer: Option<&User>) -> String {
    let now = db::now();
    let mut html = String::new();
    for message in messages {
        let actions = match viewer {
            Some(user) if user.id == message.user_id => {
                res::fill(include_res!(str, "/pages/rooms/message_actions.html"), &[("id", &message.id)])
            }
            _ => String::new(),
        };

        html += &res::fill(include_res!(str, "/pages/rooms/message.html"), &[
            ("id", &message.id),
            ("user_id", &message.user_id),
            ("username", &res::escape(&message.username)),
            ("since", &res::timesince(message.created, now)),
            ("body", &res::markdown(&message.body)),
            ("actions", &actions),
        ]);
    }
    html
}
