use axum::{debug_handler, extract::State, response::Html};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, include_res, res, session::Viewer, AppResult, AppState, Config};

/// A message joined with its author and room, as shown in activity feeds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedItem {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub room_id: String,
    pub room_name: String,
    pub body: String,
    pub created: i64,
}

const FEED_SELECT: &str = "SELECT m.id, m.user_id, u.username, m.room_id, r.name AS room_name, m.body, m.created \
    FROM messages m JOIN users u ON u.id=m.user_id JOIN rooms r ON r.id=m.room_id";

/// Newest messages first, optionally only those in rooms whose topic contains `topic_q`.
pub async fn feed(db_pool: &SqlitePool, topic_q: Option<&str>, limit: i64) -> AppResult<Vec<FeedItem>> {
    let items = match topic_q {
        Some(q) => {
            sqlx::query_as(&format!(
                "{FEED_SELECT} JOIN topics t ON t.id=r.topic_id \
                 WHERE t.name LIKE ? ESCAPE '\\' ORDER BY m.created DESC, m.id DESC LIMIT ?"))
                .bind(db::like_pattern(q))
                .bind(limit)
                .fetch_all(db_pool)
                .await?
        }
        None => {
            sqlx::query_as(&format!("{FEED_SELECT} ORDER BY m.created DESC, m.id DESC LIMIT ?"))
                .bind(limit)
                .fetch_all(db_pool)
                .await?
        }
    };
    Ok(items)
}

pub async fn feed_by_user(db_pool: &SqlitePool, user_id: &str, limit: i64) -> AppResult<Vec<FeedItem>> {
    Ok(
        sqlx::query_as(&format!("{FEED_SELECT} WHERE m.user_id=? ORDER BY m.created DESC, m.id DESC LIMIT ?"))
            .bind(user_id)
            .bind(limit)
            .fetch_all(db_pool)
            .await?
    )
}

pub fn feed_items(items: &[FeedItem]) -> String {
    let now = db::now();
    let mut html = String::new();
    for item in items {
        html += &res::fill(include_res!(str, "/pages/feed_item.html"), &[
            ("user_id", &item.user_id),
            ("username", &res::escape(&item.username)),
            ("room_id", &item.room_id),
            ("room_name", &res::escape(&item.room_name)),
            ("since", &res::timesince(item.created, now)),
            ("body", &res::markdown(&item.body)),
        ]);
    }
    if html.is_empty() {
        html.push_str("<p class=\"empty\">No activity yet.</p>");
    }
    html
}

#[debug_handler(state = AppState)]
pub async fn activity(
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    Viewer(viewer): Viewer,
    session: Session,
) -> AppResult<Html<String>> {
    let items = feed(&db_pool, None, config.feed_limit.into()).await?;

    let content = res::fill(include_res!(str, "/pages/activity.html"), &[
        ("feed", &feed_items(&items)),
    ]);
    res::page(&session, viewer.as_ref(), "Recent Activity", &content).await
}
