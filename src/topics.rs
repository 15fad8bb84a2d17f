use axum::{debug_handler, extract::{Query, State}, response::Html};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, include_res, res, session::Viewer, AppResult, AppState};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopicCount {
    pub name: String,
    pub room_count: i64,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Looks the topic up by exact (trimmed) name, creating it if needed. Returns its id.
pub async fn get_or_create(db_pool: &SqlitePool, name: &str) -> AppResult<String> {
    let name = name.trim();

    sqlx::query("INSERT INTO topics (id,name) VALUES (?,?) ON CONFLICT(name) DO NOTHING")
        .bind(db::new_id())
        .bind(name)
        .execute(db_pool)
        .await?;

    let (id,): (String,) = sqlx::query_as("SELECT id FROM topics WHERE name=?")
        .bind(name)
        .fetch_one(db_pool)
        .await?;
    Ok(id)
}

/// Topics whose name contains `q`, by name, each with how many rooms carry it.
pub async fn topic_counts(db_pool: &SqlitePool, q: &str, limit: Option<i64>) -> AppResult<Vec<TopicCount>> {
    Ok(
        sqlx::query_as(
            "SELECT t.name, (SELECT COUNT(*) FROM rooms r WHERE r.topic_id=t.id) AS room_count \
             FROM topics t WHERE t.name LIKE ? ESCAPE '\\' ORDER BY t.name LIMIT ?")
            .bind(db::like_pattern(q))
            .bind(limit.unwrap_or(-1))
            .fetch_all(db_pool)
            .await?
    )
}

pub async fn all_names(db_pool: &SqlitePool) -> AppResult<Vec<String>> {
    Ok(
        sqlx::query_scalar("SELECT name FROM topics ORDER BY name")
            .fetch_all(db_pool)
            .await?
    )
}

pub fn topic_items(topics: &[TopicCount]) -> String {
    topics.iter()
        .map(|topic| res::fill(include_res!(str, "/pages/topic_item.html"), &[
            ("name", &res::escape(&topic.name)),
            ("query", &query_value(&topic.name)),
            ("count", &topic.room_count.to_string()),
        ]))
        .collect()
}

/// `<option>` entries for the topic picker on the room form.
pub fn topic_options(names: &[String]) -> String {
    names.iter()
        .map(|name| format!("<option value=\"{}\"></option>", res::escape(name)))
        .collect()
}

/// Everything but RFC 3986 unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encodes `value` for use inside a query string.
pub fn query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

#[debug_handler(state = AppState)]
pub async fn topics(
    State(db_pool): State<SqlitePool>,
    Viewer(viewer): Viewer,
    session: Session,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let q = q.unwrap_or_default();
    let topics = topic_counts(&db_pool, &q, None).await?;

    let content = res::fill(include_res!(str, "/pages/topics.html"), &[
        ("q", &res::escape(&q)),
        ("topics", &topic_items(&topics)),
    ]);
    res::page(&session, viewer.as_ref(), "Browse Topics", &content).await
}
