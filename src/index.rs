use axum::{debug_handler, extract::{Query, State}, response::Html};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{activity, include_res, res, rooms, session::Viewer, topics::{self, SearchQuery}, AppResult, AppState, Config};

/// Topics listed in the home page sidebar.
const SIDEBAR_TOPICS: i64 = 5;

#[debug_handler(state = AppState)]
pub async fn home(
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    Viewer(viewer): Viewer,
    session: Session,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let q = q.unwrap_or_default();

    let rooms = rooms::search(&db_pool, &q).await?;
    let topics = topics::topic_counts(&db_pool, "", Some(SIDEBAR_TOPICS)).await?;
    let total_rooms = rooms::count(&db_pool).await?;
    let feed = activity::feed(&db_pool, Some(&q), config.feed_limit.into()).await?;

    let content = res::fill(include_res!(str, "/pages/index.html"), &[
        ("total_rooms", &total_rooms.to_string()),
        ("topics", &topics::topic_items(&topics)),
        ("room_count", &rooms.len().to_string()),
        ("rooms", &rooms::cards(&rooms)),
        ("feed", &activity::feed_items(&feed)),
    ]);
    res::page(&session, viewer.as_ref(), "StudyBud", &content).await
}
