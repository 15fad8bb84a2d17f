use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{activity, db, include_res, res, rooms, session::Viewer, topics, AppError, AppResult, AppState, Config};

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    Path(profile_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    Viewer(viewer): Viewer,
    session: Session,
) -> AppResult<Response> {
    let user = db::find_user(&db_pool, &profile_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;

    let hosted = rooms::hosted_by(&db_pool, &user.id).await?;
    let messages = activity::feed_by_user(&db_pool, &user.id, config.feed_limit.into()).await?;
    let topics = topics::topic_counts(&db_pool, "", None).await?;
    let room_count = rooms::count(&db_pool).await?;

    let edit_link = match &viewer {
        Some(v) if v.id == user.id => include_res!(str, "/pages/profiles/edit_link.html"),
        _ => "",
    };

    let content = res::fill(include_res!(str, "/pages/profiles/profile.html"), &[
        ("name", &res::escape(user.display_name())),
        ("username", &res::escape(&user.username)),
        ("bio", &res::escape(user.bio.as_deref().unwrap_or(""))),
        ("edit_link", edit_link),
        ("room_count", &room_count.to_string()),
        ("topics", &topics::topic_items(&topics)),
        ("rooms", &rooms::cards(&hosted)),
        ("feed", &activity::feed_items(&messages)),
    ]);

    Ok(res::page(&session, viewer.as_ref(), &format!("@{}", user.username), &content).await?.into_response())
}
