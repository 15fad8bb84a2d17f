use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::User, include_res, res, session::{self, Level}, topics, AppResult};

pub(crate) const NAME_MAX: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RoomForm {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) topic: String,
    #[serde(default)]
    pub(crate) description: String,
}

impl RoomForm {
    pub(crate) fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let name = self.name.trim();
        let topic = self.topic.trim();

        if name.is_empty() {
            problems.push("Room name is required.".to_owned());
        } else if name.chars().count() > NAME_MAX {
            problems.push(format!("Room name must be at most {NAME_MAX} characters."));
        }
        if topic.is_empty() {
            problems.push("Topic is required.".to_owned());
        } else if topic.chars().count() > NAME_MAX {
            problems.push(format!("Topic must be at most {NAME_MAX} characters."));
        }
        problems
    }

    /// Trimmed description, `None` when blank.
    pub(crate) fn description(&self) -> Option<&str> {
        Some(self.description.trim()).filter(|d| !d.is_empty())
    }
}

pub(crate) async fn flash_problems(session: &Session, problems: Vec<String>) -> AppResult<()> {
    for problem in problems {
        session::flash(session, Level::Error, problem).await?;
    }
    Ok(())
}

pub(crate) async fn render(
    db_pool: &SqlitePool,
    session: &Session,
    viewer: &User,
    action: &str,
    heading: &str,
    form: &RoomForm,
) -> AppResult<Response> {
    let topic_names = topics::all_names(db_pool).await?;

    let content = res::fill(include_res!(str, "/pages/rooms/form.html"), &[
        ("action", action),
        ("heading", &res::escape(heading)),
        ("name", &res::escape(&form.name)),
        ("topic", &res::escape(&form.topic)),
        ("description", &res::escape(&form.description)),
        ("topic_options", &topics::topic_options(&topic_names)),
    ]);
    Ok(res::page(session, Some(viewer), heading, &content).await?.into_response())
}
