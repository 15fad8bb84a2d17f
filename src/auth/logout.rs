use axum::{debug_handler, response::Redirect};
use tower_sessions::Session;

use crate::{session, AppResult};

#[debug_handler]
pub async fn logout(session: Session) -> AppResult<Redirect> {
    session::logout(&session).await?;
    Ok(Redirect::to("/"))
}
