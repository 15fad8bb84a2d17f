use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{include_res, res, session::{self, Level, Viewer}, AppResult, AppState};

use super::{authenticate, validate};

#[derive(Deserialize)]
pub struct LoginQuery {
    pub return_url: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

async fn login_form(session: &Session, username: &str) -> AppResult<Response> {
    let content = res::fill(include_res!(str, "/pages/login.html"), &[
        ("username", &res::escape(username)),
    ]);
    Ok(res::page(session, None, "Login", &content).await?.into_response())
}

#[debug_handler(state = AppState)]
pub async fn login_page(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    Viewer(viewer): Viewer,
    session: Session,
) -> AppResult<Response> {
    if viewer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    session::remember_return_url(&session, return_url).await?;
    login_form(&session, "").await
}

#[debug_handler(state = AppState)]
pub async fn login(
    State(db_pool): State<SqlitePool>,
    Viewer(viewer): Viewer,
    session: Session,
    Form(LoginForm { username, password }): Form<LoginForm>,
) -> AppResult<Response> {
    if viewer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = validate::normalize_username(&username);
    let Some(user_id) = authenticate(&db_pool, &username, &password).await? else {
        tracing::info!(%username, "failed login attempt");
        session::flash(&session, Level::Error, "Username OR password does not exist").await?;
        return login_form(&session, &username).await;
    };

    session::login(&session, &user_id).await?;
    tracing::info!("welcome @{username}#{user_id}");

    let return_url = session::take_return_url(&session).await?;
    Ok(Redirect::to(&return_url).into_response())
}
