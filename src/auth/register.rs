use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{include_res, res, session::{self, Level}, AppError, AppResult};

use super::{create_user, validate};

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

async fn register_form(session: &Session, username: &str) -> AppResult<Response> {
    let content = res::fill(include_res!(str, "/pages/register.html"), &[
        ("username", &res::escape(username)),
    ]);
    Ok(res::page(session, None, "Register", &content).await?.into_response())
}

pub(crate) async fn username_taken(
    db_pool: &SqlitePool,
    username: &str,
    except_user_id: Option<&str>,
) -> AppResult<bool> {
    Ok(
        sqlx::query("SELECT 1 FROM users WHERE username=? AND id IS NOT ?")
            .bind(username)
            .bind(except_user_id)
            .fetch_optional(db_pool)
            .await?
            .is_some()
    )
}

#[debug_handler]
pub async fn register_page(session: Session) -> AppResult<Response> {
    register_form(&session, "").await
}

#[debug_handler]
pub async fn register(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(RegisterForm { username, password1, password2 }): Form<RegisterForm>,
) -> AppResult<Response> {
    let username = validate::normalize_username(&username);

    let mut problems = validate::username_problems(&username);
    problems.extend(validate::password_problems(&username, &password1, &password2));
    if problems.is_empty() && username_taken(&db_pool, &username, None).await? {
        problems.push("A user with that username already exists.".to_owned());
    }

    let created = if problems.is_empty() {
        match create_user(&db_pool, &username, &password1).await {
            Ok(id) => Some(id),
            Err(AppError::Internal(err)) if is_unique_violation(&err) => {
                problems.push("A user with that username already exists.".to_owned());
                None
            }
            Err(err) => return Err(err),
        }
    } else {
        None
    };

    let Some(user_id) = created else {
        session::flash(&session, Level::Error, "An error has occurred during registration").await?;
        for problem in problems {
            session::flash(&session, Level::Error, problem).await?;
        }
        return register_form(&session, &username).await;
    };

    session::flash(&session, Level::Success, format!("Account created for {username}!")).await?;
    session::login(&session, &user_id).await?;
    Ok(Redirect::to("/").into_response())
}

pub(crate) fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db_err)) if db_err.is_unique_violation()
    )
}
