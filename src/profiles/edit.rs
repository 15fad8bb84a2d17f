use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    auth::{self, validate},
    db::User,
    include_res, res,
    session::{self, Level, SignedIn},
    AppResult, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    bio: String,
}

fn blank_to_none(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}

async fn user_form(session: &Session, viewer: &User, form: &UserForm) -> AppResult<Response> {
    let content = res::fill(include_res!(str, "/pages/profiles/form.html"), &[
        ("username", &res::escape(&form.username)),
        ("name", &res::escape(&form.name)),
        ("email", &res::escape(&form.email)),
        ("bio", &res::escape(&form.bio)),
        ("user_id", &viewer.id),
    ]);
    Ok(res::page(session, Some(viewer), "Edit Profile", &content).await?.into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_profile_page(
    SignedIn(user): SignedIn,
    session: Session,
) -> AppResult<Response> {
    let prefilled = UserForm {
        username: user.username.clone(),
        name: user.name.clone().unwrap_or_default(),
        email: user.email.clone().unwrap_or_default(),
        bio: user.bio.clone().unwrap_or_default(),
    };
    user_form(&session, &user, &prefilled).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_profile(
    State(db_pool): State<SqlitePool>,
    SignedIn(user): SignedIn,
    session: Session,
    Form(form): Form<UserForm>,
) -> AppResult<Response> {
    let username = validate::normalize_username(&form.username);
    let email = form.email.trim().to_lowercase();

    let mut problems = validate::username_problems(&username);
    problems.extend(validate::email_problems(&email));

    if problems.is_empty() {
        if auth::username_taken(&db_pool, &username, Some(&user.id)).await? {
            problems.push("A user with that username already exists.".to_owned());
        }
        if !email.is_empty() && email_taken(&db_pool, &email, &user.id).await? {
            problems.push("A user with that email already exists.".to_owned());
        }
    }

    if !problems.is_empty() {
        for problem in problems {
            session::flash(&session, Level::Error, problem).await?;
        }
        return user_form(&session, &user, &form).await;
    }

    if !save_profile(&db_pool, &user.id, &username, &email, &form).await? {
        session::flash(&session, Level::Error, "A user with that username or email already exists.").await?;
        return user_form(&session, &user, &form).await;
    }

    tracing::info!("@{} is now @{username}", user.username);
    Ok(Redirect::to(&format!("/profile/{}", user.id)).into_response())
}

/// Writes the profile. `false` when the username or email was claimed in the meantime.
async fn save_profile(
    db_pool: &SqlitePool,
    user_id: &str,
    username: &str,
    email: &str,
    form: &UserForm,
) -> AppResult<bool> {
    let result = sqlx::query("UPDATE users SET username=?, name=?, email=?, bio=? WHERE id=?")
        .bind(username)
        .bind(blank_to_none(&form.name))
        .bind(blank_to_none(email))
        .bind(blank_to_none(&form.bio))
        .bind(user_id)
        .execute(db_pool)
        .await;

    match result {
        Ok(_) => Ok(true),
        Err(err) => {
            let err = anyhow::Error::from(err);
            if auth::is_unique_violation(&err) {
                Ok(false)
            } else {
                Err(err.into())
            }
        }
    }
}

async fn email_taken(db_pool: &SqlitePool, email: &str, except_user_id: &str) -> AppResult<bool> {
    Ok(
        sqlx::query("SELECT 1 FROM users WHERE email=? AND id<>?")
            .bind(email)
            .bind(except_user_id)
            .fetch_optional(db_pool)
            .await?
            .is_some()
    )
}
