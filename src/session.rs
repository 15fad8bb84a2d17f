//! Session keys and the helpers that read and write them.
//!
//! Handlers never touch raw keys; they go through [`Viewer`], [`SignedIn`], the
//! login/logout helpers and the flash queue defined here.

use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::{request::Parts, Uri},
    response::{IntoResponse, Redirect, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, User}, AppError, AppResult};

pub const USER_ID: &str = "user_id";
pub const RETURN_URL: &str = "return_url";
pub const FLASH: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Success,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub text: String,
}

pub async fn flash(session: &Session, level: Level, text: impl Into<String>) -> AppResult<()> {
    let mut pending = session.get::<Vec<Flash>>(FLASH).await?.unwrap_or_default();
    pending.push(Flash { level, text: text.into() });
    session.insert(FLASH, pending).await?;
    Ok(())
}

pub async fn take_flashes(session: &Session) -> AppResult<Vec<Flash>> {
    Ok(session.remove::<Vec<Flash>>(FLASH).await?.unwrap_or_default())
}

/// Marks the session as belonging to `user_id`. The id is cycled first to prevent fixation.
pub async fn login(session: &Session, user_id: &str) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, user_id).await?;
    Ok(())
}

pub async fn logout(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}

/// Only local absolute paths are accepted, so a crafted link can't bounce users off-site.
pub fn is_local_path(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\")
}

pub async fn remember_return_url(session: &Session, return_url: Option<String>) -> AppResult<()> {
    if let Some(return_url) = return_url.filter(|url| is_local_path(url)) {
        session.insert(RETURN_URL, return_url).await?;
    }
    Ok(())
}

pub async fn take_return_url(session: &Session) -> AppResult<String> {
    Ok(
        session.remove::<String>(RETURN_URL).await?
            .filter(|url| is_local_path(url))
            .unwrap_or_else(|| "/".to_owned())
    )
}

/// Unreserved characters and `/` pass through.
const RETURN_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

pub fn login_redirect(uri: &Uri) -> Response {
    let encoded = utf8_percent_encode(uri.path(), RETURN_PATH);
    Redirect::to(&format!("/login?return_url={encoded}")).into_response()
}

async fn load_viewer<S>(parts: &mut Parts, state: &S) -> AppResult<Option<User>>
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| AppError::from(msg))?;

    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };

    let db_pool = SqlitePool::from_ref(state);
    let user = db::find_user(&db_pool, &user_id).await?;
    if user.is_none() {
        // account is gone; don't keep a dangling login around
        session.flush().await?;
    }
    Ok(user)
}

/// Whoever is making the request, if anyone is logged in.
pub struct Viewer(pub Option<User>);

impl<S> FromRequestParts<S> for Viewer
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(load_viewer(parts, state).await?))
    }
}

/// A logged-in user. Anonymous requests are redirected to the login page and
/// brought back here afterwards.
pub struct SignedIn(pub User);

impl<S> FromRequestParts<S> for SignedIn
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match load_viewer(parts, state).await {
            Ok(Some(user)) => Ok(SignedIn(user)),
            Ok(None) => {
                // nested routers strip their prefix from `parts.uri`
                let uri = parts.extensions.get::<OriginalUri>()
                    .map(|OriginalUri(uri)| uri.clone())
                    .unwrap_or_else(|| parts.uri.clone());
                Err(login_redirect(&uri))
            }
            Err(err) => Err(err.into_response()),
        }
    }
}
