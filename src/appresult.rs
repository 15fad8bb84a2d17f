use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;

use crate::res;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Rendered as the sorry page; the payload names what was missing.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("You are not allowed here!")]
    Forbidden,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(what) => res::sorry(what),
            Self::Forbidden => (StatusCode::FORBIDDEN, self.to_string()).into_response(),
            Self::Internal(err) => {
                tracing::error!("{err:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self::Internal(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(sqlx::Error);
apperr_impl!(sqlx::migrate::MigrateError);
apperr_impl!(tower_sessions::session::Error);
