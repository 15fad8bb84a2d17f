use std::str::FromStr;

use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AppResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub created: i64,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Room {
    pub id: String,
    pub host_id: Option<String>,
    pub topic_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub updated: i64,
    pub created: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub user_id: String,
    pub room_id: String,
    pub body: String,
    pub updated: i64,
    pub created: i64,
}

pub(crate) const USER_COLUMNS: &str = "id,username,name,email,bio,created";

/// Opens the pool and brings the schema up to date.
pub async fn connect(database_url: &str) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // an in-memory database lives and dies with its single connection
    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(16)
    };

    let db_pool = pool_options.connect_with(options).await?;

    sqlx::migrate!().run(&db_pool).await?;
    Ok(db_pool)
}

pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

pub fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

pub async fn find_user(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<User>> {
    Ok(
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
            .bind(user_id)
            .fetch_optional(db_pool)
            .await?
    )
}

/// Turns a search term into a `LIKE` pattern matching it anywhere, for use with `ESCAPE '\'`.
pub fn like_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
