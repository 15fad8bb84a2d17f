#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use studybud::{db, AppState, Config};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

pub const PASSWORD: &str = "correct-horse-42";

pub struct TestApp {
    pub router: Router,
    pub db_pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db_pool = db::connect("sqlite::memory:").await.expect("in-memory database");
        let state = AppState { db_pool: db_pool.clone(), config };
        let router = studybud::app(state, MemoryStore::default());
        Self { router, db_pool }
    }

    /// A browser with its own cookie jar.
    pub fn client(&self) -> Client {
        Client { router: self.router.clone(), cookie: None }
    }

    /// A client that has registered `username` and is logged in.
    pub async fn signed_in(&self, username: &str) -> Client {
        let mut client = self.client();
        let response = client.register(username, PASSWORD).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "registering {username}: {}", response.body);
        client
    }

    pub async fn user_id(&self, username: &str) -> String {
        sqlx::query_scalar("SELECT id FROM users WHERE username=?")
            .bind(username)
            .fetch_one(&self.db_pool)
            .await
            .unwrap()
    }

    pub async fn room_id(&self, name: &str) -> String {
        sqlx::query_scalar("SELECT id FROM rooms WHERE name=?")
            .bind(name)
            .fetch_one(&self.db_pool)
            .await
            .unwrap()
    }

    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql).execute(&self.db_pool).await.unwrap();
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(&self.db_pool).await.unwrap()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub struct Client {
    router: Router,
    cookie: Option<String>,
}

impl Client {
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request("GET", path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let request = self.request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encode_form(form)))
            .unwrap();
        self.send(request).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> TestResponse {
        self.post("/register", &[("username", username), ("password1", password), ("password2", password)]).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post("/login", &[("username", username), ("password", password)]).await
    }

    pub async fn create_room(&mut self, name: &str, topic: &str, description: &str) -> TestResponse {
        self.post("/room/new", &[("name", name), ("topic", topic), ("description", description)]).await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_owned();
            self.cookie = match pair.split_once('=') {
                Some((_, value)) if !value.is_empty() => Some(pair),
                _ => None,
            };
        }

        let status = response.status();
        let location = response.headers()
            .get(header::LOCATION)
            .map(|l| l.to_str().unwrap().to_owned());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse { status, location, body: String::from_utf8(bytes.to_vec()).unwrap() }
    }
}

fn encode_form(form: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(form).unwrap()
}
