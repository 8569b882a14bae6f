//! Common test utilities for integration tests
//!
//! Every [`TestContext`] owns a fresh migrated in-memory database and a
//! router built on top of it, so tests never share state. Requests are
//! driven straight through the router; no server is started.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use chrono::{NaiveDate, Utc};
use ledgerline_api::app::{build_router, AppState};
use ledgerline_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use ledgerline_shared::db::{migrations::run_migrations, pool::create_in_memory_pool};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::Service as _;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const TEST_PASSWORD: &str = "correct horse";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub config: Config,
}

/// A logged-in user
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,

    /// `auth_token=<jwt>`, ready for a Cookie header
    pub cookie: String,

    /// Raw token from the login body
    pub token: String,
}

/// Decoded response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text)
            .unwrap_or_else(|e| panic!("response is not JSON ({}): {}", e, self.text))
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> Self {
        let db = create_in_memory_pool().await.unwrap();
        run_migrations(&db).await.unwrap();

        let config = test_config();
        let app = build_router(AppState::new(db.clone(), config.clone()));

        TestContext { db, app, config }
    }

    /// Sends a request, optionally authenticated and with a JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        session: Option<&Session>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(session) = session {
            builder = builder.header(header::COOKIE, &session.cookie);
        }

        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.send_request(builder.body(body).unwrap()).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str, session: &Session) -> TestResponse {
        self.send(Method::GET, uri, Some(session), None).await
    }

    pub async fn post(&self, uri: &str, session: &Session, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(session), Some(body)).await
    }

    pub async fn put(&self, uri: &str, session: &Session, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(session), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, session: &Session) -> TestResponse {
        self.send(Method::DELETE, uri, Some(session), None).await
    }

    pub async fn register(&self, name: &str, email: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": TEST_PASSWORD })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers and logs in a user
    pub async fn sign_up(&self, email: &str) -> Session {
        let registered = self.register("Test User", email).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.text);

        let response = self.login(email, TEST_PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);

        let cookie = session_cookie(&response.headers).expect("login sets the session cookie");
        let body = response.json();

        Session {
            user_id: body["user"]["id"].as_i64().unwrap(),
            cookie,
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Id of the first account of the session's user
    pub async fn first_account(&self, session: &Session) -> i64 {
        let accounts = self.get("/v1/accounts", session).await.json();
        accounts[0]["id"].as_i64().unwrap()
    }

    /// Id of the session user's own category with the given name
    pub async fn category_named(&self, session: &Session, name: &str) -> i64 {
        let categories = self.get("/v1/categories", session).await.json();
        categories
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == name)
            .and_then(|c| c["id"].as_i64())
            .unwrap_or_else(|| panic!("no category named {}", name))
    }
}

/// `auth_token=<value>` from the Set-Cookie headers, if present
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    set_cookie_headers(headers)
        .into_iter()
        .find(|c| c.starts_with("auth_token="))
        .and_then(|c| c.split(';').next().map(str::to_string))
}

pub fn set_cookie_headers(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
