/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use ledgerline_api::{app::AppState, config::Config};
/// use ledgerline_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config);
/// let app = ledgerline_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, middleware::session::session_auth_layer};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{NaiveDate, Utc};
use ledgerline_shared::models::transaction::MAX_RECEIPT_BYTES;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Largest accepted request body: a receipt image plus the surrounding JSON
pub const MAX_BODY_BYTES: usize = MAX_RECEIPT_BYTES + 64 * 1024;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Current calendar date, used for month windows and due rules
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                      # Health check (public)
/// └── /v1/
///     ├── /auth/                   # register, login, logout (public), me
///     ├── /accounts                # CRUD
///     ├── /categories              # CRUD with budget status
///     ├── /transactions            # CRUD, /import, /export
///     ├── /recurring               # rules, /process
///     ├── /goals                   # goals, /:id/contribute
///     ├── /settings                # localization
///     ├── /activity                # audit trail
///     ├── /stats/                  # overview, charts
///     └── /data                    # preview, reset
/// ```
///
/// Everything under `/v1` except register, login and logout goes through
/// [`session_auth_layer`].
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes that work without a session
    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout));

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/accounts",
            get(routes::accounts::list_accounts).post(routes::accounts::create_account),
        )
        .route(
            "/accounts/:id",
            put(routes::accounts::update_account).delete(routes::accounts::delete_account),
        )
        .route(
            "/categories",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route(
            "/categories/:id",
            put(routes::categories::update_category).delete(routes::categories::delete_category),
        )
        .route(
            "/transactions",
            get(routes::transactions::list_transactions).post(routes::transactions::create_transaction),
        )
        .route("/transactions/import", post(routes::transactions::import_transactions))
        .route("/transactions/export", get(routes::transactions::export_transactions))
        .route(
            "/transactions/:id",
            get(routes::transactions::get_transaction)
                .put(routes::transactions::update_transaction)
                .delete(routes::transactions::delete_transaction),
        )
        .route(
            "/recurring",
            get(routes::recurring::list_rules).post(routes::recurring::create_rule),
        )
        .route("/recurring/process", post(routes::recurring::process_rules))
        .route("/recurring/:id", delete(routes::recurring::delete_rule))
        .route("/goals", get(routes::goals::list_goals).post(routes::goals::create_goal))
        .route("/goals/:id", delete(routes::goals::delete_goal))
        .route("/goals/:id/contribute", post(routes::goals::contribute))
        .route(
            "/settings",
            get(routes::settings::get_settings).put(routes::settings::update_settings),
        )
        .route("/activity", get(routes::activity::list_activity))
        .route("/stats/overview", get(routes::stats::overview))
        .route("/stats/charts", get(routes::stats::charts))
        .route("/data", get(routes::data::preview).delete(routes::data::reset))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let v1_routes = Router::new().merge(public_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Cookies need credentials, which rules out a wildcard origin
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
