use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod analytics;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soulscribe_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    let config = Arc::new(config);

    // Database
    let db = db::create_pool(&config.database_url).await;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let rate_limiter = RateLimitState::new();

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter,
    };

    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/readyz", get(handlers::health::readyz))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        // Users
        .route("/api/users/profile", get(handlers::users::get_profile))
        .route("/api/users/profile", put(handlers::users::update_profile))
        .route(
            "/api/users/preferences",
            put(handlers::users::update_preferences),
        )
        .route("/api/users/password", put(handlers::users::change_password))
        .route(
            "/api/users/deactivate",
            patch(handlers::users::deactivate_account),
        )
        .route("/api/users/account", delete(handlers::users::delete_account))
        // Moods
        .route("/api/moods", post(handlers::moods::create_mood))
        .route("/api/moods", get(handlers::moods::list_moods))
        .route("/api/moods/stats", get(handlers::moods::mood_stats))
        .route("/api/moods/:id", get(handlers::moods::get_mood))
        .route("/api/moods/:id", put(handlers::moods::update_mood))
        .route("/api/moods/:id", delete(handlers::moods::delete_mood))
        // Journals
        .route("/api/journals", post(handlers::journals::create_journal))
        .route("/api/journals", get(handlers::journals::list_journals))
        .route(
            "/api/journals/stats/overview",
            get(handlers::journals::journal_stats),
        )
        .route("/api/journals/:id", get(handlers::journals::get_journal))
        .route("/api/journals/:id", put(handlers::journals::update_journal))
        .route(
            "/api/journals/:id",
            delete(handlers::journals::delete_journal),
        )
        .route(
            "/api/journals/:id/favorite",
            patch(handlers::journals::toggle_favorite),
        )
        .route(
            "/api/journals/:id/archive",
            patch(handlers::journals::archive_journal),
        )
        // Chats
        .route("/api/chats/sessions", post(handlers::chats::create_session))
        .route("/api/chats/sessions", get(handlers::chats::list_sessions))
        .route(
            "/api/chats/stats/overview",
            get(handlers::chats::chat_stats),
        )
        .route(
            "/api/chats/sessions/:session_id",
            get(handlers::chats::get_session),
        )
        .route(
            "/api/chats/sessions/:session_id",
            put(handlers::chats::update_session),
        )
        .route(
            "/api/chats/sessions/:session_id",
            delete(handlers::chats::delete_session),
        )
        .route(
            "/api/chats/sessions/:session_id/messages",
            post(handlers::chats::add_message),
        )
        .route(
            "/api/chats/sessions/:session_id/feedback",
            post(handlers::chats::add_feedback),
        )
        // Analytics
        .route(
            "/api/analytics/dashboard",
            get(handlers::analytics::dashboard),
        )
        .route(
            "/api/analytics/mood-trends",
            get(handlers::analytics::trends),
        )
        .route(
            "/api/analytics/insights",
            get(handlers::analytics::insights),
        )
        // Patients
        .route("/api/patients", post(handlers::patients::create_patient))
        .route("/api/patients", get(handlers::patients::list_patients))
        .route("/api/patients/:id", get(handlers::patients::get_patient))
        .route("/api/patients/:id", put(handlers::patients::update_patient))
        .route(
            "/api/patients/:id",
            delete(handlers::patients::delete_patient),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .unwrap()];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    // Sweep expired rate-limit windows in the background
    {
        let limiter = state.rate_limiter.clone();
        let window_secs = config.rate_limit_window_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup(window_secs).await;
            }
        });
    }

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_api,
        ))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    // Use into_make_service_with_connect_info to provide client IP for rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .unwrap();
}
