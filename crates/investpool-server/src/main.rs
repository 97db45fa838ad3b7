use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower::util::ServiceExt;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod middleware;
mod routes;
mod services;

use error::AppError;
use services::sessions::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "investpool_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env();

    // Initialize database
    let db = db::Database::connect(&config.database_url).await?;
    db.run_migrations().await?;
    if config.seed_demo_data {
        db.seed_demo_data().await?;
    }

    // Build application state
    let state = AppState {
        db,
        config: config.clone(),
        sessions: SessionStore::new(),
    };

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    // Admin-only routes
    let admin_routes = Router::new()
        .nest("/investors", routes::investors::router())
        .route_layer(axum_middleware::from_fn(
            middleware::auth::admin_middleware,
        ));

    // Build protected routes (require a session)
    let protected_routes = Router::new()
        .merge(routes::auth::session_router())
        .nest("/dashboard", routes::dashboard::router())
        .nest("/investments", routes::investments::router())
        .nest("/proposals", routes::proposals::router())
        .nest("/comments", routes::comments::router())
        .nest("/events", routes::events::router())
        .nest("/admin", admin_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Build API router
    let api_router = Router::new()
        .merge(routes::auth::router())
        .merge(protected_routes);

    // Build main router with SPA fallback
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_router)
        .fallback(serve_spa)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health_check() -> &'static str {
    "OK"
}

async fn serve_spa(State(state): State<AppState>, req: Request<Body>) -> Response {
    let path = req.uri().path();

    if path.starts_with("/api/") {
        return AppError::NotFound("No such endpoint".to_string()).into_response();
    }

    // Try to serve static file first
    let static_dir = std::path::Path::new(&state.config.static_dir);
    if path != "/" && static_dir.join(path.trim_start_matches('/')).is_file() {
        let res = ServeDir::new(static_dir)
            .oneshot(req)
            .await
            .unwrap_or_else(|never| match never {});
        return res.into_response();
    }

    // Client-side routes all load index.html
    match tokio::fs::read(static_dir.join("index.html")).await {
        Ok(contents) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            contents,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: db::Database,
    pub config: config::Config,
    pub sessions: SessionStore,
}
