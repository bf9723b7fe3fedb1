use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_auth;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes: no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh));

    // Protected API routes: require a Bearer token issued by the auth provider
    let protected = Router::new()
        // Session
        .route("/api/auth/session", get(handlers::auth::session))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Trades
        .route("/api/trades", get(handlers::trades::list).post(handlers::trades::create))
        .route(
            "/api/trades/:id",
            get(handlers::trades::detail)
                .put(handlers::trades::update)
                .delete(handlers::trades::remove),
        )
        // Strategies
        .route("/api/strategies", get(handlers::strategies::list).post(handlers::strategies::create))
        .route(
            "/api/strategies/:id",
            get(handlers::strategies::detail)
                .put(handlers::strategies::replace)
                .delete(handlers::strategies::remove),
        )
        .route("/api/strategies/:id/performance", get(handlers::strategies::performance))
        // Analytics
        .route("/api/statistics", get(handlers::analytics::statistics))
        .route("/api/analytics/pnl-history", get(handlers::analytics::pnl_history))
        .route("/api/dashboard/summary", get(handlers::dashboard::summary))
        .route("/api/confluence-trades", get(handlers::confluence::list))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
