// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers::quiz, state::AppState, utils::jwt::auth_middleware};

/// Assembles the main application router.
///
/// * Every quiz route requires a bearer token; its subject owns the sessions it creates.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let quiz_routes = Router::new()
        .route("/sessions", post(quiz::start_session))
        .route(
            "/sessions/{id}",
            get(quiz::get_session).delete(quiz::abandon_session),
        )
        .route("/sessions/{id}/answers", put(quiz::record_answer))
        .route("/sessions/{id}/position", put(quiz::navigate))
        .route("/sessions/{id}/signals", post(quiz::report_signal))
        .route("/sessions/{id}/submit", post(quiz::submit_session))
        .route("/sessions/{id}/result", get(quiz::get_result))
        .route("/sessions/{id}/restart", post(quiz::restart_session))
        .route("/attempts", get(quiz::list_attempts))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
