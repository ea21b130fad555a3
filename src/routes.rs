// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    handlers::{api, chat, health, quiz},
    state::AppState,
    utils::session_cookie::session_middleware,
};

/// Assembles the main application router.
///
/// * Page routes (quiz flow and chat) sit behind the session middleware.
/// * The JSON generation endpoint is stateless and allows cross-origin calls.
/// * Applies global request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let page_routes = Router::new()
        .route("/", get(quiz::index))
        .route("/start", post(quiz::start))
        .route("/quiz", get(quiz::quiz))
        .route("/submit_answer", post(quiz::submit_answer))
        .route("/results", get(quiz::results))
        .route("/chat", get(chat::chat))
        .route("/chat_message", post(chat::chat_message))
        .route("/resume_quiz", post(chat::resume_quiz))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let api_routes = Router::new()
        .route("/generate_question", post(api::generate_question))
        .layer(cors);

    Router::new()
        .merge(page_routes)
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
