pub mod chat;
pub mod session;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::page;
use crate::session::SessionId;
use crate::state::AppState;

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/health", get(health))
        .route("/api/session", get(session::get_session))
        .route("/api/models", get(session::list_models))
        .route("/api/model", post(session::select_model))
        .route("/api/clear", post(session::clear))
        .route("/api/chat", post(chat::chat))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub(crate) fn bad_request(session: SessionId, message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, session, message)
}

pub(crate) fn conflict(session: SessionId, message: impl Into<String>) -> Response {
    error_response(StatusCode::CONFLICT, session, message)
}

fn error_response(status: StatusCode, session: SessionId, message: impl Into<String>) -> Response {
    (
        status,
        session,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}
