use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kingchat_core::{Message, Persona};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::session::SessionId;
use crate::state::AppState;

/// Everything the page needs to render itself
#[derive(Serialize)]
pub struct SessionView {
    pub persona: Persona,
    pub models: Vec<String>,
    pub model: String,
    pub messages: Vec<Message>,
    pub max_messages: usize,
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> (SessionId, Json<SessionView>) {
    let (model, messages, max_messages) = state
        .with_session(&session.id, |s| {
            (
                s.model().to_string(),
                s.history().visible().to_vec(),
                s.history().max_messages(),
            )
        })
        .await;

    let view = SessionView {
        persona: state.persona.as_ref().clone(),
        models: state.config.ollama.models.clone(),
        model,
        messages,
        max_messages,
    };
    (session, Json(view))
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub default: String,
}

pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.config.ollama.models.clone(),
        default: state.config.ollama.default_model.clone(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SelectModelRequest {
    pub model: String,
}

#[derive(Serialize)]
pub struct SelectModelResponse {
    pub model: String,
}

pub async fn select_model(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(request): Json<SelectModelRequest>,
) -> Response {
    let allowed = &state.config.ollama.models;
    let result = state
        .with_session(&session.id, |s| s.select_model(&request.model, allowed))
        .await;

    match result {
        Ok(()) => (
            session,
            Json(SelectModelResponse {
                model: request.model,
            }),
        )
            .into_response(),
        Err(e) => super::bad_request(session, e.to_string()),
    }
}

pub async fn clear(State(state): State<Arc<AppState>>, session: SessionId) -> Response {
    state.with_session(&session.id, |s| s.clear()).await;
    tracing::debug!("Cleared session {}", session.id);
    (StatusCode::NO_CONTENT, session, ()).into_response()
}
