use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use kingchat_core::{session::stream_reply, TurnError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{convert::Infallible, sync::Arc};
use tokio::sync::mpsc;

use crate::session::SessionId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatInput {
    pub message: String,
}

/// POST /api/chat
///
/// Streams `delta` events carrying `{"text"}` fragments, then one `done`
/// event carrying the recorded `{"reply"}`. A failed generation still ends
/// with `done`, its reply being the `Error: ...` text. A second message
/// while a reply is still being generated gets 409.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(input): Json<ChatInput>,
) -> Response {
    let turn = match state
        .with_session(&session.id, |s| s.begin_turn(&input.message))
        .await
    {
        Ok(turn) => turn,
        Err(e @ TurnError::Empty) => return super::bad_request(session, e.to_string()),
        Err(e @ TurnError::Busy) => return super::conflict(session, e.to_string()),
    };

    tracing::info!(model = %turn.request.model, session = %session.id, "Generating reply");

    // Generation runs to completion and is recorded even if the page disconnects.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let turn_state = state.clone();
    let id = session.id.clone();
    let (turn_id, request) = (turn.id, turn.request);
    let task = tokio::spawn(async move {
        let mut forward = move |fragment: &str| {
            let _ = tx.send(fragment.to_string());
        };
        let outcome = stream_reply(turn_state.backend.as_ref(), request, &mut forward).await;
        turn_state
            .with_session(&id, |s| s.finish_turn(turn_id, outcome))
            .await
    });

    let stream = async_stream::stream! {
        while let Some(text) = rx.recv().await {
            yield Ok::<_, Infallible>(json_event("delta", &json!({ "text": text })));
        }
        let reply = match task.await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Chat turn task failed: {}", e);
                format!("Error: {}", e)
            }
        };
        yield Ok(json_event("done", &json!({ "reply": reply })));
    };

    (session, Sse::new(stream).keep_alive(KeepAlive::default())).into_response()
}

fn json_event<T: Serialize>(name: &'static str, payload: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(payload)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}
