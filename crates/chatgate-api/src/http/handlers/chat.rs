//! Chat endpoints.
//!
//! - POST /chat        - buffered answer as one JSON body
//! - POST /chat/stream - Server-Sent Events
//!
//! SSE data payloads:
//! - `{"chunk": "..."}` for each fragment
//! - `{"done": true}` once the answer is complete
//! - `{"error": "..."}` if the provider fails mid-stream

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};
use serde_json::json;

use chatgate_types::chat::{AssistantReply, ChatRequest, ChatStreamEvent};
use chatgate_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthenticatedUser;
use crate::state::AppState;

/// POST /chat - buffered chat completion.
pub async fn chat(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<AssistantReply>, AppError> {
    let Json(request) = payload?;
    let reply = state.chat_service.complete(&identity, request).await?;
    Ok(Json(reply))
}

/// POST /chat/stream - SSE streaming chat completion.
///
/// The first item is awaited before the response starts, so a provider that
/// fails up front gets a regular `PROVIDER_ERROR` response instead of an
/// event stream.
pub async fn chat_stream(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let Json(request) = payload?;
    let mut stream = state.chat_service.complete_stream(&identity, request);

    let first = match stream.next().await {
        Some(Err(e)) => return Err(e.into()),
        other => other,
    };

    let sse_stream = async_stream::stream! {
        let mut next = first;
        while let Some(item) = next {
            let terminal = !matches!(item, Ok(ChatStreamEvent::Fragment(_)));
            yield Ok::<_, Infallible>(sse_event(&item));
            if terminal {
                break;
            }
            next = stream.next().await;
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn sse_event(item: &Result<ChatStreamEvent, ChatError>) -> Event {
    let payload = match item {
        Ok(ChatStreamEvent::Fragment(text)) => json!({ "chunk": text }),
        Ok(ChatStreamEvent::Done) => json!({ "done": true }),
        Err(e) => json!({ "error": e.to_string() }),
    };
    Event::default().data(payload.to_string())
}
