//! v1 Realtime chat endpoint.
//!
//! One websocket per listener. Incoming frames run through the same
//! persist → compose → persist flow as the REST endpoint; the resulting
//! message pair is multicast to every listener of the chat (including the
//! originating socket) through the connection registry.

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::api::v1::response::{ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::db::MessageStore;
use crate::error::Result;
use crate::models::{Message, Role};
use crate::realtime::MessagePairEvent;

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    token: Option<String>,
}

/// Incoming frame payload; a bare-text frame degrades to `content` only.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingFrame {
    content: String,
    #[serde(default)]
    is_voice: bool,
}

/// `GET /api/v1/chats/{chatId}/ws`
///
/// Browser websocket clients cannot set an Authorization header, so the API
/// key travels in the `token` query parameter; a bearer header is accepted
/// too.
pub async fn chat_ws(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(auth): Query<WsAuthQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let token = auth.token.clone().or_else(|| {
        headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(ToString::to_string)
    });

    let keys = &state.config.server.api_keys;
    let authorized = !keys.is_empty() && token.map(|t| keys.contains(&t)).unwrap_or(false);
    if !authorized {
        return ApiResponse::<()>::error(ErrorCode::Unauthorized, "Invalid or missing token")
            .into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(state, chat_id, socket))
}

async fn handle_socket(state: AppState, chat_id: String, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (connection_id, mut events) = state.registry.subscribe(&chat_id);
    tracing::debug!(chat_id = %chat_id, connection_id, "Realtime listener attached");

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Err(error) = handle_incoming(&state, &chat_id, text.as_str()).await {
                            tracing::warn!(error = %error, chat_id = %chat_id, "Realtime message handling failed");
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        tracing::debug!(error = %error, "Websocket receive error");
                        break;
                    }
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                let Ok(payload) = serde_json::to_string(&event) else { continue };
                if sink.send(WsMessage::Text(payload.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    state.registry.unsubscribe(&chat_id, connection_id);
    tracing::debug!(chat_id = %chat_id, connection_id, "Realtime listener detached");
}

/// Persist the user message, produce the reply, persist it and multicast.
async fn handle_incoming(state: &AppState, chat_id: &str, raw: &str) -> Result<()> {
    let frame: IncomingFrame = serde_json::from_str(raw).unwrap_or_else(|_| IncomingFrame {
        content: raw.to_string(),
        is_voice: false,
    });

    let user_message =
        Message::new(chat_id, Role::User, frame.content.clone()).voice(frame.is_voice);
    state.db.create_message(&user_message).await?;

    let reply = state.composer.respond(&frame.content).await;

    let assistant_message = Message::new(chat_id, Role::Assistant, reply);
    state.db.create_message(&assistant_message).await?;

    state.registry.broadcast(
        chat_id,
        &MessagePairEvent {
            user_message,
            assistant_message,
        },
    );

    Ok(())
}
