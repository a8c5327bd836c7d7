//! Real-time WebSocket endpoint
//!
//! GET /api/ws?token=<JWT>
//! Auth: JWT travels in the query string (browser WebSockets cannot set headers)
//!
//! The token decides tenant and role; the role decides which channels the
//! connection joins. Frames are `{"channel", "event", "data"}` text messages.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, Stream, StreamExt};
use serde::Deserialize;
use shared::error::AppError;
use shared::realtime::LiveEnvelope;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Duration;

use crate::auth::{CurrentUser, authenticate};
use crate::security_log;
use crate::state::AppState;

/// Keep-alive ping period
const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// GET /api/ws?token=<JWT>
pub async fn handle_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let user = authenticate(&state.jwt_service, &query.token).inspect_err(|_| {
        security_log!("WARN", "ws_auth_failed", path = "/api/ws");
    })?;

    // Subscribe before the upgrade so no event is lost in between
    let events = state.live.subscribe_role(&user.tenant_id, user.role);

    Ok(ws.on_upgrade(move |socket| ws_session(socket, user, events)))
}

async fn ws_session<S>(socket: WebSocket, user: CurrentUser, mut events: S)
where
    S: Stream<Item = Result<Arc<LiveEnvelope>, RecvError>> + Unpin,
{
    let (mut sink, mut stream) = socket.split();

    tracing::info!(
        tenant_id = %user.tenant_id,
        user_id = user.id,
        role = user.role.as_str(),
        "WS connected"
    );

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = events.next() => {
                match event {
                    Some(Ok(envelope)) => {
                        if send_message(&mut sink, &envelope).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(RecvError::Lagged(n))) => {
                        // best-effort: skipped events are not replayed
                        tracing::warn!(tenant_id = %user.tenant_id, lagged = n, "WS subscriber lagged");
                    }
                    Some(Err(RecvError::Closed)) | None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!(tenant_id = %user.tenant_id, user_id = user.id, "WS disconnected");
}

async fn send_message(
    sink: &mut SplitSink<WebSocket, Message>,
    envelope: &LiveEnvelope,
) -> Result<(), ()> {
    let json = serde_json::to_string(envelope).map_err(|e| {
        tracing::error!("Failed to serialize live event: {e}");
    })?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
