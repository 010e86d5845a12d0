//! WebSocket connection handlers.
//!
//! ## セッションのライフサイクル
//!
//! 1. ハンドシェイク: 資格情報（401）→ room_id（400）の順に検証し、失敗時は状態を作らない
//! 2. Registry への登録
//! 3. 読み取りループ（別タスク）と書き込みループを並行に動かし、どちらかが終われば終了
//! 4. `SessionGuard` の drop で登録解除（どの経路で終了しても 1 回）

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{
    sink::{Sink, SinkExt},
    stream::{SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{InboundMessage, RoomId, SessionId, UserId},
    infrastructure::dto::websocket::InboundFrame,
    ui::state::AppState,
    usecase::{ConnectError, DisconnectSessionUseCase},
};

/// Query parameters for WebSocket connection
///
/// Both are optional at the extractor level so the handler decides the status code.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
    pub room_id: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Response {
    let (user_id, room_id) = match state
        .connect_session_usecase
        .authorize(query.token.as_deref(), query.room_id.as_deref())
    {
        Ok(identity) => identity,
        Err(ConnectError::Unauthorized(e)) => {
            tracing::warn!("Rejected WebSocket handshake: {}", e);
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Err(e @ ConnectError::InvalidRoomId(_)) => {
            tracing::warn!("Rejected WebSocket handshake: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    ws.on_failed_upgrade(move |e| {
        tracing::debug!(
            "WebSocket upgrade failed for user {} in room {}: {}",
            user_id,
            room_id,
            e
        );
    })
    .on_upgrade(move |socket| handle_socket(socket, state, room_id, user_id))
}

/// Unregisters the session when dropped
struct SessionGuard {
    room_id: RoomId,
    session_id: SessionId,
    disconnect: Arc<DisconnectSessionUseCase>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.disconnect.execute(self.room_id, self.session_id);
    }
}

/// Spawns a task that drains the session's outbound queue into the WebSocket sink.
///
/// The task ends when the queue closes (the registry dropped this session) or a
/// socket write fails.
fn pusher_loop<S>(
    mut rx: mpsc::Receiver<String>,
    mut sender: S,
    session_id: SessionId,
) -> tokio::task::JoinHandle<()>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: std::fmt::Display,
{
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(payload.into())).await {
                tracing::debug!("Write to session {} failed: {}", session_id, e);
                return;
            }
        }
        tracing::debug!("Outbound queue of session {} closed", session_id);
        let _ = sender.close().await;
    })
}

/// Reads frames from the client and runs each one through the ingestion pipeline.
async fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    room_id: RoomId,
    user_id: UserId,
    session_id: SessionId,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!("WebSocket error on session {}: {}", session_id, e);
                break;
            }
        };

        let frame = match msg {
            Message::Text(text) => serde_json::from_str::<InboundFrame>(text.as_str()),
            Message::Binary(bytes) => serde_json::from_slice::<InboundFrame>(&bytes),
            Message::Close(_) => {
                tracing::debug!("Session {} requested close", session_id);
                break;
            }
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        // 形式不正なフレームはこのセッションだけを終了させる
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(
                    "Malformed frame from session {} (user {}), closing: {}",
                    session_id,
                    user_id,
                    e
                );
                break;
            }
        };

        let message = match InboundMessage::try_from(frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Rejected message from user {}: {}", user_id, e);
                continue;
            }
        };

        if let Err(e) = state
            .send_message_usecase
            .execute(room_id, user_id, message)
            .await
        {
            tracing::warn!(
                "Message from user {} in room {} was not delivered: {}",
                user_id,
                room_id,
                e
            );
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room_id: RoomId, user_id: UserId) {
    let (sender, receiver) = socket.split();

    let (session, rx) = state.connect_session_usecase.execute(room_id, user_id);
    let session_id = session.id;
    // Registry が唯一の sender を持つ（登録解除で送信キューが閉じる）
    drop(session);

    let _guard = SessionGuard {
        room_id,
        session_id,
        disconnect: state.disconnect_session_usecase.clone(),
    };

    let mut send_task = pusher_loop(rx, sender, session_id);
    let mut recv_task = tokio::spawn(reader_loop(
        receiver,
        state.clone(),
        room_id,
        user_id,
        session_id,
    ));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        result = &mut recv_task => {
            if let Err(e) = result.as_ref() && e.is_panic() {
                tracing::error!("Read loop of session {} panicked: {}", session_id, e);
            }
            send_task.abort();
        }
        result = &mut send_task => {
            if let Err(e) = result.as_ref() && e.is_panic() {
                tracing::error!("Write loop of session {} panicked: {}", session_id, e);
            }
            recv_task.abort();
        }
    }

    tracing::debug!("Session {} of user {} ended", session_id, user_id);
}
