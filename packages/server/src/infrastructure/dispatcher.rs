//! Broadcast Dispatcher
//!
//! ## 責務
//!
//! - 保存済みメッセージ・編集・削除イベントを単一のキューから順に取り出す
//! - イベントごとに envelope を 1 回だけシリアライズし、ルームの全セッションへ配る
//!
//! ## 設計ノート
//!
//! コンシューマは 1 タスクのみ。各セッションの送信キューも FIFO なので、
//! 同じルームのイベントは投入順に全受信者へ届く。
//! キューは有界で、満杯の間 `submit` は待機する（生産者側へのバックプレッシャー）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{
        ConnectionRegistry, DispatchError, DispatchEvent, MessageDispatcher, MessageRepository,
    },
    infrastructure::{
        dto::websocket::{DeleteEnvelope, MessageEnvelope, UpdateEnvelope},
        fanout::deliver_to_room,
    },
};

/// 配信キューへの投入口
///
/// clone して UseCase 間で共有する。全ての handle が破棄されると Dispatcher は停止する。
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    sender: mpsc::Sender<DispatchEvent>,
}

#[async_trait]
impl MessageDispatcher for DispatcherHandle {
    async fn submit(&self, event: DispatchEvent) -> Result<(), DispatchError> {
        let room_id = event.room_id();
        self.sender
            .send(event)
            .await
            .map_err(|_| DispatchError::Closed(room_id))
    }
}

/// 配信キューのコンシューマ
pub struct BroadcastDispatcher {
    receiver: mpsc::Receiver<DispatchEvent>,
    repository: Arc<dyn MessageRepository>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl BroadcastDispatcher {
    /// Dispatcher タスクを起動し、投入口とタスクの handle を返す
    ///
    /// `capacity` はキューに滞留できるイベント数（0 は 1 として扱う）。
    pub fn spawn(
        repository: Arc<dyn MessageRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        capacity: usize,
    ) -> (DispatcherHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let dispatcher = Self {
            receiver,
            repository,
            registry,
        };
        let task = tokio::spawn(dispatcher.run());
        (DispatcherHandle { sender }, task)
    }

    async fn run(mut self) {
        tracing::info!("Broadcast dispatcher started");
        while let Some(event) = self.receiver.recv().await {
            self.dispatch(event).await;
        }
        tracing::info!("Broadcast dispatcher stopped: all producers are gone");
    }

    async fn dispatch(&self, event: DispatchEvent) {
        let room_id = event.room_id();
        let payload = match self.encode(&event).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize event for room {}: {}", room_id, e);
                return;
            }
        };

        let report = deliver_to_room(self.registry.as_ref(), room_id, &payload);
        tracing::debug!(
            "Dispatched to room {}: {} delivered, {} dropped",
            room_id,
            report.delivered,
            report.dropped.len()
        );
    }

    async fn encode(&self, event: &DispatchEvent) -> Result<String, serde_json::Error> {
        match event {
            DispatchEvent::Created(message) => {
                // メッセージは保存済みなので、添付の取得に失敗しても本文は配る
                let attachments = match self.repository.list_attachments(message.id).await {
                    Ok(attachments) => attachments,
                    Err(e) => {
                        tracing::warn!(
                            "Failed to load attachments of message {}, sending without them: {}",
                            message.id,
                            e
                        );
                        Vec::new()
                    }
                };
                serde_json::to_string(&MessageEnvelope::new(message, &attachments))
            }
            DispatchEvent::Updated(message) => {
                serde_json::to_string(&UpdateEnvelope::from(message))
            }
            DispatchEvent::Deleted {
                room_id,
                message_id,
            } => serde_json::to_string(&DeleteEnvelope::new(*room_id, *message_id)),
        }
    }
}
