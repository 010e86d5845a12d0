//! UseCase: メッセージ送信処理（Ingestion Pipeline）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 検証 → 受信時刻の付与 → 保存 → メンション記録 → 配信キューへの投入 の順序
//!
//! ### なぜこのテストが必要か
//! - 「保存してから配信」が 1 単位であることを保証する（保存失敗は配信されない）
//! - スレッドの親が別ルームにあるメッセージは、保存前に拒否されなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存され、Created イベントが 1 件投入される
//! - 異常系：空メッセージ、存在しない／別ルームの親、保存失敗、Dispatcher 停止
//! - エッジケース：本文が空で添付だけのメッセージ、未登録ユーザーへのメンション

use std::sync::Arc;

use tsudoi_shared::time::Clock;

use crate::domain::{
    DispatchEvent, InboundMessage, MessageDispatcher, MessageRepository, NewMessage,
    PersistedMessage, RoomId, Timestamp, UserId,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（Persistence Port）
    repository: Arc<dyn MessageRepository>,
    /// 配信キューへの投入口
    dispatcher: Arc<dyn MessageDispatcher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        dispatcher: Arc<dyn MessageDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - セッション（または REST のパス）が示すルーム
    /// * `sender_id` - 認証済みの送信者
    /// * `message` - クライアントから受け取った内容
    ///
    /// # Returns
    ///
    /// * `Ok(PersistedMessage)` - 保存され、配信キューに投入されたメッセージ
    /// * `Err(SendMessageError)` - 検証・保存・投入のいずれかに失敗
    pub async fn execute(
        &self,
        room_id: RoomId,
        sender_id: UserId,
        message: InboundMessage,
    ) -> Result<PersistedMessage, SendMessageError> {
        // 1. 検証
        if message.is_empty() {
            return Err(SendMessageError::InvalidContent(
                "message has neither content nor attachments".to_string(),
            ));
        }
        self.validate_thread_root(room_id, &message).await?;

        // 2. 受信時刻を付与して保存
        let new_message = NewMessage {
            room_id,
            sender_id,
            content: message.content,
            thread_root_id: message.thread_root_id,
            attachments: message.attachments,
            received_at: Timestamp::new(self.clock.now_millis()),
        };
        let persisted = self
            .repository
            .create_message(new_message)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to persist message from user {} in room {}: {}",
                    sender_id,
                    room_id,
                    e
                );
                SendMessageError::PersistFailed(e)
            })?;

        // 3. メンションを記録（失敗しても送信自体は成功扱い）
        self.record_mentions(&persisted).await;

        // 4. 配信キューに投入
        self.dispatcher
            .submit(DispatchEvent::Created(persisted.clone()))
            .await
            .map_err(|source| {
                tracing::error!("Message {} was persisted but not dispatched", persisted.id);
                SendMessageError::DispatchFailed {
                    message_id: persisted.id,
                    source,
                }
            })?;

        tracing::debug!(
            "Message {} from user {} accepted in room {}",
            persisted.id,
            sender_id,
            room_id
        );
        Ok(persisted)
    }

    async fn record_mentions(&self, message: &PersistedMessage) {
        let usernames = message.content.mentions();
        if usernames.is_empty() {
            return;
        }

        match self
            .repository
            .record_mentions(message.id, &usernames)
            .await
        {
            Ok(targets) => tracing::debug!(
                "Message {} mentions {} user(s)",
                message.id,
                targets.len()
            ),
            Err(e) => tracing::warn!(
                "Failed to record mentions of message {}: {}",
                message.id,
                e
            ),
        }
    }

    async fn validate_thread_root(
        &self,
        room_id: RoomId,
        message: &InboundMessage,
    ) -> Result<(), SendMessageError> {
        let Some(thread_root_id) = message.thread_root_id else {
            return Ok(());
        };

        let root = self
            .repository
            .find_message(thread_root_id)
            .await
            .map_err(SendMessageError::PersistFailed)?
            .ok_or(SendMessageError::InvalidThreadRoot(thread_root_id))?;

        if root.room_id != room_id {
            return Err(SendMessageError::ThreadRootInOtherRoom {
                thread_root_id,
                expected: room_id,
                actual: root.room_id,
            });
        }
        Ok(())
    }
}
