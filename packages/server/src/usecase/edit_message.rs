//! UseCase: メッセージの編集・削除
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EditMessageUseCase::edit() / delete()
//! - 送信者本人の確認、保存、Updated / Deleted イベントの投入
//!
//! ### なぜこのテストが必要か
//! - 他人のメッセージを書き換えられないことを保証する
//! - 変更は新規メッセージと同じ配信経路で、ルームに再配信されなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：本人による編集・削除
//! - 異常系：他人による操作、存在しないメッセージ、長すぎる本文

use std::sync::Arc;

use tsudoi_shared::time::Clock;

use crate::domain::{
    Attachment, DispatchEvent, MessageContent, MessageDispatcher, MessageId, MessageRepository,
    PersistedMessage, Timestamp, UserId,
};

use super::error::EditMessageError;

/// 編集・削除のユースケース
pub struct EditMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    dispatcher: Arc<dyn MessageDispatcher>,
    clock: Arc<dyn Clock>,
}

impl EditMessageUseCase {
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

    /// 本文を編集し、`update` としてルームに再配信する
    ///
    /// 編集後のメッセージと、その添付ファイルを返す。
    pub async fn edit(
        &self,
        user_id: UserId,
        message_id: MessageId,
        content: String,
    ) -> Result<(PersistedMessage, Vec<Attachment>), EditMessageError> {
        let content = MessageContent::new(content)?;
        self.authorize(user_id, message_id).await?;

        let updated = self
            .repository
            .update_content(message_id, content, Timestamp::new(self.clock.now_millis()))
            .await?;

        self.dispatcher
            .submit(DispatchEvent::Updated(updated.clone()))
            .await
            .map_err(EditMessageError::DispatchFailed)?;

        tracing::info!("Message {} edited by user {}", message_id, user_id);
        let attachments = self.repository.list_attachments(message_id).await?;
        Ok((updated, attachments))
    }

    /// メッセージを削除し、`delete` としてルームに再配信する
    pub async fn delete(
        &self,
        user_id: UserId,
        message_id: MessageId,
    ) -> Result<(), EditMessageError> {
        self.authorize(user_id, message_id).await?;

        let deleted = self.repository.delete_message(message_id).await?;

        self.dispatcher
            .submit(DispatchEvent::Deleted {
                room_id: deleted.room_id,
                message_id,
            })
            .await
            .map_err(EditMessageError::DispatchFailed)?;

        tracing::info!("Message {} deleted by user {}", message_id, user_id);
        Ok(())
    }

    async fn authorize(
        &self,
        user_id: UserId,
        message_id: MessageId,
    ) -> Result<PersistedMessage, EditMessageError> {
        let message = self
            .repository
            .find_message(message_id)
            .await?
            .ok_or(EditMessageError::MessageNotFound(message_id))?;

        if message.sender_id != user_id {
            tracing::warn!(
                "User {} tried to change message {} sent by user {}",
                user_id,
                message_id,
                message.sender_id
            );
            return Err(EditMessageError::Forbidden(message_id));
        }
        Ok(message)
    }
}
