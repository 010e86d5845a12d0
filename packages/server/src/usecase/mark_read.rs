//! UseCase: 既読処理と既読通知
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - MarkReadUseCase::mark_one() / mark_all()
//! - 既読レコードの書き込みと、ルームへの既読通知の有無
//!
//! ### なぜこのテストが必要か
//! - 既読は冪等でなければならない（同じ既読で通知が 2 回飛ばない）
//! - 一括既読は、件数に関係なく通知を 1 回にまとめる
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規の既読 → 通知 1 件
//! - 異常系：存在しないメッセージ
//! - エッジケース：二重既読、既読にするものがない一括既読

use std::sync::Arc;

use tsudoi_shared::time::Clock;

use crate::domain::{
    MessageId, MessageRepository, ReadNotice, ReadReceipt, ReceiptNotifier, RoomId, Timestamp,
    UserId,
};

use super::error::MarkReadError;

/// 既読処理のユースケース
pub struct MarkReadUseCase {
    repository: Arc<dyn MessageRepository>,
    notifier: Arc<dyn ReceiptNotifier>,
    clock: Arc<dyn Clock>,
}

impl MarkReadUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        notifier: Arc<dyn ReceiptNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            notifier,
            clock,
        }
    }

    /// 1 件のメッセージを既読にする
    ///
    /// 新規に既読になった場合だけ `true` を返し、ルームへ通知する。
    pub async fn mark_one(
        &self,
        user_id: UserId,
        message_id: MessageId,
    ) -> Result<bool, MarkReadError> {
        let message = self
            .repository
            .find_message(message_id)
            .await?
            .ok_or(MarkReadError::MessageNotFound(message_id))?;

        let newly_read = self
            .repository
            .mark_read(ReadReceipt {
                message_id,
                user_id,
                read_at: Timestamp::new(self.clock.now_millis()),
            })
            .await?;

        if newly_read {
            self.notifier.notify_read(ReadNotice {
                room_id: message.room_id,
                message_id,
                user_id,
            });
        } else {
            tracing::debug!(
                "Message {} was already read by user {}",
                message_id,
                user_id
            );
        }

        Ok(newly_read)
    }

    /// ルーム内の未読（自分以外の投稿）を全て既読にする
    ///
    /// 新規に既読になった件数を返す。1 件以上あれば、最も新しいメッセージについて
    /// 1 回だけ通知する。
    pub async fn mark_all(
        &self,
        user_id: UserId,
        room_id: RoomId,
    ) -> Result<usize, MarkReadError> {
        let newly_read = self
            .repository
            .mark_room_read(room_id, user_id, Timestamp::new(self.clock.now_millis()))
            .await?;

        if let Some(latest) = newly_read.iter().max() {
            self.notifier.notify_read(ReadNotice {
                room_id,
                message_id: *latest,
                user_id,
            });
        }

        Ok(newly_read.len())
    }
}
