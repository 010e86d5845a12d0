//! 既読通知のファンアウト
//!
//! 既読レコードの書き込み後、呼び出し元のタスクでそのままルームへ配る。
//! 配信と失敗時の扱いは Dispatcher と同じ `deliver_to_room` を使う。
//!
//! Dispatcher のキューは経由しないため、キューに残っているメッセージ N より先に
//! N の `read` が届くことがある。

use std::sync::Arc;

use crate::{
    domain::{ConnectionRegistry, ReadNotice, ReceiptNotifier},
    infrastructure::{dto::websocket::ReadEnvelope, fanout::deliver_to_room},
};

pub struct ReadReceiptFanout {
    registry: Arc<dyn ConnectionRegistry>,
}

impl ReadReceiptFanout {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

impl ReceiptNotifier for ReadReceiptFanout {
    fn notify_read(&self, notice: ReadNotice) -> usize {
        let payload = match serde_json::to_string(&ReadEnvelope::from(notice)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize read notice: {}", e);
                return 0;
            }
        };

        let report = deliver_to_room(self.registry.as_ref(), notice.room_id, &payload);
        tracing::debug!(
            "Read notice for message {} by user {} delivered to {} session(s)",
            notice.message_id,
            notice.user_id,
            report.delivered
        );
        report.delivered
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        domain::{MessageId, RoomId, SessionHandle, UserId},
        infrastructure::registry::InMemoryConnectionRegistry,
    };

    #[test]
    fn test_notify_read_reaches_every_session_of_the_room() {
        // テスト項目: 既読通知がルームの全セッションに届き、他ルームには届かない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        let (tx3, mut rx3) = mpsc::channel(4);
        registry.register(SessionHandle::new(RoomId::new(42), UserId::new(1), tx1));
        registry.register(SessionHandle::new(RoomId::new(42), UserId::new(2), tx2));
        registry.register(SessionHandle::new(RoomId::new(7), UserId::new(3), tx3));
        let notifier = ReadReceiptFanout::new(registry);

        // when (操作):
        let delivered = notifier.notify_read(ReadNotice {
            room_id: RoomId::new(42),
            message_id: MessageId::new(5),
            user_id: UserId::new(2),
        });

        // then (期待する結果):
        assert_eq!(delivered, 2);
        for rx in [&mut rx1, &mut rx2] {
            let json: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
            assert_eq!(
                json,
                serde_json::json!({"type": "read", "message_id": 5, "user_id": 2, "room_id": 42})
            );
        }
        assert!(rx3.try_recv().is_err());
    }
}
