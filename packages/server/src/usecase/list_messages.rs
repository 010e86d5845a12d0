//! UseCase: ルームのメッセージ一覧（再接続後の取りこぼし補完用）

use std::{collections::HashSet, sync::Arc};

use crate::domain::{
    Attachment, MessageRepository, PersistedMessage, RepositoryError, RoomId, UserId,
};

/// 一覧の 1 件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessage {
    pub message: PersistedMessage,
    pub attachments: Vec<Attachment>,
    /// 呼び出したユーザーが既読にしているか
    pub is_read: bool,
    /// 呼び出したユーザー自身の投稿で、他の誰かが既読にしているか
    pub is_read_by_others: bool,
}

pub struct ListMessagesUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl ListMessagesUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// ルームのメッセージを古い順に返す
    pub async fn execute(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<Vec<RoomMessage>, RepositoryError> {
        let read: HashSet<_> = self
            .repository
            .read_message_ids(room_id, user_id)
            .await?
            .into_iter()
            .collect();
        let read_by_others: HashSet<_> = self
            .repository
            .read_by_others_ids(room_id, user_id)
            .await?
            .into_iter()
            .collect();

        let mut result = Vec::new();
        for message in self.repository.list_messages(room_id).await? {
            let attachments = self.repository.list_attachments(message.id).await?;
            let is_read = read.contains(&message.id);
            let is_read_by_others = read_by_others.contains(&message.id);
            result.push(RoomMessage {
                message,
                attachments,
                is_read,
                is_read_by_others,
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageContent, NewMessage, ReadReceipt, Timestamp},
        infrastructure::repository::InMemoryMessageRepository,
    };

    #[tokio::test]
    async fn test_list_messages_with_read_flags() {
        // テスト項目: ルームのメッセージが古い順に、添付と既読フラグ付きで返る
        // given (前提条件):
        let repository = Arc::new(InMemoryMessageRepository::new());
        let mut ids = Vec::new();
        for (room, attachments) in [(42, vec!["a.png".to_string()]), (7, vec![]), (42, vec![])] {
            let persisted = repository
                .create_message(NewMessage {
                    room_id: RoomId::new(room),
                    sender_id: UserId::new(1),
                    content: MessageContent::new("hi".to_string()).unwrap(),
                    thread_root_id: None,
                    attachments,
                    received_at: Timestamp::new(0),
                })
                .await
                .unwrap();
            ids.push(persisted.id);
        }
        repository
            .mark_read(ReadReceipt {
                message_id: ids[2],
                user_id: UserId::new(2),
                read_at: Timestamp::new(1),
            })
            .await
            .unwrap();
        let usecase = ListMessagesUseCase::new(repository);

        // when (操作):
        let messages = usecase
            .execute(RoomId::new(42), UserId::new(2))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message.id, ids[0]);
        assert_eq!(messages[0].attachments.len(), 1);
        assert!(!messages[0].is_read);
        assert_eq!(messages[1].message.id, ids[2]);
        assert!(messages[1].is_read);
        assert!(messages.iter().all(|m| !m.is_read_by_others));
    }

    #[tokio::test]
    async fn test_list_messages_marks_own_messages_read_by_others() {
        // テスト項目: 送信者から見て、他人が既読にした自分の投稿だけに印が付く
        // given (前提条件):
        let repository = Arc::new(InMemoryMessageRepository::new());
        let mut ids = Vec::new();
        for sender in [1, 1, 2] {
            let persisted = repository
                .create_message(NewMessage {
                    room_id: RoomId::new(42),
                    sender_id: UserId::new(sender),
                    content: MessageContent::new("hi".to_string()).unwrap(),
                    thread_root_id: None,
                    attachments: Vec::new(),
                    received_at: Timestamp::new(0),
                })
                .await
                .unwrap();
            ids.push(persisted.id);
        }
        for (message_id, reader) in [(ids[0], 2), (ids[1], 1), (ids[2], 3)] {
            repository
                .mark_read(ReadReceipt {
                    message_id,
                    user_id: UserId::new(reader),
                    read_at: Timestamp::new(1),
                })
                .await
                .unwrap();
        }
        let usecase = ListMessagesUseCase::new(repository);

        // when (操作):
        let messages = usecase
            .execute(RoomId::new(42), UserId::new(1))
            .await
            .unwrap();

        // then (期待する結果):
        let flags: Vec<_> = messages.iter().map(|m| m.is_read_by_others).collect();
        assert_eq!(flags, vec![true, false, false]);
    }
}
