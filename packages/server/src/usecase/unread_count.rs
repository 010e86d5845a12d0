//! UseCase: ルームの未読件数

use std::sync::Arc;

use crate::domain::{MessageRepository, RepositoryError, RoomId, UserId};

pub struct UnreadCountUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl UnreadCountUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// 他人の投稿のうち、まだ既読にしていない件数
    pub async fn execute(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<usize, RepositoryError> {
        self.repository.count_unread(room_id, user_id).await
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
    async fn test_unread_count_excludes_own_and_read_messages() {
        // テスト項目: 自分の投稿と既読済みは数えず、一括既読後は 0 になる
        // given (前提条件):
        let repository = Arc::new(InMemoryMessageRepository::new());
        let mut ids = Vec::new();
        for sender in [1, 2, 2, 3] {
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
        repository
            .mark_read(ReadReceipt {
                message_id: ids[1],
                user_id: UserId::new(1),
                read_at: Timestamp::new(1),
            })
            .await
            .unwrap();
        let usecase = UnreadCountUseCase::new(repository.clone());

        // when (操作):
        let before = usecase.execute(RoomId::new(42), UserId::new(1)).await.unwrap();
        repository
            .mark_room_read(RoomId::new(42), UserId::new(1), Timestamp::new(2))
            .await
            .unwrap();
        let after = usecase.execute(RoomId::new(42), UserId::new(1)).await.unwrap();

        // then (期待する結果):
        assert_eq!(before, 2);
        assert_eq!(after, 0);
    }
}
