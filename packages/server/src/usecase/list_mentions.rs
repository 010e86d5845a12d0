//! UseCase: 自分宛てのメンション一覧

use std::sync::Arc;

use crate::domain::{MessageRepository, PersistedMessage, RepositoryError, UserId};

pub struct ListMentionsUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl ListMentionsUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// `user_id` をメンションしたメッセージを古い順に返す（削除済みは含まない）
    pub async fn execute(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PersistedMessage>, RepositoryError> {
        self.repository.list_mentions(user_id).await
    }
}
