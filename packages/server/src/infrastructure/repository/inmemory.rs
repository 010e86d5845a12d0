//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! BTreeMap / HashMap をインメモリ DB として使用します。
//!
//! メッセージは ID 順に並ぶ BTreeMap に保持するため、一覧は常に古い順になる。

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Attachment, MessageContent, MessageId, MessageRepository, NewMessage, PersistedMessage,
    ReadReceipt, RepositoryError, RoomId, Timestamp, UserId,
};

#[derive(Debug, Default)]
struct Store {
    last_id: u64,
    messages: BTreeMap<MessageId, PersistedMessage>,
    attachments: HashMap<MessageId, Vec<Attachment>>,
    receipts: HashMap<(MessageId, UserId), ReadReceipt>,
    mentions: BTreeSet<(MessageId, UserId)>,
    users: HashMap<UserId, String>,
}

impl Store {
    fn display_name(&self, user_id: UserId) -> String {
        self.users
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| format!("user-{}", user_id))
    }

    /// 同名のユーザーが複数いる場合は ID の小さい方
    fn user_by_name(&self, name: &str) -> Option<UserId> {
        self.users
            .iter()
            .filter(|(_, display_name)| display_name.as_str() == name)
            .map(|(id, _)| *id)
            .min()
    }
}

/// インメモリ Message Repository 実装
///
/// 表示名はユーザー登録（`register_user`）から引く。未登録のユーザーは `user-{id}`。
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    store: Mutex<Store>,
    /// true の間、書き込み系の操作は `RepositoryError::Unavailable` を返す
    unavailable: AtomicBool,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ユーザーの表示名を登録（上書き）
    pub async fn register_user(&self, user_id: UserId, display_name: impl Into<String>) {
        let mut store = self.store.lock().await;
        store.users.insert(user_id, display_name.into());
    }

    /// ストレージ障害を模擬する
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store is marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create_message(
        &self,
        message: NewMessage,
    ) -> Result<PersistedMessage, RepositoryError> {
        self.ensure_available()?;
        let mut store = self.store.lock().await;

        store.last_id += 1;
        let id = MessageId::new(store.last_id);
        let persisted = PersistedMessage {
            id,
            room_id: message.room_id,
            sender_id: message.sender_id,
            sender_name: store.display_name(message.sender_id),
            content: message.content,
            thread_root_id: message.thread_root_id,
            created_at: message.received_at,
            updated_at: None,
        };

        if !message.attachments.is_empty() {
            let attachments = message
                .attachments
                .into_iter()
                .map(|file_name| Attachment {
                    message_id: id,
                    file_name,
                })
                .collect();
            store.attachments.insert(id, attachments);
        }
        store.messages.insert(id, persisted.clone());

        Ok(persisted)
    }

    async fn find_message(
        &self,
        message_id: MessageId,
    ) -> Result<Option<PersistedMessage>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.messages.get(&message_id).cloned())
    }

    async fn list_messages(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<PersistedMessage>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .messages
            .values()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn list_attachments(
        &self,
        message_id: MessageId,
    ) -> Result<Vec<Attachment>, RepositoryError> {
        self.ensure_available()?;
        let store = self.store.lock().await;
        Ok(store
            .attachments
            .get(&message_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_content(
        &self,
        message_id: MessageId,
        content: MessageContent,
        updated_at: Timestamp,
    ) -> Result<PersistedMessage, RepositoryError> {
        self.ensure_available()?;
        let mut store = self.store.lock().await;
        let message = store
            .messages
            .get_mut(&message_id)
            .ok_or(RepositoryError::MessageNotFound(message_id))?;
        message.content = content;
        message.updated_at = Some(updated_at);
        Ok(message.clone())
    }

    async fn delete_message(
        &self,
        message_id: MessageId,
    ) -> Result<PersistedMessage, RepositoryError> {
        self.ensure_available()?;
        let mut store = self.store.lock().await;
        let removed = store
            .messages
            .remove(&message_id)
            .ok_or(RepositoryError::MessageNotFound(message_id))?;
        store.attachments.remove(&message_id);
        store.receipts.retain(|(id, _), _| *id != message_id);
        store.mentions.retain(|(id, _)| *id != message_id);
        Ok(removed)
    }

    async fn mark_read(&self, receipt: ReadReceipt) -> Result<bool, RepositoryError> {
        self.ensure_available()?;
        let mut store = self.store.lock().await;
        if !store.messages.contains_key(&receipt.message_id) {
            return Err(RepositoryError::MessageNotFound(receipt.message_id));
        }

        let key = (receipt.message_id, receipt.user_id);
        if store.receipts.contains_key(&key) {
            return Ok(false);
        }
        store.receipts.insert(key, receipt);
        Ok(true)
    }

    async fn mark_room_read(
        &self,
        room_id: RoomId,
        user_id: UserId,
        read_at: Timestamp,
    ) -> Result<Vec<MessageId>, RepositoryError> {
        self.ensure_available()?;
        let mut store = self.store.lock().await;

        let unread: Vec<MessageId> = store
            .messages
            .values()
            .filter(|m| m.room_id == room_id && m.sender_id != user_id)
            .map(|m| m.id)
            .filter(|id| !store.receipts.contains_key(&(*id, user_id)))
            .collect();

        for message_id in &unread {
            store.receipts.insert(
                (*message_id, user_id),
                ReadReceipt {
                    message_id: *message_id,
                    user_id,
                    read_at,
                },
            );
        }

        Ok(unread)
    }

    async fn read_message_ids(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<Vec<MessageId>, RepositoryError> {
        let store = self.store.lock().await;
        let mut ids: Vec<MessageId> = store
            .receipts
            .keys()
            .filter(|(_, reader)| *reader == user_id)
            .map(|(id, _)| *id)
            .filter(|id| {
                store
                    .messages
                    .get(id)
                    .is_some_and(|m| m.room_id == room_id)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn read_by_others_ids(
        &self,
        room_id: RoomId,
        sender_id: UserId,
    ) -> Result<Vec<MessageId>, RepositoryError> {
        let store = self.store.lock().await;
        let mut ids: Vec<MessageId> = store
            .receipts
            .keys()
            .filter(|(_, reader)| *reader != sender_id)
            .map(|(id, _)| *id)
            .filter(|id| {
                store
                    .messages
                    .get(id)
                    .is_some_and(|m| m.room_id == room_id && m.sender_id == sender_id)
            })
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn count_unread(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<usize, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .messages
            .values()
            .filter(|m| m.room_id == room_id && m.sender_id != user_id)
            .filter(|m| !store.receipts.contains_key(&(m.id, user_id)))
            .count())
    }

    async fn record_mentions(
        &self,
        message_id: MessageId,
        usernames: &[String],
    ) -> Result<Vec<UserId>, RepositoryError> {
        self.ensure_available()?;
        let mut store = self.store.lock().await;
        if !store.messages.contains_key(&message_id) {
            return Err(RepositoryError::MessageNotFound(message_id));
        }

        let mut targets = Vec::new();
        for name in usernames {
            let Some(user_id) = store.user_by_name(name) else {
                continue;
            };
            if store.mentions.insert((message_id, user_id)) {
                targets.push(user_id);
            }
        }
        Ok(targets)
    }

    async fn list_mentions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PersistedMessage>, RepositoryError> {
        let store = self.store.lock().await;
        // mentions は message_id 順に並ぶので、結果も古い順になる
        Ok(store
            .mentions
            .iter()
            .filter(|(_, target)| *target == user_id)
            .filter_map(|(id, _)| store.messages.get(id).cloned())
            .collect())
    }
}
