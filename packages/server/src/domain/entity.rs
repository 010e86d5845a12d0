//! Entities
//!
//! メッセージ・添付ファイル・既読レコードなど、識別子を持つドメインモデル。

use serde::{Deserialize, Serialize};

use super::value_object::{MessageContent, MessageId, RoomId, Timestamp, UserId};

/// クライアントから受け取った投稿内容
///
/// 送信者とルームは含まない。これらは必ず認証済みのセッション（または REST の
/// Bearer トークン）から取得する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub content: MessageContent,
    pub thread_root_id: Option<MessageId>,
    pub attachments: Vec<String>,
}

impl InboundMessage {
    pub fn text(content: MessageContent) -> Self {
        Self {
            content,
            thread_root_id: None,
            attachments: Vec::new(),
        }
    }

    /// 本文が空で添付もないメッセージは配信する意味がない
    pub fn is_empty(&self) -> bool {
        self.content.is_blank() && self.attachments.is_empty()
    }
}

/// Persistence Port に渡す保存前のメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub thread_root_id: Option<MessageId>,
    pub attachments: Vec<String>,
    /// サーバーが受信した時刻
    pub received_at: Timestamp,
}

/// 保存済みのメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub content: MessageContent,
    pub thread_root_id: Option<MessageId>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// メッセージの添付ファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub message_id: MessageId,
    pub file_name: String,
}

/// 既読レコード
///
/// (message_id, user_id) の組につき高々 1 件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub read_at: Timestamp,
}

/// 既読通知の内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadNotice {
    pub room_id: RoomId,
    pub message_id: MessageId,
    pub user_id: UserId,
}
