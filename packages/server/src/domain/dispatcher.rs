//! Broadcast Dispatcher へのインターフェース

use async_trait::async_trait;

use super::{DispatchError, MessageId, PersistedMessage, ReadNotice, RoomId};

/// Dispatcher が配信するイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// 新規メッセージ（保存済み）
    Created(PersistedMessage),
    /// 本文の編集
    Updated(PersistedMessage),
    /// 削除
    Deleted {
        room_id: RoomId,
        message_id: MessageId,
    },
}

impl DispatchEvent {
    /// 配信先のルーム
    pub fn room_id(&self) -> RoomId {
        match self {
            Self::Created(message) | Self::Updated(message) => message.room_id,
            Self::Deleted { room_id, .. } => *room_id,
        }
    }
}

/// メッセージ配信キューへの投入口
///
/// 実装は単一のコンシューマが投入順に処理することを保証する（ルーム単位の FIFO）。
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// イベントを配信キューに投入する
    async fn submit(&self, event: DispatchEvent) -> Result<(), DispatchError>;
}

/// 既読通知の配信
///
/// Dispatcher のキューを経由せず、呼び出し元のタスクで直接ファンアウトする。
pub trait ReceiptNotifier: Send + Sync {
    /// ルームの全セッションに既読通知を送り、配信できたセッション数を返す
    fn notify_read(&self, notice: ReadNotice) -> usize;
}
