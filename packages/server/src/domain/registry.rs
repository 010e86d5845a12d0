//! Connection Registry
//!
//! ルームごとに、現在開いているセッションの集合を管理するインターフェース。

use tokio::sync::mpsc;

use super::{MessagePushError, RoomId, SessionId, UserId};

/// セッションの書き込みループへ送るチャンネル
pub type PusherChannel = mpsc::Sender<String>;

/// 登録済みセッションへのハンドル
///
/// Registry が保持する sender がセッションへの唯一の長命な送信口。
/// Registry から取り除かれ、スナップショットも破棄されると送信キューが閉じ、
/// セッションの書き込みループが終了する。
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: SessionId,
    pub room_id: RoomId,
    pub user_id: UserId,
    channel: PusherChannel,
}

impl SessionHandle {
    pub fn new(room_id: RoomId, user_id: UserId, channel: PusherChannel) -> Self {
        Self {
            id: SessionId::generate(),
            room_id,
            user_id,
            channel,
        }
    }

    /// シリアライズ済みの envelope を送信キューに積む
    ///
    /// 待機はしない。キューが満杯のセッションは遅いクライアントとして扱う。
    pub fn push(&self, payload: &str) -> Result<(), MessagePushError> {
        self.channel
            .try_send(payload.to_owned())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Closed(_) => MessagePushError::Closed(self.id),
                mpsc::error::TrySendError::Full(_) => MessagePushError::Full(self.id),
            })
    }
}

/// Connection Registry trait
///
/// 全ての操作は実装側で直列化される。ロック区間で await はしないため同期 API とする
/// （`Drop` からの登録解除を可能にするため）。
pub trait ConnectionRegistry: Send + Sync {
    /// セッションをルームに登録する
    ///
    /// 同じセッション ID が既に登録されている場合は何もせず `false` を返す。
    fn register(&self, session: SessionHandle) -> bool;

    /// セッションをルームから取り除く
    ///
    /// 取り除いた場合は `true`。未登録（二重切断など）の場合は `false` で、エラーではない。
    fn unregister(&self, room_id: RoomId, session_id: SessionId) -> bool;

    /// ルームに登録されているセッションのコピーを返す
    fn snapshot(&self, room_id: RoomId) -> Vec<SessionHandle>;

    /// ルームに登録されているセッション数
    fn session_count(&self, room_id: RoomId) -> usize;

    /// セッションが 1 つ以上あるルームの一覧（昇順）
    fn rooms(&self) -> Vec<RoomId>;
}
