//! ルーム単位のファンアウト
//!
//! Dispatcher と既読通知の両方が使う配信処理。
//!
//! ## 失敗の扱い
//!
//! 送信に失敗したセッション（書き込みループ終了済み・送信キュー満杯）は
//! その場で Registry から取り除く。sender が破棄されるとセッション側の
//! 送信キューが閉じ、接続も閉じられる。残りのセッションへの配信は続行する。

use crate::domain::{ConnectionRegistry, MessagePushError, RoomId, SessionId};

/// 1 回のファンアウトの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// 送信キューに積めたセッション数
    pub delivered: usize,
    /// 失敗して Registry から取り除いたセッション
    pub dropped: Vec<SessionId>,
}

/// ルームの全セッションに同じ payload を送る
pub fn deliver_to_room(
    registry: &dyn ConnectionRegistry,
    room_id: RoomId,
    payload: &str,
) -> FanoutReport {
    let mut report = FanoutReport::default();

    for session in registry.snapshot(room_id) {
        match session.push(payload) {
            Ok(()) => {
                report.delivered += 1;
                tracing::debug!("Delivered to session {} in room {}", session.id, room_id);
            }
            Err(e) => {
                match e {
                    MessagePushError::Full(_) => tracing::warn!(
                        "Session {} (user {}) is too slow, disconnecting: {}",
                        session.id,
                        session.user_id,
                        e
                    ),
                    MessagePushError::Closed(_) => tracing::warn!(
                        "Session {} (user {}) failed write, disconnecting: {}",
                        session.id,
                        session.user_id,
                        e
                    ),
                }
                registry.unregister(room_id, session.id);
                report.dropped.push(session.id);
            }
        }
    }

    report
}
