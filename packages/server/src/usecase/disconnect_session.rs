//! UseCase: セッション切断処理
//!
//! セッションの終了経路（正常終了・デコード失敗・書き込み失敗・パニック）に
//! 関係なく、最後に 1 回呼ばれる。二重に呼ばれても何もしない。

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, RoomId, SessionId};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectSessionUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// セッションを Registry から取り除く
    ///
    /// 取り除いた場合は `true`。既に取り除かれていた場合（配信失敗で切り離された
    /// セッションなど）は `false`。
    pub fn execute(&self, room_id: RoomId, session_id: SessionId) -> bool {
        let removed = self.registry.unregister(room_id, session_id);
        if removed {
            tracing::info!(
                "Session {} left room {} ({} session(s) remaining)",
                session_id,
                room_id,
                self.registry.session_count(room_id)
            );
        } else {
            tracing::debug!(
                "Session {} was already removed from room {}",
                session_id,
                room_id
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{SessionHandle, UserId},
        infrastructure::registry::InMemoryConnectionRegistry,
    };
    use tokio::sync::mpsc;

    #[test]
    fn test_disconnect_twice_is_noop() {
        // テスト項目: 2 回目の切断は false を返すだけで、他のセッションに影響しない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (tx1, _rx1) = mpsc::channel(1);
        let (tx2, _rx2) = mpsc::channel(1);
        let leaving = SessionHandle::new(RoomId::new(42), UserId::new(1), tx1);
        let staying = SessionHandle::new(RoomId::new(42), UserId::new(2), tx2);
        registry.register(leaving.clone());
        registry.register(staying.clone());
        let usecase = DisconnectSessionUseCase::new(registry.clone());

        // when (操作):
        let first = usecase.execute(RoomId::new(42), leaving.id);
        let second = usecase.execute(RoomId::new(42), leaving.id);

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        let remaining: Vec<_> = registry
            .snapshot(RoomId::new(42))
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(remaining, vec![staying.id]);
    }
}
