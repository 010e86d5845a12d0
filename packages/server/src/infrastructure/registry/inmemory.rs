//! インメモリ Connection Registry
//!
//! ## 責務
//!
//! - ルーム ID → セッションハンドル一覧 の管理
//! - 登録・登録解除・スナップショット取得の直列化
//!
//! ## 設計ノート
//!
//! セッションの生成（WebSocket の受付と送信チャンネルの作成）は UI 層で行われます。
//! この実装は生成された `SessionHandle` を受け取り、配信先の解決にだけ使います。
//! スナップショットはコピーを返すため、配信中に登録・解除が起きても安全です。

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::domain::{ConnectionRegistry, RoomId, SessionHandle, SessionId};

/// インメモリ Connection Registry 実装
#[derive(Debug, Default)]
pub struct InMemoryConnectionRegistry {
    /// Key: room_id
    /// Value: 登録順のセッション一覧
    rooms: Mutex<HashMap<RoomId, Vec<SessionHandle>>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RoomId, Vec<SessionHandle>>> {
        // ロック区間でパニックしうる処理は行わないが、万一 poison されても登録情報は有効
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConnectionRegistry for InMemoryConnectionRegistry {
    fn register(&self, session: SessionHandle) -> bool {
        let mut rooms = self.lock();
        let sessions = rooms.entry(session.room_id).or_default();

        if sessions.iter().any(|s| s.id == session.id) {
            tracing::warn!(
                "Session {} is already registered in room {}",
                session.id,
                session.room_id
            );
            return false;
        }

        tracing::debug!(
            "Session {} (user {}) registered to room {}",
            session.id,
            session.user_id,
            session.room_id
        );
        sessions.push(session);
        true
    }

    fn unregister(&self, room_id: RoomId, session_id: SessionId) -> bool {
        let mut rooms = self.lock();
        let Some(sessions) = rooms.get_mut(&room_id) else {
            return false;
        };

        let before = sessions.len();
        sessions.retain(|s| s.id != session_id);
        let removed = sessions.len() != before;

        if sessions.is_empty() {
            rooms.remove(&room_id);
        }
        if removed {
            tracing::debug!("Session {} unregistered from room {}", session_id, room_id);
        }
        removed
    }

    fn snapshot(&self, room_id: RoomId) -> Vec<SessionHandle> {
        self.lock().get(&room_id).cloned().unwrap_or_default()
    }

    fn session_count(&self, room_id: RoomId) -> usize {
        self.lock().get(&room_id).map_or(0, Vec::len)
    }

    fn rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self.lock().keys().copied().collect();
        rooms.sort();
        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - register / unregister / snapshot の基本動作
    // - 重複登録の拒否、二重解除の冪等性
    // - ルーム間の分離
    //
    // 【なぜこのテストが必要か】
    // - Registry は複数タスクから同時に触られる唯一の共有構造
    // - 解除済みセッションへの配信や、別ルームへの配信を防ぐ必要がある
    // ========================================

    fn session(room: u64, user: u64) -> (SessionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        (
            SessionHandle::new(RoomId::new(room), UserId::new(user), tx),
            rx,
        )
    }

    #[test]
    fn test_register_and_snapshot() {
        // テスト項目: 登録したセッションがスナップショットに含まれる
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (alice, _rx1) = session(42, 1);
        let (bob, _rx2) = session(42, 2);

        // when (操作):
        assert!(registry.register(alice.clone()));
        assert!(registry.register(bob.clone()));
        let snapshot = registry.snapshot(RoomId::new(42));

        // then (期待する結果): 登録順で返る
        let ids: Vec<SessionId> = snapshot.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![alice.id, bob.id]);
        assert_eq!(registry.session_count(RoomId::new(42)), 2);
    }

    #[test]
    fn test_register_same_session_twice_is_refused() {
        // テスト項目: 同じセッションを二重に登録しても重複しない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (alice, _rx) = session(42, 1);
        registry.register(alice.clone());

        // when (操作):
        let result = registry.register(alice);

        // then (期待する結果):
        assert!(!result);
        assert_eq!(registry.session_count(RoomId::new(42)), 1);
    }

    #[test]
    fn test_same_user_may_hold_multiple_sessions() {
        // テスト項目: 同じユーザーの別タブ（別セッション）は別々に登録される
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tab1, _rx1) = session(42, 1);
        let (tab2, _rx2) = session(42, 1);

        // when (操作):
        registry.register(tab1);
        registry.register(tab2);

        // then (期待する結果):
        assert_eq!(registry.session_count(RoomId::new(42)), 2);
    }

    #[test]
    fn test_unregister_removes_session_and_prunes_room() {
        // テスト項目: 解除したセッションはスナップショットから消え、空ルームも消える
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (alice, _rx) = session(42, 1);
        registry.register(alice.clone());

        // when (操作):
        let removed = registry.unregister(RoomId::new(42), alice.id);

        // then (期待する結果):
        assert!(removed);
        assert!(registry.snapshot(RoomId::new(42)).is_empty());
        assert!(registry.rooms().is_empty());
    }

    #[test]
    fn test_unregister_twice_is_noop() {
        // テスト項目: 二重切断・未登録セッションの解除はエラーにならない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (alice, _rx1) = session(42, 1);
        let (never_registered, _rx2) = session(42, 2);
        registry.register(alice.clone());

        // when (操作):
        let first = registry.unregister(RoomId::new(42), alice.id);
        let second = registry.unregister(RoomId::new(42), alice.id);
        let unknown = registry.unregister(RoomId::new(42), never_registered.id);
        let unknown_room = registry.unregister(RoomId::new(7), alice.id);

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert!(!unknown);
        assert!(!unknown_room);
    }

    #[test]
    fn test_rooms_are_isolated() {
        // テスト項目: 別ルームのセッションはスナップショットに含まれない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (in_42, _rx1) = session(42, 1);
        let (in_7, _rx2) = session(7, 2);
        registry.register(in_42.clone());
        registry.register(in_7.clone());

        // when (操作):
        let snapshot = registry.snapshot(RoomId::new(42));

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, in_42.id);
        assert_eq!(registry.rooms(), vec![RoomId::new(7), RoomId::new(42)]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        // テスト項目: スナップショット取得後の解除はスナップショットに影響しない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (alice, _rx) = session(42, 1);
        registry.register(alice.clone());
        let snapshot = registry.snapshot(RoomId::new(42));

        // when (操作):
        registry.unregister(RoomId::new(42), alice.id);

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.session_count(RoomId::new(42)), 0);
    }

    #[tokio::test]
    async fn test_concurrent_register_and_unregister() {
        // テスト項目: 多数のタスクから同時に登録・解除しても整合性が保たれる
        // given (前提条件):
        let registry = std::sync::Arc::new(InMemoryConnectionRegistry::new());
        let mut handles = Vec::new();

        // when (操作): 100 セッションを登録し、偶数番だけ解除する
        for i in 0..100u64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (tx, rx) = mpsc::channel(1);
                let handle = SessionHandle::new(RoomId::new(1), UserId::new(i), tx);
                let id = handle.id;
                registry.register(handle);
                if i % 2 == 0 {
                    registry.unregister(RoomId::new(1), id);
                }
                rx
            }));
        }
        let mut receivers = Vec::new();
        for handle in handles {
            receivers.push(handle.await.unwrap());
        }

        // then (期待する結果):
        assert_eq!(registry.session_count(RoomId::new(1)), 50);
        assert!(
            registry
                .snapshot(RoomId::new(1))
                .iter()
                .all(|s| s.user_id.value() % 2 == 1)
        );
    }
}
