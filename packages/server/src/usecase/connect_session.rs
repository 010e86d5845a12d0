//! UseCase: セッション接続（ハンドシェイク）処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::authorize() / execute()
//! - 資格情報とルーム ID の検証順序、Registry への登録
//!
//! ### なぜこのテストが必要か
//! - 認証に失敗した接続は、どのルームの状態にも触れてはならない
//! - 資格情報の検証は room_id の検証より先に行う（401 が 400 より優先）
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークンと room_id
//! - 異常系：トークンなし・不正、room_id なし・不正

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{
    AuthError, Authenticator, ConnectionRegistry, RoomId, SessionHandle, UserId,
};

use super::error::ConnectError;

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    /// Auth Port
    authenticator: Arc<dyn Authenticator>,
    registry: Arc<dyn ConnectionRegistry>,
    /// セッションごとの送信キューの長さ
    outbound_buffer: usize,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        registry: Arc<dyn ConnectionRegistry>,
        outbound_buffer: usize,
    ) -> Self {
        Self {
            authenticator,
            registry,
            outbound_buffer: outbound_buffer.max(1),
        }
    }

    /// ハンドシェイクのパラメータを検証する
    ///
    /// # Arguments
    ///
    /// * `token` - クエリパラメータの資格情報
    /// * `room_id` - クエリパラメータのルーム ID（未解釈の文字列）
    ///
    /// # Returns
    ///
    /// * `Ok((UserId, RoomId))` - 接続してよいユーザーとルーム
    /// * `Err(ConnectError)` - 資格情報が不正（401）または room_id が不正（400）
    pub fn authorize(
        &self,
        token: Option<&str>,
        room_id: Option<&str>,
    ) -> Result<(UserId, RoomId), ConnectError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let user_id = self.authenticator.verify(token)?;

        let room_id = room_id
            .and_then(|raw| raw.parse::<RoomId>().ok())
            .ok_or_else(|| ConnectError::InvalidRoomId(room_id.map(str::to_string)))?;

        Ok((user_id, room_id))
    }

    /// セッションを作成して Registry に登録する
    ///
    /// 返した receiver はセッションの書き込みループが所有する。
    pub fn execute(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> (SessionHandle, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(self.outbound_buffer);
        let session = SessionHandle::new(room_id, user_id, sender);

        if self.registry.register(session.clone()) {
            tracing::info!(
                "Session {} (user {}) joined room {} ({} session(s))",
                session.id,
                user_id,
                room_id,
                self.registry.session_count(room_id)
            );
        } else {
            tracing::warn!("Session {} was already registered", session.id);
        }

        (session, receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MockAuthenticator, infrastructure::registry::InMemoryConnectionRegistry,
    };

    fn create_usecase(
        authenticator: MockAuthenticator,
    ) -> (ConnectSessionUseCase, Arc<InMemoryConnectionRegistry>) {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = ConnectSessionUseCase::new(Arc::new(authenticator), registry.clone(), 8);
        (usecase, registry)
    }

    #[test]
    fn test_authorize_success() {
        // テスト項目: 有効なトークンと room_id でユーザーとルームが得られる
        // given (前提条件):
        let mut authenticator = MockAuthenticator::new();
        authenticator
            .expect_verify()
            .times(1)
            .returning(|token| match token {
                "good" => Ok(UserId::new(2)),
                other => Err(AuthError::InvalidToken(other.to_string())),
            });
        let (usecase, _registry) = create_usecase(authenticator);

        // when (操作):
        let result = usecase.authorize(Some("good"), Some("42"));

        // then (期待する結果):
        assert_eq!(result, Ok((UserId::new(2), RoomId::new(42))));
    }

    #[test]
    fn test_authorize_missing_token_is_checked_first() {
        // テスト項目: トークンがなければ room_id が不正でも Unauthorized
        // given (前提条件):
        let mut authenticator = MockAuthenticator::new();
        authenticator.expect_verify().never();
        let (usecase, _registry) = create_usecase(authenticator);

        // when (操作):
        let result = usecase.authorize(None, Some("abc"));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConnectError::Unauthorized(AuthError::MissingToken))
        );
    }

    #[test]
    fn test_authorize_invalid_token() {
        // テスト項目: 検証に失敗したトークンは Unauthorized
        // given (前提条件):
        let mut authenticator = MockAuthenticator::new();
        authenticator
            .expect_verify()
            .returning(|_| Err(AuthError::Expired));
        let (usecase, _registry) = create_usecase(authenticator);

        // when (操作):
        let result = usecase.authorize(Some("old"), Some("42"));

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::Unauthorized(AuthError::Expired)));
    }

    #[test]
    fn test_authorize_invalid_room_id() {
        // テスト項目: room_id がない・数値でない場合は InvalidRoomId
        // given (前提条件):
        let mut authenticator = MockAuthenticator::new();
        authenticator
            .expect_verify()
            .returning(|_| Ok(UserId::new(2)));
        let (usecase, _registry) = create_usecase(authenticator);

        // when (操作):
        let missing = usecase.authorize(Some("good"), None);
        let malformed = usecase.authorize(Some("good"), Some("lobby"));

        // then (期待する結果):
        assert_eq!(missing, Err(ConnectError::InvalidRoomId(None)));
        assert_eq!(
            malformed,
            Err(ConnectError::InvalidRoomId(Some("lobby".to_string())))
        );
    }

    #[tokio::test]
    async fn test_execute_registers_session() {
        // テスト項目: 登録したセッションに Registry 経由で送信できる
        // given (前提条件):
        let (usecase, registry) = create_usecase(MockAuthenticator::new());

        // when (操作):
        let (session, mut receiver) = usecase.execute(RoomId::new(42), UserId::new(2));

        // then (期待する結果):
        let snapshot = registry.snapshot(RoomId::new(42));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, session.id);
        assert_eq!(snapshot[0].user_id, UserId::new(2));
        snapshot[0].push("hello").unwrap();
        assert_eq!(receiver.recv().await.as_deref(), Some("hello"));
    }
}
