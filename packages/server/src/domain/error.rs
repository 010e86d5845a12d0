//! ドメイン層のエラー型

use thiserror::Error;

use super::value_object::{MessageId, RoomId};

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// 数値 ID として解釈できない
    #[error("invalid {kind}: '{raw}'")]
    InvalidId { kind: &'static str, raw: String },

    /// 本文が長すぎる
    #[error("message content too long: {actual} chars (max {max})")]
    ContentTooLong { max: usize, actual: usize },
}

/// Persistence Port のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 指定したメッセージが存在しない
    #[error("message {0} not found")]
    MessageNotFound(MessageId),

    /// ストレージ側の障害
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Auth Port のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// 認証情報が送られていない
    #[error("credential is missing")]
    MissingToken,

    /// 署名・形式・クレームが不正
    #[error("credential is invalid: {0}")]
    InvalidToken(String),

    /// 有効期限切れ
    #[error("credential has expired")]
    Expired,

    /// トークンの発行に失敗
    #[error("failed to issue credential: {0}")]
    IssueFailed(String),
}

/// Dispatcher への投入エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Dispatcher のタスクが既に停止している
    #[error("dispatcher is closed; event for room {0} dropped")]
    Closed(RoomId),
}

/// セッションへのメッセージ送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// セッションの書き込みループが既に終了している
    #[error("session {0} is closed")]
    Closed(super::SessionId),

    /// セッションの送信キューが溢れている（遅いクライアント）
    #[error("outbound queue of session {0} is full")]
    Full(super::SessionId),
}
