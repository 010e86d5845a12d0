//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{
    AuthError, DispatchError, MessageId, RepositoryError, RoomId, ValueObjectError,
};

/// セッション接続（ハンドシェイク）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// 資格情報がない・不正・期限切れ
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// room_id がない、または数値として解釈できない
    #[error("invalid room_id: {0:?}")]
    InvalidRoomId(Option<String>),
}

/// メッセージ送信（Ingestion Pipeline）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// 本文が不正（長すぎる、または本文も添付もない）
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// スレッドの親メッセージが存在しない
    #[error("thread root message {0} does not exist")]
    InvalidThreadRoot(MessageId),

    /// スレッドの親メッセージが別のルームにある
    #[error("thread root message {thread_root_id} belongs to room {actual}, not {expected}")]
    ThreadRootInOtherRoom {
        thread_root_id: MessageId,
        expected: RoomId,
        actual: RoomId,
    },

    /// 保存に失敗（配信されない）
    #[error("failed to persist message: {0}")]
    PersistFailed(RepositoryError),

    /// 保存済みだが配信キューへの投入に失敗
    #[error("message {message_id} persisted but not dispatched: {source}")]
    DispatchFailed {
        message_id: MessageId,
        source: DispatchError,
    },
}

impl From<ValueObjectError> for SendMessageError {
    fn from(e: ValueObjectError) -> Self {
        Self::InvalidContent(e.to_string())
    }
}

/// 既読処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkReadError {
    #[error("message {0} not found")]
    MessageNotFound(MessageId),

    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for MarkReadError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::MessageNotFound(id) => Self::MessageNotFound(id),
            other => Self::Repository(other),
        }
    }
}

/// 編集・削除のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditMessageError {
    #[error("message {0} not found")]
    MessageNotFound(MessageId),

    /// 送信者本人以外による操作
    #[error("message {0} can only be changed by its sender")]
    Forbidden(MessageId),

    #[error("invalid content: {0}")]
    InvalidContent(String),

    #[error("repository error: {0}")]
    Repository(RepositoryError),

    /// 変更は保存済みだが配信キューへの投入に失敗
    #[error("change persisted but not dispatched: {0}")]
    DispatchFailed(DispatchError),
}

impl From<RepositoryError> for EditMessageError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::MessageNotFound(id) => Self::MessageNotFound(id),
            other => Self::Repository(other),
        }
    }
}

impl From<ValueObjectError> for EditMessageError {
    fn from(e: ValueObjectError) -> Self {
        Self::InvalidContent(e.to_string())
    }
}
