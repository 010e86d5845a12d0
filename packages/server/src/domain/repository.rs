//! Repository trait 定義（Persistence Port）
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    Attachment, MessageContent, MessageId, NewMessage, PersistedMessage, ReadReceipt,
    RepositoryError, RoomId, Timestamp, UserId,
};

/// Message Repository trait
///
/// メッセージ・添付ファイル・既読レコードの永続化を担う。
/// UseCase 層と Dispatcher はこの trait に依存し、具体的なストレージには依存しない。
///
/// ## 採番
///
/// `create_message` は単調増加する `MessageId` と作成時刻を割り当てる。
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージ（と添付ファイル）を保存し、採番済みのメッセージを返す
    async fn create_message(&self, message: NewMessage)
    -> Result<PersistedMessage, RepositoryError>;

    /// ID でメッセージを取得
    async fn find_message(
        &self,
        message_id: MessageId,
    ) -> Result<Option<PersistedMessage>, RepositoryError>;

    /// ルームのメッセージを古い順に取得
    async fn list_messages(&self, room_id: RoomId)
    -> Result<Vec<PersistedMessage>, RepositoryError>;

    /// メッセージの添付ファイルを取得
    async fn list_attachments(
        &self,
        message_id: MessageId,
    ) -> Result<Vec<Attachment>, RepositoryError>;

    /// 本文を更新
    async fn update_content(
        &self,
        message_id: MessageId,
        content: MessageContent,
        updated_at: Timestamp,
    ) -> Result<PersistedMessage, RepositoryError>;

    /// メッセージを削除し、削除前の内容を返す（添付・既読・メンションも削除される）
    async fn delete_message(&self, message_id: MessageId)
    -> Result<PersistedMessage, RepositoryError>;

    /// 既読を記録
    ///
    /// 新規に書き込んだ場合は `true`、既に既読だった場合は `false`（冪等）。
    async fn mark_read(&self, receipt: ReadReceipt) -> Result<bool, RepositoryError>;

    /// ルーム内の「自分以外が送信した未読メッセージ」を一括で既読にする
    ///
    /// 新規に既読になったメッセージ ID を昇順で返す。
    async fn mark_room_read(
        &self,
        room_id: RoomId,
        user_id: UserId,
        read_at: Timestamp,
    ) -> Result<Vec<MessageId>, RepositoryError>;

    /// ルーム内でユーザーが既読にしたメッセージ ID を取得
    async fn read_message_ids(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<Vec<MessageId>, RepositoryError>;

    /// ルーム内の `sender_id` の投稿のうち、本人以外の誰かが既読にしたものの ID
    async fn read_by_others_ids(
        &self,
        room_id: RoomId,
        sender_id: UserId,
    ) -> Result<Vec<MessageId>, RepositoryError>;

    /// ルーム内の未読件数（自分の投稿は数えない）
    async fn count_unread(&self, room_id: RoomId, user_id: UserId)
    -> Result<usize, RepositoryError>;

    /// メンションを記録する
    ///
    /// 表示名が一致するユーザーだけが対象になり、該当しない名前は無視される。
    /// 記録した宛先のユーザー ID を返す。
    async fn record_mentions(
        &self,
        message_id: MessageId,
        usernames: &[String],
    ) -> Result<Vec<UserId>, RepositoryError>;

    /// ユーザー宛てのメンションを含むメッセージを古い順に取得
    async fn list_mentions(&self, user_id: UserId)
    -> Result<Vec<PersistedMessage>, RepositoryError>;
}
