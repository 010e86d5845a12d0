//! Server state.

use std::sync::Arc;

use crate::{
    domain::{Authenticator, ConnectionRegistry},
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, EditMessageUseCase, ListMentionsUseCase,
        ListMessagesUseCase, MarkReadUseCase, SendMessageUseCase, UnreadCountUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// Auth Port（REST の Bearer トークン検証）
    pub authenticator: Arc<dyn Authenticator>,
    /// Connection Registry（デバッグ用エンドポイントから参照）
    pub registry: Arc<dyn ConnectionRegistry>,
    /// ConnectSessionUseCase（ハンドシェイクとセッション登録）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（セッションの登録解除）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// SendMessageUseCase（Ingestion Pipeline）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// MarkReadUseCase（既読と既読通知）
    pub mark_read_usecase: Arc<MarkReadUseCase>,
    /// EditMessageUseCase（編集・削除の再配信）
    pub edit_message_usecase: Arc<EditMessageUseCase>,
    /// ListMessagesUseCase（メッセージ一覧）
    pub list_messages_usecase: Arc<ListMessagesUseCase>,
    /// UnreadCountUseCase（未読件数）
    pub unread_count_usecase: Arc<UnreadCountUseCase>,
    /// ListMentionsUseCase（自分宛てのメンション）
    pub list_mentions_usecase: Arc<ListMentionsUseCase>,
}
