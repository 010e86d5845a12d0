//! UseCase 層
//!
//! ドメイン層の Port だけに依存し、具体的な実装は起動時に注入される。

pub mod connect_session;
pub mod disconnect_session;
pub mod edit_message;
pub mod error;
pub mod list_mentions;
pub mod list_messages;
pub mod mark_read;
pub mod send_message;
pub mod unread_count;

#[cfg(test)]
mod mock;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use edit_message::EditMessageUseCase;
pub use error::{ConnectError, EditMessageError, MarkReadError, SendMessageError};
pub use list_mentions::ListMentionsUseCase;
pub use list_messages::{ListMessagesUseCase, RoomMessage};
pub use mark_read::MarkReadUseCase;
pub use send_message::SendMessageUseCase;
pub use unread_count::UnreadCountUseCase;
