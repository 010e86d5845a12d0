//! ドメイン層
//!
//! - `value_object`: ID・本文・時刻
//! - `entity`: メッセージ・添付・既読
//! - Port（trait）: `MessageRepository`, `Authenticator`, `ConnectionRegistry`,
//!   `MessageDispatcher`, `ReceiptNotifier`

pub mod auth;
pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use auth::Authenticator;
pub use dispatcher::{DispatchEvent, MessageDispatcher, ReceiptNotifier};
pub use entity::{
    Attachment, InboundMessage, NewMessage, PersistedMessage, ReadNotice, ReadReceipt,
};
pub use error::{AuthError, DispatchError, MessagePushError, RepositoryError, ValueObjectError};
pub use registry::{ConnectionRegistry, PusherChannel, SessionHandle};
pub use repository::MessageRepository;
pub use value_object::{MessageContent, MessageId, RoomId, SessionId, Timestamp, UserId};

#[cfg(test)]
pub use auth::MockAuthenticator;
