//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

/// Envelope kind, serialized as the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeType {
    Message,
    Read,
    Update,
    Delete,
}

/// Frame sent by a client over an open session.
///
/// Only `content`, `thread_root_id` and `attachments` are read. Identity and
/// routing fields a client may add (`sender_id`, `room_id`, `type`, timestamps)
/// are ignored; the server derives them from the session.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub content: String,
    #[serde(default)]
    pub thread_root_id: Option<u64>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// New message broadcast to every session of the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub r#type: EnvelopeType,
    pub id: u64,
    pub room_id: u64,
    pub sender_id: u64,
    pub sender_name: String,
    pub content: String,
    /// RFC 3339
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_root_id: Option<u64>,
    /// File references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

/// Read-receipt notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadEnvelope {
    pub r#type: EnvelopeType,
    pub message_id: u64,
    pub user_id: u64,
    pub room_id: u64,
}

/// Edited message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEnvelope {
    pub r#type: EnvelopeType,
    pub message_id: u64,
    pub room_id: u64,
    pub content: String,
    /// RFC 3339
    pub updated_at: String,
}

/// Deleted message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteEnvelope {
    pub r#type: EnvelopeType,
    pub message_id: u64,
    pub room_id: u64,
}
