//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

/// `POST /api/rooms/{room_id}/messages`
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub thread_root_id: Option<u64>,
    /// File references of already uploaded files
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// `PATCH /api/messages/{message_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

/// Message as returned by the REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: u64,
    pub room_id: u64,
    pub sender_id: u64,
    pub sender_name: String,
    pub content: String,
    pub thread_root_id: Option<u64>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub attachments: Vec<String>,
}

/// Message with the caller's read flag (`GET /api/rooms/{room_id}/messages`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageWithReadDto {
    #[serde(flatten)]
    pub message: MessageDto,
    pub is_read: bool,
    /// Only meaningful for the caller's own messages
    pub is_read_by_others: bool,
}

/// `GET /api/rooms/{room_id}/unread_count`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread_count: usize,
}

/// One entry of `GET /api/mentions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionDto {
    pub message_id: u64,
    pub room_id: u64,
    pub sender_id: u64,
    pub sender_name: String,
    pub content: String,
    pub created_at: String,
}

/// `POST /api/messages/{message_id}/read`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub status: String,
    pub newly_read: bool,
}

/// `POST /api/rooms/{room_id}/read_all`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub status: String,
    pub read_count: usize,
}

/// Error body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /debug/rooms/{room_id}/sessions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSessionsDto {
    pub room_id: u64,
    pub sessions: Vec<SessionDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDto {
    pub session_id: String,
    pub user_id: u64,
}
