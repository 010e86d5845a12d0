//! Conversion logic between DTOs and domain entities.

use crate::domain::{
    Attachment, InboundMessage, MessageContent, MessageId, PersistedMessage, ReadNotice, RoomId,
    ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as ws};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<ws::InboundFrame> for InboundMessage {
    type Error = ValueObjectError;

    fn try_from(frame: ws::InboundFrame) -> Result<Self, Self::Error> {
        Ok(Self {
            content: MessageContent::new(frame.content)?,
            thread_root_id: frame.thread_root_id.map(MessageId::new),
            attachments: frame.attachments,
        })
    }
}

impl TryFrom<http::SendMessageRequest> for InboundMessage {
    type Error = ValueObjectError;

    fn try_from(request: http::SendMessageRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            content: MessageContent::new(request.content)?,
            thread_root_id: request.thread_root_id.map(MessageId::new),
            attachments: request.attachments,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

fn file_names(attachments: &[Attachment]) -> Vec<String> {
    attachments.iter().map(|a| a.file_name.clone()).collect()
}

impl ws::MessageEnvelope {
    pub fn new(message: &PersistedMessage, attachments: &[Attachment]) -> Self {
        Self {
            r#type: ws::EnvelopeType::Message,
            id: message.id.value(),
            room_id: message.room_id.value(),
            sender_id: message.sender_id.value(),
            sender_name: message.sender_name.clone(),
            content: message.content.as_str().to_string(),
            created_at: message.created_at.to_rfc3339(),
            thread_root_id: message.thread_root_id.map(|id| id.value()),
            attachments: file_names(attachments),
        }
    }
}

impl From<&PersistedMessage> for ws::UpdateEnvelope {
    fn from(message: &PersistedMessage) -> Self {
        Self {
            r#type: ws::EnvelopeType::Update,
            message_id: message.id.value(),
            room_id: message.room_id.value(),
            content: message.content.as_str().to_string(),
            updated_at: message
                .updated_at
                .unwrap_or(message.created_at)
                .to_rfc3339(),
        }
    }
}

impl ws::DeleteEnvelope {
    pub fn new(room_id: RoomId, message_id: MessageId) -> Self {
        Self {
            r#type: ws::EnvelopeType::Delete,
            message_id: message_id.value(),
            room_id: room_id.value(),
        }
    }
}

impl From<ReadNotice> for ws::ReadEnvelope {
    fn from(notice: ReadNotice) -> Self {
        Self {
            r#type: ws::EnvelopeType::Read,
            message_id: notice.message_id.value(),
            user_id: notice.user_id.value(),
            room_id: notice.room_id.value(),
        }
    }
}

impl http::MessageDto {
    pub fn new(message: PersistedMessage, attachments: &[Attachment]) -> Self {
        Self {
            id: message.id.value(),
            room_id: message.room_id.value(),
            sender_id: message.sender_id.value(),
            sender_name: message.sender_name,
            content: message.content.into_string(),
            thread_root_id: message.thread_root_id.map(|id| id.value()),
            created_at: message.created_at.to_rfc3339(),
            updated_at: message.updated_at.map(|t| t.to_rfc3339()),
            attachments: file_names(attachments),
        }
    }
}

impl From<PersistedMessage> for http::MentionDto {
    fn from(message: PersistedMessage) -> Self {
        Self {
            message_id: message.id.value(),
            room_id: message.room_id.value(),
            sender_id: message.sender_id.value(),
            sender_name: message.sender_name,
            content: message.content.into_string(),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, UserId};

    fn persisted() -> PersistedMessage {
        PersistedMessage {
            id: MessageId::new(7),
            room_id: RoomId::new(42),
            sender_id: UserId::new(1),
            sender_name: "alice".to_string(),
            content: MessageContent::new("hi".to_string()).unwrap(),
            thread_root_id: None,
            created_at: Timestamp::new(1672531200000),
            updated_at: None,
        }
    }

    #[test]
    fn test_inbound_frame_ignores_client_identity_fields() {
        // テスト項目: クライアントが送った sender_id / room_id / type は読み捨てられる
        // given (前提条件):
        let raw = r#"{"type":"delete","sender_id":999,"room_id":1,"content":"hi","thread_root_id":3}"#;
        let frame: ws::InboundFrame = serde_json::from_str(raw).unwrap();

        // when (操作):
        let message = InboundMessage::try_from(frame).unwrap();

        // then (期待する結果):
        assert_eq!(message.content.as_str(), "hi");
        assert_eq!(message.thread_root_id, Some(MessageId::new(3)));
        assert!(message.attachments.is_empty());
    }

    #[test]
    fn test_inbound_frame_without_content_fails_to_decode() {
        // テスト項目: content を持たないフレームはデコードに失敗する
        // given (前提条件):
        let raw = r#"{"thread_root_id":3}"#;

        // when (操作):
        let result = serde_json::from_str::<ws::InboundFrame>(raw);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_message_envelope_shape() {
        // テスト項目: message envelope が決められた形でシリアライズされる
        // given (前提条件):
        let message = persisted();
        let attachments = vec![Attachment {
            message_id: message.id,
            file_name: "cat.png".to_string(),
        }];

        // when (操作):
        let envelope = ws::MessageEnvelope::new(&message, &attachments);
        let json: serde_json::Value = serde_json::to_value(&envelope).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({
                "type": "message",
                "id": 7,
                "room_id": 42,
                "sender_id": 1,
                "sender_name": "alice",
                "content": "hi",
                "created_at": "2023-01-01T00:00:00.000Z",
                "attachments": ["cat.png"],
            })
        );
    }

    #[test]
    fn test_read_envelope_shape() {
        // テスト項目: read envelope は content を持たず message_id / user_id を持つ
        // given (前提条件):
        let notice = ReadNotice {
            room_id: RoomId::new(42),
            message_id: MessageId::new(7),
            user_id: UserId::new(2),
        };

        // when (操作):
        let json = serde_json::to_value(ws::ReadEnvelope::from(notice)).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({"type": "read", "message_id": 7, "user_id": 2, "room_id": 42})
        );
    }

    #[test]
    fn test_update_and_delete_envelope_shape() {
        // テスト項目: update / delete envelope の形
        // given (前提条件):
        let mut message = persisted();
        message.content = MessageContent::new("edited".to_string()).unwrap();
        message.updated_at = Some(Timestamp::new(1672531201000));

        // when (操作):
        let update = serde_json::to_value(ws::UpdateEnvelope::from(&message)).unwrap();
        let delete =
            serde_json::to_value(ws::DeleteEnvelope::new(message.room_id, message.id)).unwrap();

        // then (期待する結果):
        assert_eq!(
            update,
            serde_json::json!({
                "type": "update",
                "message_id": 7,
                "room_id": 42,
                "content": "edited",
                "updated_at": "2023-01-01T00:00:01.000Z",
            })
        );
        assert_eq!(
            delete,
            serde_json::json!({"type": "delete", "message_id": 7, "room_id": 42})
        );
    }
}
