//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{Attachment, InboundMessage, MessageId, RoomId},
    infrastructure::dto::http::{
        EditMessageRequest, ErrorResponse, MarkAllReadResponse, MarkReadResponse, MentionDto,
        MessageDto, MessageWithReadDto, RoomSessionsDto, SendMessageRequest, SessionDto,
        UnreadCountResponse,
    },
    ui::{auth::AuthenticatedUser, state::AppState},
    usecase::{EditMessageError, MarkReadError, SendMessageError},
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

impl From<SendMessageError> for ApiError {
    fn from(e: SendMessageError) -> Self {
        let status = match e {
            SendMessageError::InvalidContent(_)
            | SendMessageError::InvalidThreadRoot(_)
            | SendMessageError::ThreadRootInOtherRoom { .. } => StatusCode::BAD_REQUEST,
            SendMessageError::PersistFailed(_) | SendMessageError::DispatchFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        api_error(status, e)
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint listing the sessions registered in a room (for testing purposes)
pub async fn debug_room_sessions(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
) -> Json<RoomSessionsDto> {
    let sessions = state
        .registry
        .snapshot(room_id)
        .into_iter()
        .map(|s| SessionDto {
            session_id: s.id.to_string(),
            user_id: s.user_id.value(),
        })
        .collect();

    Json(RoomSessionsDto {
        room_id: room_id.value(),
        sessions,
    })
}

/// `POST /api/rooms/{room_id}/messages`
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(room_id): Path<RoomId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<MessageDto>, ApiError> {
    let file_names = request.attachments.clone();
    let message = InboundMessage::try_from(request)
        .map_err(|e| ApiError::from(SendMessageError::from(e)))?;

    let persisted = state
        .send_message_usecase
        .execute(room_id, user_id, message)
        .await?;

    let attachments: Vec<Attachment> = file_names
        .into_iter()
        .map(|file_name| Attachment {
            message_id: persisted.id,
            file_name,
        })
        .collect();
    Ok(Json(MessageDto::new(persisted, &attachments)))
}

/// `GET /api/rooms/{room_id}/messages`
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(room_id): Path<RoomId>,
) -> Result<Json<Vec<MessageWithReadDto>>, ApiError> {
    let messages = state
        .list_messages_usecase
        .execute(room_id, user_id)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    // Domain Model から DTO への変換
    let dtos = messages
        .into_iter()
        .map(|m| MessageWithReadDto {
            message: MessageDto::new(m.message, &m.attachments),
            is_read: m.is_read,
            is_read_by_others: m.is_read_by_others,
        })
        .collect();
    Ok(Json(dtos))
}

/// `GET /api/rooms/{room_id}/unread_count`
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(room_id): Path<RoomId>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let unread_count = state
        .unread_count_usecase
        .execute(room_id, user_id)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// `GET /api/mentions`
pub async fn list_mentions(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<MentionDto>>, ApiError> {
    let messages = state
        .list_mentions_usecase
        .execute(user_id)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    Ok(Json(messages.into_iter().map(MentionDto::from).collect()))
}

/// `POST /api/messages/{message_id}/read`
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(message_id): Path<MessageId>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    match state.mark_read_usecase.mark_one(user_id, message_id).await {
        Ok(newly_read) => Ok(Json(MarkReadResponse {
            status: "ok".to_string(),
            newly_read,
        })),
        Err(e @ MarkReadError::MessageNotFound(_)) => Err(api_error(StatusCode::NOT_FOUND, e)),
        Err(e) => {
            tracing::error!("Failed to mark message {} as read: {}", message_id, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// `POST /api/rooms/{room_id}/read_all`
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(room_id): Path<RoomId>,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let read_count = state
        .mark_read_usecase
        .mark_all(user_id, room_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark room {} as read: {}", room_id, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        })?;

    Ok(Json(MarkAllReadResponse {
        status: "ok".to_string(),
        read_count,
    }))
}

fn edit_error(e: EditMessageError) -> ApiError {
    let status = match e {
        EditMessageError::MessageNotFound(_) => StatusCode::NOT_FOUND,
        EditMessageError::Forbidden(_) => StatusCode::FORBIDDEN,
        EditMessageError::InvalidContent(_) => StatusCode::BAD_REQUEST,
        EditMessageError::Repository(_) | EditMessageError::DispatchFailed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, e)
}

/// `PATCH /api/messages/{message_id}`
pub async fn edit_message(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(message_id): Path<MessageId>,
    Json(request): Json<EditMessageRequest>,
) -> Result<Json<MessageDto>, ApiError> {
    let (updated, attachments) = state
        .edit_message_usecase
        .edit(user_id, message_id, request.content)
        .await
        .map_err(edit_error)?;
    Ok(Json(MessageDto::new(updated, &attachments)))
}

/// `DELETE /api/messages/{message_id}`
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(message_id): Path<MessageId>,
) -> Result<StatusCode, ApiError> {
    state
        .edit_message_usecase
        .delete(user_id, message_id)
        .await
        .map_err(edit_error)?;
    Ok(StatusCode::NO_CONTENT)
}
