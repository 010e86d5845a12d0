//! HTTP / WebSocket handlers.

mod http;
mod websocket;

pub use http::{
    debug_room_sessions, delete_message, edit_message, health_check, list_mentions,
    list_messages, mark_all_read, mark_read, send_message, unread_count,
};
pub use websocket::websocket_handler;
