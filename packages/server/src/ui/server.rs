//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        debug_room_sessions, delete_message, edit_message, health_check, list_mentions,
        list_messages, mark_all_read, mark_read, send_message, unread_count, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Build the application router
///
/// Exposed separately from [`Server::run`] so tests can serve it on an ephemeral port.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route(
            "/api/rooms/{room_id}/messages",
            post(send_message).get(list_messages),
        )
        .route("/api/rooms/{room_id}/read_all", post(mark_all_read))
        .route("/api/rooms/{room_id}/unread_count", get(unread_count))
        .route("/api/mentions", get(list_mentions))
        .route("/api/messages/{message_id}/read", post(mark_read))
        .route(
            "/api/messages/{message_id}",
            patch(edit_message).delete(delete_message),
        )
        .route("/debug/rooms/{room_id}/sessions", get(debug_room_sessions))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    app_state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    /// Run the WebSocket chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(self.app_state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "WebSocket chat server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws?token=<token>&room_id=<id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
