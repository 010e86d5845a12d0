//! Real-time chat delivery server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsudoi-server -- --user 1=alice --user 2=bob
//! cargo run --bin tsudoi-server -- --issue-token 1
//! cargo run --bin tsudoi-server -- --host 0.0.0.0 --port 3000 --json-logs
//! ```

use std::sync::Arc;

use chrono::Duration;
use clap::Parser;
use tsudoi_server::{
    config::ServerConfig,
    domain::{Authenticator, UserId},
    infrastructure::{
        auth::JwtAuthenticator, dispatcher::BroadcastDispatcher, notifier::ReadReceiptFanout,
        registry::InMemoryConnectionRegistry, repository::InMemoryMessageRepository,
    },
    ui::{Server, state::AppState},
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, EditMessageUseCase, ListMentionsUseCase,
        ListMessagesUseCase, MarkReadUseCase, SendMessageUseCase, UnreadCountUseCase,
    },
};
use tsudoi_shared::{
    logger::{LogFormat, setup_logger},
    time::SystemClock,
};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    let format = if config.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level, format);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize dependencies in order:
    // 1. Authenticator
    // 2. Repository
    // 3. Registry, Dispatcher, Notifier
    // 4. UseCases
    // 5. AppState
    // 6. Server

    // 1. Create Authenticator
    if config.uses_dev_secret() {
        tracing::warn!("Using the built-in development JWT secret; set TSUDOI_JWT_SECRET");
    }
    let authenticator = Arc::new(JwtAuthenticator::new(
        config.jwt_secret.as_bytes(),
        Duration::seconds(config.token_ttl_secs),
    ));

    if let Some(user_id) = config.issue_token {
        let token = authenticator.issue(UserId::new(user_id))?;
        println!("{}", token);
        return Ok(());
    }

    // 2. Create Repository (in-memory database)
    let repository = Arc::new(InMemoryMessageRepository::new());
    for user in &config.users {
        repository.register_user(user.id, user.name.clone()).await;
        tracing::info!("User {} registered as '{}'", user.id, user.name);
    }

    // 3. Create Registry, Dispatcher and Notifier
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let (dispatcher, _dispatcher_task) = BroadcastDispatcher::spawn(
        repository.clone(),
        registry.clone(),
        config.dispatch_queue_capacity,
    );
    let dispatcher = Arc::new(dispatcher);
    let notifier = Arc::new(ReadReceiptFanout::new(registry.clone()));
    let clock = Arc::new(SystemClock);

    // 4. Create UseCases
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        authenticator.clone(),
        registry.clone(),
        config.session_buffer,
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(registry.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        repository.clone(),
        dispatcher.clone(),
        clock.clone(),
    ));
    let mark_read_usecase = Arc::new(MarkReadUseCase::new(
        repository.clone(),
        notifier,
        clock.clone(),
    ));
    let edit_message_usecase = Arc::new(EditMessageUseCase::new(
        repository.clone(),
        dispatcher,
        clock,
    ));
    let list_messages_usecase = Arc::new(ListMessagesUseCase::new(repository.clone()));
    let unread_count_usecase = Arc::new(UnreadCountUseCase::new(repository.clone()));
    let list_mentions_usecase = Arc::new(ListMentionsUseCase::new(repository));

    // 5. Create AppState
    let app_state = Arc::new(AppState {
        authenticator,
        registry,
        connect_session_usecase,
        disconnect_session_usecase,
        send_message_usecase,
        mark_read_usecase,
        edit_message_usecase,
        list_messages_usecase,
        unread_count_usecase,
        list_mentions_usecase,
    });

    // 6. Create and run the server
    Server::new(app_state)
        .run(config.host.clone(), config.port)
        .await
}
