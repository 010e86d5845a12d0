//! WebSocket chat server implementation.

mod auth;
mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, router};
