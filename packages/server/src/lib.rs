//! Real-time delivery core for a room-based chat server.
//!
//! Sessions join a room over WebSocket; messages posted in a room are persisted,
//! then fanned out to every open session of that room in submission order.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
