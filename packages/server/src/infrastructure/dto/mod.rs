//! Data Transfer Objects (DTOs) for the chat server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound frames and outbound envelopes
//! - `http`: REST request / response bodies
//! - `conversion`: domain entity → DTO conversions

pub mod conversion;
pub mod http;
pub mod websocket;
