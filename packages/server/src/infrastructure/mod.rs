//! Infrastructure 層
//!
//! ドメイン層の Port（trait）の具体的な実装と、外部とやり取りする DTO。

pub mod auth;
pub mod dispatcher;
pub mod dto;
pub mod fanout;
pub mod notifier;
pub mod registry;
pub mod repository;
