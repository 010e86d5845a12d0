//! Connection Registry の実装
//!
//! - `inmemory`: プロセス内の Mutex 付き HashMap による実装

pub mod inmemory;

pub use inmemory::InMemoryConnectionRegistry;
