//! Repository 実装
//!
//! - `inmemory`: プロセス内のセッションレジストリ

pub mod inmemory;

pub use inmemory::InMemorySessionRepository;
