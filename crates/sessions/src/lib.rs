//! # Docent Sessions
//!
//! Session persistence backends. The engine keeps one append-only
//! record per conversation thread; these stores decide where it lives.
//!
//! - [`FileStore`] — one pretty-printed JSON file per session
//! - [`MemoryStore`] — in-process map, for tests and ephemeral runs

mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
