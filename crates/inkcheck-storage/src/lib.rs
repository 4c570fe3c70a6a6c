//! # inkcheck Storage
//!
//! [`KeyValueStore`](inkcheck_protocols::KeyValueStore) implementations and
//! typed accessors for the persisted settings and counters.

mod access;
mod change;
mod file;
mod memory;

pub use access::{load_counters, load_settings, populate_defaults, save_counters, save_settings};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Capacity of each store's change channel.
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;
