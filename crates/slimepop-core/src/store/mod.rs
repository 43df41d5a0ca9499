// ============================================================================
// Store - Key-value persistence port
// ============================================================================
// The economy persists through a generic byte-valued key-value store. Two
// adapters ship: an in-memory map and an embedded redb database
// (default path ~/.slimepop/economy.redb, override via SLIMEPOP_DB_PATH).
// ============================================================================

mod memory;
pub mod prefs;
mod redb_store;

pub use memory::MemoryStore;
pub use prefs::Prefs;
pub use redb_store::RedbStore;

use anyhow::Result;

/// Durable key-value port
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Returns true if the key existed
    fn remove(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`, in ascending order
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
