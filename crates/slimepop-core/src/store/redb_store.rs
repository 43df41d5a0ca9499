// ============================================================================
// RedbStore - Embedded key-value database (redb)
// ============================================================================
// Single-table byte store backing the economy's persisted state.
// Default path: ~/.slimepop/economy.redb (override via SLIMEPOP_DB_PATH)
// ============================================================================

use anyhow::{anyhow, Result};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::KeyValueStore;

const STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("state");

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "SLIMEPOP_DB_PATH";

/// redb-backed implementation of the key-value port
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

/// `~/.slimepop/economy.redb`, creating the directory on the way
fn default_store_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("No home directory for the economy store"))?;
    let dir = home.join(".slimepop");
    std::fs::create_dir_all(&dir)
        .map_err(|e| anyhow!("Failed to create {}: {}", dir.display(), e))?;
    Ok(dir.join("economy.redb"))
}

impl RedbStore {
    /// Open the player's economy store, creating it on first launch.
    /// Explicit path first, then SLIMEPOP_DB_PATH, then the home default.
    pub fn open(path: Option<&str>) -> Result<Self> {
        let db_path = match path {
            Some(p) => PathBuf::from(p),
            None => match std::env::var(DB_PATH_ENV) {
                Ok(env_path) => PathBuf::from(env_path),
                Err(_) => default_store_path()?,
            },
        };

        info!("Opening economy store at: {}", db_path.display());
        let db = Database::create(&db_path)
            .map_err(|e| anyhow!("Economy store unavailable at {}: {}", db_path.display(), e))?;

        // A fresh file has no state table until the first write commits
        let init = db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin state init: {}", e))?;
        init.open_table(STATE)
            .map_err(|e| anyhow!("Failed to create state table: {}", e))?;
        init.commit()
            .map_err(|e| anyhow!("Failed to commit state init: {}", e))?;

        Ok(Self { db, path: db_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let table = read_txn.open_table(STATE)
            .map_err(|e| anyhow!("Failed to open state table: {}", e))?;

        let value = table
            .get(key)
            .map_err(|e| anyhow!("Failed to get {}: {}", key, e))?
            .map(|v| v.value().to_vec());
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let mut table = write_txn.open_table(STATE)
                .map_err(|e| anyhow!("Failed to open state table: {}", e))?;
            table.insert(key, value)
                .map_err(|e| anyhow!("Failed to insert {}: {}", key, e))?;
        }
        write_txn.commit().map_err(|e| anyhow!("Failed to commit: {}", e))?;

        debug!("Stored key: {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        let removed;
        {
            let mut table = write_txn.open_table(STATE)
                .map_err(|e| anyhow!("Failed to open state table: {}", e))?;
            removed = table.remove(key)
                .map_err(|e| anyhow!("Failed to remove {}: {}", key, e))?
                .is_some();
        }
        write_txn.commit().map_err(|e| anyhow!("Failed to commit delete: {}", e))?;

        if removed {
            debug!("Removed key: {}", key);
        }
        Ok(removed)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let table = read_txn.open_table(STATE)
            .map_err(|e| anyhow!("Failed to open state table: {}", e))?;

        let mut keys = Vec::new();
        let iter = table.range::<&str>(prefix..)
            .map_err(|e| anyhow!("Failed to iterate state: {}", e))?;
        for entry in iter {
            let (key, _value) = entry.map_err(|e| anyhow!("Failed to read entry: {}", e))?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }
        Ok(keys)
    }
}
