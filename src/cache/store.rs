//! Cache store implementations: SQLite for persistence, in-memory for
//! tests and as a reference implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{CacheStore, StoredResponse};

/// SQLite-backed cache store.
///
/// Insertion order is the autoincrement sequence; `INSERT OR REPLACE`
/// re-inserts with a fresh sequence number, which is what moves a
/// replaced URL to the back of the FIFO order.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS response_cache (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    partition TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    content_type TEXT,
    body BLOB NOT NULL,
    stored_at TEXT NOT NULL,
    UNIQUE (partition, url)
);

CREATE INDEX IF NOT EXISTS idx_response_cache_partition
    ON response_cache(partition, seq);
"#;

impl SqliteStore {
  /// Open or create the store at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open or create the store at a specific path.
  pub fn open_at(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Default database path under the platform data directory.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("folio").join("cache.db"))
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStore for SqliteStore {
  fn get(&self, partition: &str, url: &str) -> Result<Option<StoredResponse>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare(
        "SELECT status, content_type, body, stored_at FROM response_cache
         WHERE partition = ? AND url = ?",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let row: Option<(u16, Option<String>, Vec<u8>, String)> = stmt
      .query_row(params![partition, url], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
      })
      .ok();

    match row {
      Some((status, content_type, body, stored_at)) => Ok(Some(StoredResponse {
        status,
        content_type,
        body,
        stored_at: parse_datetime(&stored_at)?,
      })),
      None => Ok(None),
    }
  }

  fn put(&self, partition: &str, url: &str, response: &StoredResponse) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO response_cache (partition, url, status, content_type, body, stored_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
          partition,
          url,
          response.status,
          response.content_type,
          response.body,
          response.stored_at.to_rfc3339(),
        ],
      )
      .map_err(|e| eyre!("Failed to store response: {}", e))?;

    Ok(())
  }

  fn trim_to(&self, partition: &str, max_entries: usize) -> Result<usize> {
    let conn = self.lock()?;

    let count: usize = conn
      .query_row(
        "SELECT COUNT(*) FROM response_cache WHERE partition = ?",
        params![partition],
        |row| row.get(0),
      )
      .map_err(|e| eyre!("Failed to count entries: {}", e))?;

    if count <= max_entries {
      return Ok(0);
    }

    let excess = count - max_entries;
    conn
      .execute(
        "DELETE FROM response_cache WHERE seq IN (
           SELECT seq FROM response_cache WHERE partition = ?
           ORDER BY seq ASC LIMIT ?
         )",
        params![partition, excess],
      )
      .map_err(|e| eyre!("Failed to evict entries: {}", e))?;

    Ok(excess)
  }

  fn keys(&self, partition: &str) -> Result<Vec<String>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare("SELECT url FROM response_cache WHERE partition = ? ORDER BY seq ASC")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let urls = stmt
      .query_map(params![partition], |row| row.get(0))
      .map_err(|e| eyre!("Failed to query keys: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(urls)
  }

  fn partitions(&self) -> Result<Vec<String>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare("SELECT DISTINCT partition FROM response_cache ORDER BY partition")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let names = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to query partitions: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(names)
  }

  fn delete_partition(&self, partition: &str) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "DELETE FROM response_cache WHERE partition = ?",
        params![partition],
      )
      .map_err(|e| eyre!("Failed to delete partition: {}", e))?;

    Ok(())
  }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

/// In-memory store with the same ordering semantics as [`SqliteStore`].
#[derive(Default)]
pub struct MemoryStore {
  partitions: Mutex<HashMap<String, Vec<(String, StoredResponse)>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(
    &self,
  ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<(String, StoredResponse)>>>> {
    self
      .partitions
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStore for MemoryStore {
  fn get(&self, partition: &str, url: &str) -> Result<Option<StoredResponse>> {
    let partitions = self.lock()?;
    Ok(partitions.get(partition).and_then(|entries| {
      entries
        .iter()
        .find(|(key, _)| key == url)
        .map(|(_, response)| response.clone())
    }))
  }

  fn put(&self, partition: &str, url: &str, response: &StoredResponse) -> Result<()> {
    let mut partitions = self.lock()?;
    let entries = partitions.entry(partition.to_string()).or_default();
    entries.retain(|(key, _)| key != url);
    entries.push((url.to_string(), response.clone()));
    Ok(())
  }

  fn trim_to(&self, partition: &str, max_entries: usize) -> Result<usize> {
    let mut partitions = self.lock()?;
    let Some(entries) = partitions.get_mut(partition) else {
      return Ok(0);
    };
    if entries.len() <= max_entries {
      return Ok(0);
    }
    let excess = entries.len() - max_entries;
    entries.drain(..excess);
    Ok(excess)
  }

  fn keys(&self, partition: &str) -> Result<Vec<String>> {
    let partitions = self.lock()?;
    Ok(
      partitions
        .get(partition)
        .map(|entries| entries.iter().map(|(key, _)| key.clone()).collect())
        .unwrap_or_default(),
    )
  }

  fn partitions(&self) -> Result<Vec<String>> {
    let partitions = self.lock()?;
    let mut names: Vec<String> = partitions
      .iter()
      .filter(|(_, entries)| !entries.is_empty())
      .map(|(name, _)| name.clone())
      .collect();
    names.sort();
    Ok(names)
  }

  fn delete_partition(&self, partition: &str) -> Result<()> {
    let mut partitions = self.lock()?;
    partitions.remove(partition);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn response(body: &str) -> StoredResponse {
    StoredResponse {
      status: 200,
      content_type: Some("text/plain".to_string()),
      body: body.as_bytes().to_vec(),
      stored_at: Utc::now(),
    }
  }

  fn check_roundtrip(store: &dyn Fn() -> Box<dyn CacheStore>) {
    let store = store();
    assert!(store.get("p", "https://a.test/x").unwrap().is_none());

    store.put("p", "https://a.test/x", &response("hello")).unwrap();
    let cached = store.get("p", "https://a.test/x").unwrap().unwrap();
    assert_eq!(cached.body, b"hello");
    assert_eq!(cached.content_type.as_deref(), Some("text/plain"));
  }

  fn check_replace_moves_to_back(store: &dyn Fn() -> Box<dyn CacheStore>) {
    let store = store();
    store.put("p", "one", &response("1")).unwrap();
    store.put("p", "two", &response("2")).unwrap();
    store.put("p", "one", &response("1 again")).unwrap();

    assert_eq!(store.keys("p").unwrap(), vec!["two", "one"]);
  }

  fn check_trim_evicts_oldest(store: &dyn Fn() -> Box<dyn CacheStore>) {
    let store = store();
    store.put("p", "one", &response("1")).unwrap();
    store.put("p", "two", &response("2")).unwrap();
    store.put("p", "three", &response("3")).unwrap();

    assert_eq!(store.trim_to("p", 2).unwrap(), 1);
    assert_eq!(store.keys("p").unwrap(), vec!["two", "three"]);
    assert!(store.get("p", "one").unwrap().is_none());
    assert_eq!(store.trim_to("p", 2).unwrap(), 0);
  }

  fn check_partitions(store: &dyn Fn() -> Box<dyn CacheStore>) {
    let store = store();
    store.put("a", "u", &response("x")).unwrap();
    store.put("b", "u", &response("y")).unwrap();
    assert_eq!(store.partitions().unwrap(), vec!["a", "b"]);

    store.delete_partition("a").unwrap();
    assert_eq!(store.partitions().unwrap(), vec!["b"]);
    assert!(store.get("a", "u").unwrap().is_none());
  }

  #[test]
  fn test_memory_store() {
    let make: Box<dyn Fn() -> Box<dyn CacheStore>> = Box::new(|| Box::new(MemoryStore::new()));
    check_roundtrip(&make);
    check_replace_moves_to_back(&make);
    check_trim_evicts_oldest(&make);
    check_partitions(&make);
  }

  #[test]
  fn test_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    let counter = std::sync::atomic::AtomicU32::new(0);
    let make: Box<dyn Fn() -> Box<dyn CacheStore>> = Box::new(move || {
      let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
      Box::new(SqliteStore::open_at(&path.join(format!("cache-{}.db", n))).unwrap())
    });
    check_roundtrip(&make);
    check_replace_moves_to_back(&make);
    check_trim_evicts_oldest(&make);
    check_partitions(&make);
  }

  #[test]
  fn test_sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    let store = SqliteStore::open_at(&path).unwrap();
    store.put("p", "u", &response("kept")).unwrap();
    drop(store);

    let store = SqliteStore::open_at(&path).unwrap();
    assert_eq!(store.get("p", "u").unwrap().unwrap().body, b"kept");
  }
}
