//! Core types and the storage trait for the caching system.

use chrono::{DateTime, Duration, Utc};
use color_eyre::Result;
use serde::Serialize;

/// A response held in a cache partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
  pub status: u16,
  pub content_type: Option<String>,
  pub body: Vec<u8>,
  /// Insertion time; drives TTL expiry
  pub stored_at: DateTime<Utc>,
}

impl StoredResponse {
  /// Whether the origin answered with an HTTP success status.
  /// Only successful responses are ever stored.
  pub fn is_http_ok(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// An expired entry is ineligible for a fresh cache read but is kept
  /// around as a last-resort fallback.
  pub fn is_expired(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
    now - self.stored_at > max_age
  }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
  /// Fresh from the network
  Network,
  /// From cache, within its TTL
  CacheFresh,
  /// From cache, past its TTL (network was unavailable)
  CacheStale,
  /// Synthesized; neither cache nor network had anything usable
  Fallback,
}

/// What the controller hands back. Every intercepted request resolves to
/// one of these; the fallback chain guarantees it.
#[derive(Debug, Clone)]
pub struct Served {
  pub status: u16,
  pub content_type: Option<String>,
  pub body: Vec<u8>,
  pub source: ResponseSource,
}

impl Served {
  pub fn from_stored(response: StoredResponse, source: ResponseSource) -> Self {
    Self {
      status: response.status,
      content_type: response.content_type,
      body: response.body,
      source,
    }
  }

  pub fn is_http_ok(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Storage backend for cache partitions.
///
/// A partition name is a full cache name (`<cache-name>-<class>`).
/// Implementations must preserve per-partition insertion order: eviction
/// is FIFO, independent of access recency.
pub trait CacheStore: Send + Sync {
  /// Look up a response by URL.
  fn get(&self, partition: &str, url: &str) -> Result<Option<StoredResponse>>;

  /// Insert or replace. Replacing an existing URL moves it to the back of
  /// the insertion order.
  fn put(&self, partition: &str, url: &str, response: &StoredResponse) -> Result<()>;

  /// Delete the oldest entries until the partition holds at most
  /// `max_entries`. Returns how many entries were deleted.
  fn trim_to(&self, partition: &str, max_entries: usize) -> Result<usize>;

  /// URLs in insertion order, oldest first.
  fn keys(&self, partition: &str) -> Result<Vec<String>>;

  /// Names of all partitions with at least one entry.
  fn partitions(&self) -> Result<Vec<String>>;

  /// Drop a whole partition.
  fn delete_partition(&self, partition: &str) -> Result<()>;
}

/// Per-partition diagnostic snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionStatus {
  pub name: String,
  pub entries: usize,
  pub urls: Vec<String>,
}

/// Answer to the cache-status control message.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
  pub partitions: Vec<PartitionStatus>,
}
