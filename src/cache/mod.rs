//! Offline-first caching for all site fetches.
//!
//! Every outgoing GET is classified into a resource class (`policy`), then
//! served through one of five named strategies (`controller`) against a
//! persistent partitioned store (`store`). The controller also carries the
//! worker-style lifecycle: precache on install, old-version cleanup on
//! activate, and the cache-status / skip-waiting control messages.

mod controller;
mod policy;
mod store;
mod traits;

pub use controller::{CacheController, ControlMessage, ControlReply};
pub use policy::{classify, Partition, PartitionConfig, Strategy, STATIC_ASSETS};
pub use store::{MemoryStore, SqliteStore};
pub use traits::{
  CacheStatus, CacheStore, PartitionStatus, ResponseSource, Served, StoredResponse,
};
