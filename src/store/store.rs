use crate::store::{Entry, Version};
use std::io;

/// KeyValueStore is a single node's local copy of the data. It is never mutated directly by
/// another node; replicated writes arrive as messages and are applied through `put()`.
///
/// Implementations must allow concurrent reads and serialize writes to the same key, and must
/// never move a key's version backwards.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the latest entry for `key`, including tombstones.
    async fn get(&self, key: &str) -> Result<Option<Entry>, io::Error>;

    /// Durably apply `entry` to `key` iff its version is newer than what we already hold.
    async fn put(&self, key: String, entry: Entry) -> Result<PutOutcome, io::Error>;

    /// The highest version ever applied to this store, across all keys.
    async fn high_water_mark(&self) -> Option<Version>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    Applied,
    /// Same version and same value were already applied (e.g. a redelivered replication message).
    Duplicate,
    /// A newer version is already stored. The put is dropped, which is still a successful outcome
    /// under last-writer-wins.
    Superseded { current: Version },
    /// Same version, different value. Only possible if the single-writer-per-version invariant was
    /// broken somewhere.
    Conflict { current: Entry },
}
