use crate::store::{Entry, KeyValueStore, PutOutcome, Version};
use std::collections::HashMap;
use std::io;
use tokio::sync::RwLock;

// Durability is delegated to whichever engine backs the node in production. This one only lives
// as long as the process.
pub(crate) struct InMemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    entries: HashMap<String, Entry>,
    high_water_mark: Option<Version>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        InMemoryStore {
            state: RwLock::new(State::default()),
        }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Entry>, io::Error> {
        Ok(self.state.read().await.entries.get(key).cloned())
    }

    async fn put(&self, key: String, entry: Entry) -> Result<PutOutcome, io::Error> {
        let mut state = self.state.write().await;

        if let Some(existing) = state.entries.get(&key) {
            if existing.version > entry.version {
                return Ok(PutOutcome::Superseded {
                    current: existing.version,
                });
            }
            if existing.version == entry.version {
                if existing.value == entry.value {
                    return Ok(PutOutcome::Duplicate);
                }
                return Ok(PutOutcome::Conflict {
                    current: existing.clone(),
                });
            }
        }

        if state.high_water_mark.map_or(true, |hwm| entry.version > hwm) {
            state.high_water_mark = Some(entry.version);
        }
        state.entries.insert(key, entry);

        Ok(PutOutcome::Applied)
    }

    async fn high_water_mark(&self) -> Option<Version> {
        self.state.read().await.high_water_mark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::Epoch;

    fn entry(sequence: u64, value: &str) -> Entry {
        Entry::new(Version::new(Epoch::new(1), sequence), Some(value.to_string()))
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        let outcome = store.put("k".into(), entry(1, "v1")).await.unwrap();
        assert_eq!(outcome, PutOutcome::Applied);
        assert_eq!(store.get("k").await.unwrap(), Some(entry(1, "v1")));
    }

    #[tokio::test]
    async fn older_version_does_not_overwrite_newer() {
        let store = InMemoryStore::new();
        store.put("k".into(), entry(5, "new")).await.unwrap();

        let outcome = store.put("k".into(), entry(3, "old")).await.unwrap();

        assert_eq!(
            outcome,
            PutOutcome::Superseded {
                current: Version::new(Epoch::new(1), 5)
            }
        );
        assert_eq!(store.get("k").await.unwrap(), Some(entry(5, "new")));
    }

    #[tokio::test]
    async fn redelivery_is_a_duplicate_and_equal_version_mismatch_is_a_conflict() {
        let store = InMemoryStore::new();
        store.put("k".into(), entry(2, "v")).await.unwrap();

        assert_eq!(store.put("k".into(), entry(2, "v")).await.unwrap(), PutOutcome::Duplicate);
        assert_eq!(
            store.put("k".into(), entry(2, "other")).await.unwrap(),
            PutOutcome::Conflict { current: entry(2, "v") }
        );
    }

    #[tokio::test]
    async fn tombstone_replaces_value() {
        let store = InMemoryStore::new();
        store.put("k".into(), entry(1, "v")).await.unwrap();

        let tombstone = Entry::new(Version::new(Epoch::new(1), 2), None);
        store.put("k".into(), tombstone.clone()).await.unwrap();

        let stored = store.get("k").await.unwrap().unwrap();
        assert!(stored.is_tombstone());
        assert_eq!(stored, tombstone);
    }

    #[tokio::test]
    async fn high_water_mark_tracks_max_across_keys() {
        let store = InMemoryStore::new();
        assert_eq!(store.high_water_mark().await, None);

        store.put("a".into(), entry(7, "a")).await.unwrap();
        store.put("b".into(), entry(4, "b")).await.unwrap();

        assert_eq!(store.high_water_mark().await, Some(Version::new(Epoch::new(1), 7)));
    }
}
