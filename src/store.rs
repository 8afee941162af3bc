use crate::errors::StoreError;
use crate::models::{DailyEntry, EntryCollection};
use crate::storage::KeyValueBackend;
use tracing::{debug, error, warn};

/// Storage key of the collection blob. Bump the suffix if the shape changes.
pub const ENTRIES_KEY: &str = "break3c_entries_v1";

/// Result of a write: the new snapshot plus whether it reached the backend.
///
/// The snapshot is returned even when persisting failed; callers should keep
/// showing it and surface `persisted` as a warning.
#[derive(Debug)]
pub struct Saved {
    pub entries: EntryCollection,
    pub persisted: Result<(), StoreError>,
}

impl Saved {
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_ok()
    }

    pub fn warning(&self) -> Option<String> {
        self.persisted
            .as_ref()
            .err()
            .map(|err| format!("entry kept in memory but not saved: {err}"))
    }
}

/// Reads and writes the whole [`EntryCollection`] as one JSON blob.
///
/// No locking happens here. Two overlapping writes each rewrite the full
/// blob and the last one wins, so callers must serialize writes.
#[derive(Debug)]
pub struct EntryStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> EntryStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Never fails: missing, unreadable or malformed data loads as empty.
    pub async fn load(&self) -> EntryCollection {
        let raw = match self.backend.get(ENTRIES_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored entries yet");
                return EntryCollection::default();
            }
            Err(err) => {
                error!("failed to read entries: {err}");
                return EntryCollection::default();
            }
        };

        match serde_json::from_str::<EntryCollection>(&raw) {
            Ok(entries) => {
                debug!(count = entries.len(), "loaded entries");
                entries
            }
            Err(err) => {
                warn!("discarding malformed stored entries: {err}");
                EntryCollection::default()
            }
        }
    }

    pub async fn upsert(&self, entries: &EntryCollection, key: &str, entry: DailyEntry) -> Saved {
        let entries = entries.with_entry(key, entry);
        let persisted = self.persist(&entries).await;
        Saved { entries, persisted }
    }

    pub async fn remove(&self, entries: &EntryCollection, key: &str) -> Saved {
        let entries = entries.without(key);
        let persisted = self.persist(&entries).await;
        Saved { entries, persisted }
    }

    async fn persist(&self, entries: &EntryCollection) -> Result<(), StoreError> {
        let result = match serde_json::to_string(entries) {
            Ok(payload) => self.backend.set(ENTRIES_KEY, payload).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = &result {
            warn!("failed to persist entries: {err}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    struct FailingBackend;

    impl KeyValueBackend for FailingBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(std::io::Error::other("disk gone").into())
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    fn entry(gratitude: &str) -> DailyEntry {
        let mut entry = DailyEntry::default();
        entry.morning.gratitude[0] = gratitude.to_string();
        entry
    }

    async fn store_with_raw(raw: &str) -> EntryStore<MemoryBackend> {
        let backend = MemoryBackend::default();
        backend.set(ENTRIES_KEY, raw.to_string()).await.unwrap();
        EntryStore::new(backend)
    }

    #[tokio::test]
    async fn load_without_data_is_empty() {
        let store = EntryStore::new(MemoryBackend::default());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn load_discards_malformed_payloads() {
        for raw in ["not-json{{", "[1, 2, 3]", "\"text\"", "null"] {
            let store = store_with_raw(raw).await;
            assert!(store.load().await.is_empty(), "payload {raw:?}");
        }
    }

    #[tokio::test]
    async fn load_tolerates_partial_entries() {
        let store = store_with_raw(r#"{"2025-10-05":{"night":{"wentWell":"x"}},"2025-10-06":5}"#).await;
        let entries = store.load().await;

        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get("2025-10-05").unwrap().night.went_well, "x");
        assert_eq!(entries.get("2025-10-06"), Some(&DailyEntry::default()));
    }

    #[tokio::test]
    async fn load_fails_open_on_read_error() {
        let store = EntryStore::new(FailingBackend);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn upserted_entries_round_trip_through_backend() {
        let store = EntryStore::new(MemoryBackend::default());
        let mut expected = EntryCollection::default();
        expected.days.insert("2025-10-04".into(), entry("tea"));
        expected.days.insert("2025-10-05".into(), entry("sun"));

        let mut entries = store.load().await;
        for (key, value) in expected.iter() {
            let saved = store.upsert(&entries, key, value.clone()).await;
            assert!(saved.is_persisted());
            entries = saved.entries;
        }

        assert_eq!(store.load().await, expected);
    }

    #[tokio::test]
    async fn upsert_is_idempotent_and_keeps_one_value_per_key() {
        let store = EntryStore::new(MemoryBackend::default());
        let empty = EntryCollection::default();

        let once = store.upsert(&empty, "2025-10-05", entry("a")).await.entries;
        let twice = store.upsert(&once, "2025-10-05", entry("a")).await.entries;
        assert_eq!(once, twice);

        let replaced = store.upsert(&twice, "2025-10-05", entry("b")).await.entries;
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced.get("2025-10-05"), Some(&entry("b")));
        assert_eq!(store.load().await, replaced);
    }

    #[tokio::test]
    async fn failed_write_keeps_optimistic_snapshot() {
        let store = EntryStore::new(FailingBackend);
        let saved = store
            .upsert(&EntryCollection::default(), "2025-10-05", entry("a"))
            .await;

        assert!(!saved.is_persisted());
        assert!(saved.warning().unwrap().contains("disk full"));
        assert_eq!(saved.entries.get("2025-10-05"), Some(&entry("a")));

        let removed = store.remove(&saved.entries, "2025-10-05").await;
        assert!(!removed.is_persisted());
        assert!(removed.entries.is_empty());
    }

    #[tokio::test]
    async fn remove_persists_without_key() {
        let store = EntryStore::new(MemoryBackend::default());
        let entries = store
            .upsert(&EntryCollection::default(), "2025-10-05", entry("a"))
            .await
            .entries;
        let entries = store.upsert(&entries, "2025-10-06", entry("b")).await.entries;

        let saved = store.remove(&entries, "2025-10-05").await;
        assert!(saved.is_persisted());
        assert!(saved.warning().is_none());
        assert_eq!(entries.len(), 2);

        let reloaded = store.load().await;
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get("2025-10-05").is_none());
    }
}
