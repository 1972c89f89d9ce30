// --------------------------------------------------
// Read-modify-write cycles over a DocumentStore.
//
// Every mutation runs under one async lock so concurrent requests
// cannot overwrite each other's changes. Reads skip the lock; the
// store replaces files atomically.
// --------------------------------------------------

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::logic;
use crate::models::{Collection, Record, RecordSet};
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
    write_lock: Arc<Mutex<()>>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Whole document of a collection.
    pub fn document(&self, collection: Collection) -> Result<Value, StoreError> {
        self.store.read(collection)
    }

    /// Records of one set (a flat collection or one projects bucket).
    pub fn list(&self, set: RecordSet) -> Result<Value, StoreError> {
        let doc = self.store.read(set.collection())?;
        let list = logic::records(&doc, set).ok_or_else(|| corrupt(set))?;
        Ok(Value::Array(list.clone()))
    }

    pub async fn create(&self, set: RecordSet, payload: Record) -> Result<Value, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.store.read(set.collection())?;
        let mut sequences = self.store.read_sequences()?;

        let list = logic::records_mut(&mut doc, set).ok_or_else(|| corrupt(set))?;
        let (created, n) = logic::create(list, payload, set.id_prefix(), sequences.high_water(set))
            .ok_or_else(|| exhausted(set))?;

        // Sequence first; a failed document write then only leaves a gap in the ids
        sequences.bump(set, n);
        self.store.write_sequences(&sequences)?;
        self.store.write(set.collection(), &doc)?;

        let id = created
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        tracing::info!(
            collection = set.collection().name(),
            set = %set.sequence_key(),
            id,
            "record created"
        );
        Ok(created)
    }

    /// Returns Ok(None) when no record has `id`; storage is not written then.
    pub async fn update(
        &self,
        set: RecordSet,
        id: &str,
        patch: &Record,
    ) -> Result<Option<Value>, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.store.read(set.collection())?;
        let list = logic::records_mut(&mut doc, set).ok_or_else(|| corrupt(set))?;

        let Some(updated) = logic::update(list, id, patch) else {
            return Ok(None);
        };

        self.store.write(set.collection(), &doc)?;
        tracing::info!(collection = set.collection().name(), set = %set.sequence_key(), id, "record updated");
        Ok(Some(updated))
    }

    /// Returns Ok(None) when no record has `id`; storage is not written then.
    pub async fn delete(&self, set: RecordSet, id: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.store.read(set.collection())?;
        let list = logic::records_mut(&mut doc, set).ok_or_else(|| corrupt(set))?;

        let Some(removed) = logic::delete(list, id) else {
            return Ok(None);
        };

        self.store.write(set.collection(), &doc)?;
        tracing::info!(collection = set.collection().name(), set = %set.sequence_key(), id, "record deleted");
        Ok(Some(removed))
    }
}

fn exhausted(set: RecordSet) -> StoreError {
    StoreError::Corrupt {
        path: set.collection().file_name().into(),
        reason: format!("id space exhausted for {}", set.sequence_key()),
    }
}

fn corrupt(set: RecordSet) -> StoreError {
    StoreError::Corrupt {
        path: set.collection().file_name().into(),
        reason: format!("no record list for {}", set.sequence_key()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bucket, Sequences};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    // In-memory store that counts writes
    #[derive(Default)]
    struct MemoryStore {
        docs: StdMutex<HashMap<Collection, Value>>,
        sequences: StdMutex<Sequences>,
        writes: StdMutex<usize>,
        fail_sequence_writes: bool,
    }

    impl MemoryStore {
        fn seeded() -> Self {
            let store = MemoryStore::default();
            {
                let mut docs = store.docs.lock().unwrap();
                for c in Collection::ALL {
                    docs.insert(c, c.empty_document());
                }
            }
            store
        }

        fn writes(&self) -> usize {
            *self.writes.lock().unwrap()
        }
    }

    impl DocumentStore for MemoryStore {
        fn read(&self, collection: Collection) -> Result<Value, StoreError> {
            self.docs
                .lock()
                .unwrap()
                .get(&collection)
                .cloned()
                .ok_or_else(|| StoreError::Io {
                    path: collection.file_name().into(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                })
        }

        fn write(&self, collection: Collection, doc: &Value) -> Result<(), StoreError> {
            *self.writes.lock().unwrap() += 1;
            self.docs.lock().unwrap().insert(collection, doc.clone());
            Ok(())
        }

        fn read_sequences(&self) -> Result<Sequences, StoreError> {
            Ok(self.sequences.lock().unwrap().clone())
        }

        fn write_sequences(&self, seq: &Sequences) -> Result<(), StoreError> {
            if self.fail_sequence_writes {
                return Err(StoreError::Io {
                    path: crate::store::SEQUENCES_FILE.into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            *self.sequences.lock().unwrap() = seq.clone();
            Ok(())
        }
    }

    fn obj(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    const ACHIEVEMENTS: RecordSet = RecordSet::Flat(Collection::Achievements);

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let repo = Repository::new(Arc::new(MemoryStore::seeded()));

        repo.create(ACHIEVEMENTS, obj(json!({ "title": "a" }))).await.unwrap();
        let second = repo.create(ACHIEVEMENTS, obj(json!({ "title": "b" }))).await.unwrap();
        assert_eq!(second["id"], "2");

        repo.delete(ACHIEVEMENTS, "2").await.unwrap().unwrap();
        let third = repo.create(ACHIEVEMENTS, obj(json!({ "title": "c" }))).await.unwrap();
        assert_eq!(third["id"], "3");
    }

    #[tokio::test]
    async fn failed_sequence_write_leaves_document_untouched() {
        let store = Arc::new(MemoryStore {
            fail_sequence_writes: true,
            ..MemoryStore::seeded()
        });
        let repo = Repository::new(store.clone());

        let err = repo.create(ACHIEVEMENTS, obj(json!({ "title": "a" }))).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.writes(), 0);
        assert_eq!(repo.list(ACHIEVEMENTS).unwrap(), json!([]));
    }

    #[tokio::test]
    async fn exhausted_sequence_is_an_error_not_a_wrap() {
        let store = Arc::new(MemoryStore::seeded());
        store.sequences.lock().unwrap().bump(ACHIEVEMENTS, u64::MAX);
        let repo = Repository::new(store.clone());

        let err = repo.create(ACHIEVEMENTS, obj(json!({ "title": "a" }))).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(store.writes(), 0);
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<StdMutex<Vec<u8>>>);

    impl std::io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn create_logs_assigned_id() {
        let sink = SharedBuffer::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .json()
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let repo = Repository::new(Arc::new(MemoryStore::seeded()));
        repo.create(RecordSet::Projects(Bucket::Developer), obj(json!({ "title": "cli" })))
            .await
            .unwrap();

        let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        let line = text
            .lines()
            .find(|l| l.contains("record created"))
            .expect("created event");
        let parsed: Value = serde_json::from_str(line).unwrap();
        assert_eq!(parsed["fields"]["id"], "d1");
        assert_eq!(parsed["fields"]["set"], "projects.developer");
    }

    #[tokio::test]
    async fn misses_do_not_write() {
        let store = Arc::new(MemoryStore::seeded());
        let repo = Repository::new(store.clone());
        repo.create(ACHIEVEMENTS, obj(json!({ "title": "a" }))).await.unwrap();
        let writes = store.writes();

        assert!(repo.update(ACHIEVEMENTS, "9", &obj(json!({ "title": "z" }))).await.unwrap().is_none());
        assert!(repo.delete(ACHIEVEMENTS, "9").await.unwrap().is_none());
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn buckets_are_independent() {
        let repo = Repository::new(Arc::new(MemoryStore::seeded()));
        let dev = RecordSet::Projects(Bucket::Developer);
        let des = RecordSet::Projects(Bucket::Designer);

        let d = repo.create(dev, obj(json!({ "title": "api" }))).await.unwrap();
        let g = repo.create(des, obj(json!({ "title": "logo" }))).await.unwrap();
        assert_eq!(d["id"], "d1");
        assert_eq!(g["id"], "1");

        // same id in the other bucket does not match
        assert!(repo.delete(dev, "1").await.unwrap().is_none());
        assert_eq!(repo.list(des).unwrap(), json!([{ "title": "logo", "id": "1" }]));
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() {
        let repo = Repository::new(Arc::new(MemoryStore::seeded()));

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(ACHIEVEMENTS, obj(json!({ "n": i }))).await.unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let list = repo.list(ACHIEVEMENTS).unwrap();
        let mut ids: Vec<String> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids.len(), 16);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }
}
