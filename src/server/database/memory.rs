//! Process-local document store for development without a database.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time;

use crate::server::database::{DocumentStore, StoreError, StoredObject};

/// Simulated round-trip delay, `N` or `LO..HI` milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Latency {
    min_ms: u64,
    max_ms: u64,
}

impl Latency {
    pub fn range(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    async fn wait(&self) {
        if self.max_ms == 0 {
            return;
        }
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        time::sleep(Duration::from_millis(ms)).await;
    }
}

impl FromStr for Latency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| format!("Invalid latency: {s}"))
        };
        match s.split_once("..") {
            Some((lo, hi)) => Ok(Latency::range(parse(lo)?, parse(hi)?)),
            None => {
                let ms = parse(s)?;
                Ok(Latency::range(ms, ms))
            }
        }
    }
}

#[derive(Default)]
struct Inner {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    objects: RwLock<HashMap<String, StoredObject>>,
    latency: Latency,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore(Arc<Inner>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Latency) -> Self {
        MemoryStore(Arc::new(Inner {
            latency,
            ..Inner::default()
        }))
    }
}

impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.0.latency.wait().await;
        let collections = self.0.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.0.latency.wait().await;
        let collections = self.0.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        self.0.latency.wait().await;
        let mut collections = self.0.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        docs.insert(id.to_string(), doc);
        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError> {
        self.0.latency.wait().await;
        let mut collections = self.0.collections.write().await;
        match collections.get_mut(collection).and_then(|docs| docs.get_mut(id)) {
            Some(slot) => {
                *slot = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.0.latency.wait().await;
        let mut collections = self.0.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn put_object(&self, path: &str, object: StoredObject) -> Result<(), StoreError> {
        self.0.latency.wait().await;
        self.0.objects.write().await.insert(path.to_string(), object);
        Ok(())
    }

    async fn get_object(&self, path: &str) -> Result<Option<StoredObject>, StoreError> {
        self.0.latency.wait().await;
        Ok(self.0.objects.read().await.get(path).cloned())
    }

    async fn delete_object(&self, path: &str) -> Result<bool, StoreError> {
        self.0.latency.wait().await;
        Ok(self.0.objects.write().await.remove(path).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_latency() {
        assert_eq!("0".parse::<Latency>().unwrap(), Latency::default());
        assert_eq!("500..1000".parse::<Latency>().unwrap(), Latency::range(500, 1000));
        assert_eq!("1000..500".parse::<Latency>().unwrap(), Latency::range(500, 1000));
        assert!("fast".parse::<Latency>().is_err());
    }

    #[tokio::test]
    async fn mutations_are_visible_to_later_reads() {
        let store = MemoryStore::new();
        store.insert("guests", "g1", json!({"id": "g1"})).await.unwrap();
        store.insert("guests", "g2", json!({"id": "g2"})).await.unwrap();
        assert!(store
            .replace("guests", "g1", json!({"id": "g1", "name": "x"}))
            .await
            .unwrap());
        assert!(store.delete("guests", "g2").await.unwrap());
        let docs = store.list("guests").await.unwrap();
        assert_eq!(docs, vec![json!({"id": "g1", "name": "x"})]);
        assert!(!store.replace("guests", "g2", json!({})).await.unwrap());
        assert!(!store.delete("rooms", "g1").await.unwrap());
    }

    #[tokio::test]
    async fn objects_round_trip() {
        let store = MemoryStore::new();
        let object = StoredObject {
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };
        store.put_object("rooms/r1/a.png", object.clone()).await.unwrap();
        assert_eq!(store.get_object("rooms/r1/a.png").await.unwrap(), Some(object));
        assert!(store.delete_object("rooms/r1/a.png").await.unwrap());
        assert_eq!(store.get_object("rooms/r1/a.png").await.unwrap(), None);
    }

    #[tokio::test]
    async fn latency_delays_calls() {
        let store = MemoryStore::with_latency(Latency::range(50, 50));
        let started = time::Instant::now();
        store.list("rooms").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
