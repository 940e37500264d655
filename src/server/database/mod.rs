//! Document storage behind a single repository interface.
//!
//! Every entity is a JSON document in a named collection. The process picks
//! one backend at startup: the seeded in-memory store for local development or
//! the Postgres document table.

pub(crate) mod connection;
pub(crate) mod memory;
pub(crate) mod pool;
pub(crate) mod pool_config;
pub(crate) mod postgres;
pub(crate) mod seed;

use std::marker::PhantomData;

use derive_more::{Display, Error};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::server::database::memory::MemoryStore;
use crate::server::database::postgres::PgStore;

#[derive(Debug, Display, Error)]
pub(crate) enum StoreError {
    #[display("{collection}/{id} not found")]
    NotFound { collection: String, id: String },
    #[display("{collection}/{id} already exists")]
    Duplicate { collection: String, id: String },
    #[display("backend error: {message}")]
    Backend { message: String },
    #[display("malformed document in {collection}: {message}")]
    Decode { collection: String, message: String },
    #[display("no connection available")]
    Busy,
    #[display("timed out waiting for the backend")]
    Timeout,
}

impl StoreError {
    pub fn backend(e: impl std::fmt::Display) -> Self {
        StoreError::Backend {
            message: e.to_string(),
        }
    }
}

/// Binary payload kept next to the documents (room images).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Operations every backend provides.
pub(crate) trait DocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;
    /// Fails with `Duplicate` when the id is taken.
    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;
    /// Returns false when there is nothing to replace.
    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError>;
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
    async fn put_object(&self, path: &str, object: StoredObject) -> Result<(), StoreError>;
    async fn get_object(&self, path: &str) -> Result<Option<StoredObject>, StoreError>;
    async fn delete_object(&self, path: &str) -> Result<bool, StoreError>;
}

/// The backend chosen once at startup.
#[derive(Clone)]
pub(crate) enum Store {
    Memory(MemoryStore),
    Postgres(PgStore),
}

impl Store {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::Postgres(_) => "postgres",
        }
    }
}

impl DocumentStore for Store {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        match self {
            Store::Memory(s) => s.list(collection).await,
            Store::Postgres(s) => s.list(collection).await,
        }
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        match self {
            Store::Memory(s) => s.get(collection, id).await,
            Store::Postgres(s) => s.get(collection, id).await,
        }
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.insert(collection, id, doc).await,
            Store::Postgres(s) => s.insert(collection, id, doc).await,
        }
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError> {
        match self {
            Store::Memory(s) => s.replace(collection, id, doc).await,
            Store::Postgres(s) => s.replace(collection, id, doc).await,
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        match self {
            Store::Memory(s) => s.delete(collection, id).await,
            Store::Postgres(s) => s.delete(collection, id).await,
        }
    }

    async fn put_object(&self, path: &str, object: StoredObject) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.put_object(path, object).await,
            Store::Postgres(s) => s.put_object(path, object).await,
        }
    }

    async fn get_object(&self, path: &str) -> Result<Option<StoredObject>, StoreError> {
        match self {
            Store::Memory(s) => s.get_object(path).await,
            Store::Postgres(s) => s.get_object(path).await,
        }
    }

    async fn delete_object(&self, path: &str) -> Result<bool, StoreError> {
        match self {
            Store::Memory(s) => s.delete_object(path).await,
            Store::Postgres(s) => s.delete_object(path).await,
        }
    }
}

/// An entity stored as one document of a collection.
pub(crate) trait Document: Serialize + DeserializeOwned + Clone {
    const COLLECTION: &'static str;
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

/// Implements [`Document`] for a struct with a `pub id: String` field.
macro_rules! impl_document {
    ($ty:ty, $collection:literal, $prefix:literal) => {
        impl $crate::server::database::Document for $ty {
            const COLLECTION: &'static str = $collection;
            const ID_PREFIX: &'static str = $prefix;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}
pub(crate) use impl_document;

pub(crate) fn new_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{prefix}_{suffix}")
}

/// Typed CRUD over one collection.
pub(crate) struct Repository<T> {
    store: Store,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            marker: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            marker: PhantomData,
        }
    }

    fn decode(value: Value) -> Result<T, StoreError> {
        serde_json::from_value(value).map_err(|e| StoreError::Decode {
            collection: T::COLLECTION.to_string(),
            message: e.to_string(),
        })
    }

    fn encode(doc: &T) -> Result<Value, StoreError> {
        serde_json::to_value(doc).map_err(|e| StoreError::Decode {
            collection: T::COLLECTION.to_string(),
            message: e.to_string(),
        })
    }

    pub async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        self.store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Fetch or fail with `NotFound`.
    pub async fn get(&self, id: &str) -> Result<T, StoreError> {
        self.find_by_id(id).await?.ok_or_else(|| StoreError::NotFound {
            collection: T::COLLECTION.to_string(),
            id: id.to_string(),
        })
    }

    /// Insert the document, assigning a fresh id when it has none.
    pub async fn create(&self, mut doc: T) -> Result<T, StoreError> {
        if doc.id().is_empty() {
            doc.set_id(new_id(T::ID_PREFIX));
        }
        self.store
            .insert(T::COLLECTION, doc.id(), Self::encode(&doc)?)
            .await?;
        Ok(doc)
    }

    pub async fn update(&self, doc: &T) -> Result<(), StoreError> {
        if self
            .store
            .replace(T::COLLECTION, doc.id(), Self::encode(doc)?)
            .await?
        {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                collection: T::COLLECTION.to_string(),
                id: doc.id().to_string(),
            })
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if self.store.delete(T::COLLECTION, id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                collection: T::COLLECTION.to_string(),
                id: id.to_string(),
            })
        }
    }
}
