//! Document store adapter
//!
//! Collection-scoped persistence for JSON documents, backed by RocksDB in
//! production and an in-memory table for tests. The adapter owns
//! durability only; every semantic rule lives in the memory service.

use crate::config::StoreConfig;
use crate::predicate::Predicate;
use async_trait::async_trait;
use oja_core::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Collection names used by the memory service
pub mod collection {
    /// Shopping episodes
    pub const EPISODES: &str = "episodes";

    /// Learned preferences
    pub const PREFERENCES: &str = "preferences";

    /// Seeded heuristics
    pub const HEURISTICS: &str = "heuristics";
}

/// Collections provisioned when a store is opened
const COLLECTIONS: [&str; 3] = [
    collection::EPISODES,
    collection::PREFERENCES,
    collection::HEURISTICS,
];

/// Trait for document store backends
///
/// Documents are JSON objects addressed by a collection name and a
/// caller-supplied id. Reads filter with [`Predicate`]s; the store never
/// interprets document contents beyond predicate evaluation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document under the given id
    async fn insert(&self, collection: &str, id: &str, doc: serde_json::Value) -> Result<()>;

    /// Get the first document matching the predicate, if any
    async fn get(&self, collection: &str, predicate: &Predicate)
        -> Result<Option<serde_json::Value>>;

    /// Get all documents matching the predicate
    async fn find(&self, collection: &str, predicate: &Predicate)
        -> Result<Vec<serde_json::Value>>;

    /// Shallow-merge a JSON object patch into every matching document
    ///
    /// Top-level keys of `patch` replace the corresponding keys of each
    /// match. Returns the number of documents updated.
    async fn update(
        &self,
        collection: &str,
        predicate: &Predicate,
        patch: serde_json::Value,
    ) -> Result<usize>;

    /// Replace the document stored under `id`
    ///
    /// Returns false (without writing) if no document has that id.
    async fn replace(&self, collection: &str, id: &str, doc: serde_json::Value) -> Result<bool>;

    /// Flush any pending writes to disk
    async fn flush(&self) -> Result<()>;

    /// Close the store (for clean shutdown)
    async fn close(&self) -> Result<()>;
}

/// Merge the top-level keys of an object patch into a document
fn apply_patch(doc: &mut serde_json::Value, patch: &serde_json::Map<String, serde_json::Value>) {
    if let Some(fields) = doc.as_object_mut() {
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
    }
}

/// Reject patches that are not JSON objects before touching the store
fn patch_object(patch: &serde_json::Value) -> Result<&serde_json::Map<String, serde_json::Value>> {
    patch
        .as_object()
        .ok_or_else(|| Error::Validation("update patch must be a JSON object".to_string()))
}

/// RocksDB-backed document store
///
/// One column family per collection, document id as the key, JSON bytes as
/// the value. Dates inside documents stay ISO-8601 strings so older
/// documents remain readable as fields are added.
pub struct RocksDbStore {
    db: Arc<rocksdb::DB>,
    config: StoreConfig,
}

impl RocksDbStore {
    /// Open or create a RocksDB-backed document store
    pub fn open(config: StoreConfig) -> Result<Self> {
        info!("Opening document store at {}", config.path);

        let mut db_opts = rocksdb::Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_write_buffer_size(config.write_buffer_size);

        if config.enable_wal {
            db_opts.set_wal_dir(&config.path);
        } else {
            db_opts.set_manual_wal_flush(true);
        }

        if config.enable_compression {
            db_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        }

        let cf_descriptors: Vec<rocksdb::ColumnFamilyDescriptor> = COLLECTIONS
            .iter()
            .map(|name| {
                let mut cf_opts = rocksdb::Options::default();
                if config.enable_compression {
                    cf_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
                }
                rocksdb::ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = rocksdb::DB::open_cf_descriptors(&db_opts, &config.path, cf_descriptors)
            .map_err(|e| Error::Storage(format!("Failed to open document store: {}", e)))?;

        info!("Document store opened successfully");

        Ok(Self {
            db: Arc::new(db),
            config,
        })
    }

    /// Get column family handle for a collection
    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    fn write_opts(&self) -> rocksdb::WriteOptions {
        let mut opts = rocksdb::WriteOptions::default();
        opts.set_sync(self.config.sync_writes);
        opts
    }

    fn encode(doc: &serde_json::Value) -> Result<Vec<u8>> {
        serde_json::to_vec(doc)
            .map_err(|e| Error::Serialization(format!("Failed to serialize document: {}", e)))
    }

    fn decode(bytes: &[u8]) -> Result<serde_json::Value> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::Deserialization(format!("Failed to deserialize document: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for RocksDbStore {
    async fn insert(&self, collection: &str, id: &str, doc: serde_json::Value) -> Result<()> {
        let cf = self.cf(collection)?;
        let value = Self::encode(&doc)?;

        self.db
            .put_cf_opt(cf, id.as_bytes(), &value, &self.write_opts())
            .map_err(|e| Error::Storage(format!("Failed to insert document: {}", e)))?;

        debug!("Inserted document {} into {}", id, collection);
        Ok(())
    }

    async fn get(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<Option<serde_json::Value>> {
        let cf = self.cf(collection)?;

        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_, value) = item.map_err(|e| Error::Storage(e.to_string()))?;
            let doc = Self::decode(&value)?;
            if predicate.matches(&doc) {
                return Ok(Some(doc));
            }
        }

        Ok(None)
    }

    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<Vec<serde_json::Value>> {
        let cf = self.cf(collection)?;
        let mut docs = Vec::new();

        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_, value) = item.map_err(|e| Error::Storage(e.to_string()))?;
            let doc = Self::decode(&value)?;
            if predicate.matches(&doc) {
                docs.push(doc);
            }
        }

        Ok(docs)
    }

    async fn update(
        &self,
        collection: &str,
        predicate: &Predicate,
        patch: serde_json::Value,
    ) -> Result<usize> {
        let fields = patch_object(&patch)?;
        let cf = self.cf(collection)?;

        let mut batch = rocksdb::WriteBatch::default();
        let mut count = 0;

        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (key, value) = item.map_err(|e| Error::Storage(e.to_string()))?;
            let mut doc = Self::decode(&value)?;

            if predicate.matches(&doc) {
                apply_patch(&mut doc, fields);
                batch.put_cf(cf, &key, Self::encode(&doc)?);
                count += 1;
            }
        }

        if count > 0 {
            self.db
                .write_opt(batch, &self.write_opts())
                .map_err(|e| Error::Storage(format!("Failed to update documents: {}", e)))?;

            debug!("Updated {} document(s) in {}", count, collection);
        }

        Ok(count)
    }

    async fn replace(&self, collection: &str, id: &str, doc: serde_json::Value) -> Result<bool> {
        let cf = self.cf(collection)?;

        let exists = self
            .db
            .get_cf(cf, id.as_bytes())
            .map_err(|e| Error::Storage(format!("Failed to read document: {}", e)))?
            .is_some();
        if !exists {
            return Ok(false);
        }

        let value = Self::encode(&doc)?;
        self.db
            .put_cf_opt(cf, id.as_bytes(), &value, &self.write_opts())
            .map_err(|e| Error::Storage(format!("Failed to replace document: {}", e)))?;

        debug!("Replaced document {} in {}", id, collection);
        Ok(true)
    }

    async fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| Error::Storage(format!("Failed to flush: {}", e)))?;
        debug!("Document store flushed");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.flush().await?;
        info!("Document store closed");
        Ok(())
    }
}

/// In-memory store implementation for testing
///
/// Keeps each collection as an ordered list of (id, document) pairs, so
/// reads see documents in insertion order.
pub struct MemoryStore {
    collections: tokio::sync::RwLock<HashMap<String, Vec<(String, serde_json::Value)>>>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            collections: tokio::sync::RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, id: &str, doc: serde_json::Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push((id.to_string(), doc));
        Ok(())
    }

    async fn get(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<Option<serde_json::Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(_, doc)| predicate.matches(doc)))
            .map(|(_, doc)| doc.clone()))
    }

    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<Vec<serde_json::Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| predicate.matches(doc))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: &str,
        predicate: &Predicate,
        patch: serde_json::Value,
    ) -> Result<usize> {
        let fields = patch_object(&patch)?;
        let mut collections = self.collections.write().await;

        let mut count = 0;
        if let Some(docs) = collections.get_mut(collection) {
            for (_, doc) in docs.iter_mut() {
                if predicate.matches(doc) {
                    apply_patch(doc, fields);
                    count += 1;
                }
            }
        }

        Ok(count)
    }

    async fn replace(&self, collection: &str, id: &str, doc: serde_json::Value) -> Result<bool> {
        let mut collections = self.collections.write().await;

        if let Some(docs) = collections.get_mut(collection) {
            if let Some(slot) = docs.iter_mut().find(|(stored_id, _)| stored_id == id) {
                slot.1 = doc;
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
