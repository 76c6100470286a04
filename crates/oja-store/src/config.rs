//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the storage directory
    pub path: String,

    /// Enable write-ahead logging for durability
    pub enable_wal: bool,

    /// Sync writes to disk immediately (slower but more durable)
    pub sync_writes: bool,

    /// Maximum write buffer size in bytes
    pub write_buffer_size: usize,

    /// Enable compression for stored documents
    pub enable_compression: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "data/memory".to_string(),
            enable_wal: true,
            sync_writes: false,
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            enable_compression: true,
        }
    }
}

impl StoreConfig {
    /// Create a configuration for the given storage directory
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Default::default()
        }
    }

    /// Create config for testing with a temporary directory
    pub fn for_testing(path: &Path) -> Self {
        Self {
            path: path.to_string_lossy().to_string(),
            enable_wal: true,
            sync_writes: false,
            write_buffer_size: 4 * 1024 * 1024, // 4MB for tests
            enable_compression: false,
        }
    }

    /// Builder: sync every write to disk
    pub fn sync_writes(mut self) -> Self {
        self.sync_writes = true;
        self
    }
}
