//! oja - memory backend for a personal shopping assistant
//!
//! This is the main library crate that re-exports all oja components.

pub use oja_core as core;
pub use oja_memory as memory;
pub use oja_store as store;

// Re-export commonly used types
pub use oja_core::{Error, ErrorEnvelope, Result, Value, ValueMap};

pub use oja_memory::{
    Episode, EpisodeId, EpisodeState, EpisodeStatus, Heuristic, HeuristicId, MemoryService,
    Preference, PreferenceType,
};

pub use oja_store::{DocumentStore, MemoryStore, Predicate, RocksDbStore, StoreConfig, collection};
