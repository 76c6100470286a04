//! Document persistence for the oja memory service
//!
//! A thin adapter providing collection-scoped insert/search/update over
//! JSON documents, with query predicates built as boolean combinations of
//! field-equality tests. Durability lives here; semantics live in
//! `oja-memory`.

pub mod config;
pub mod predicate;
pub mod store;

pub use config::StoreConfig;
pub use predicate::Predicate;
pub use store::{DocumentStore, MemoryStore, RocksDbStore, collection};
