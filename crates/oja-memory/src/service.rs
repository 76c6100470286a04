//! Memory service
//!
//! Orchestration and invariant enforcement over the episodes, preferences,
//! and heuristics collections. The store owns durability only; the
//! single-active-episode invariant, preference reinforcement, and scoping
//! rules all live here on the write path.

use crate::episode::{Episode, EpisodeId};
use crate::heuristic::Heuristic;
use crate::preference::{GLOBAL_CATEGORY, Preference};
use chrono::Utc;
use oja_core::{Error, Result};
use oja_store::{
    DocumentStore, MemoryStore, Predicate, RocksDbStore, StoreConfig, collection,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Reason recorded on episodes paused because a new episode took the slot
const PAUSE_REASON: &str = "New episode started";

/// Memory service for the shopping assistant
///
/// The only interface the agent layer has to persisted state. Lookups that
/// find nothing return `None` or an empty vec, never an error.
pub struct MemoryService {
    store: Arc<dyn DocumentStore>,

    /// Serializes pause-then-create so two episodes cannot both end up active
    episode_gate: Mutex<()>,

    /// Serializes lookup-then-patch so concurrent reinforcements of one
    /// composite key cannot lose updates
    preference_gate: Mutex<()>,
}

impl MemoryService {
    /// Create a service over an already open store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            episode_gate: Mutex::new(()),
            preference_gate: Mutex::new(()),
        }
    }

    /// Open a RocksDB-backed service
    pub fn open(config: StoreConfig) -> Result<Self> {
        let store = RocksDbStore::open(config)?;
        info!("Memory service ready");
        Ok(Self::new(Arc::new(store)))
    }

    /// Service over an in-memory store, for tests and ephemeral sessions
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Flush and close the underlying store
    pub async fn close(&self) -> Result<()> {
        self.store.close().await
    }

    // ========== Episodic Memory ==========

    /// The single active episode, optionally filtered by category
    pub async fn get_active_episode(&self, category: Option<&str>) -> Result<Option<Episode>> {
        let mut predicate = Predicate::eq("status.state", "active");
        if let Some(category) = category {
            predicate = predicate.and(Predicate::eq("category", category));
        }

        match self.store.get(collection::EPISODES, &predicate).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Create a new episode, pausing whatever currently holds the active slot
    ///
    /// The pause must complete before the new record becomes visible as
    /// active; the episode gate serializes the whole sequence.
    pub async fn create_episode(&self, category: &str, initial_query: &str) -> Result<Episode> {
        let _guard = self.episode_gate.lock().await;
        self.pause_active_locked().await?;

        let episode = Episode::new(category, initial_query);
        self.store
            .insert(collection::EPISODES, &episode.id.to_string(), encode(&episode)?)
            .await?;

        info!("Created episode {} in category '{}'", episode.id, episode.category);
        Ok(episode)
    }

    /// All episodes in a category, regardless of state
    pub async fn get_episodes_by_category(&self, category: &str) -> Result<Vec<Episode>> {
        let docs = self
            .store
            .find(collection::EPISODES, &Predicate::eq("category", category))
            .await?;
        docs.into_iter().map(decode).collect()
    }

    /// Retrieve an episode by its unique ID
    pub async fn get_episode_by_id(&self, id: EpisodeId) -> Result<Option<Episode>> {
        let predicate = Predicate::eq("id", id.to_string());
        match self.store.get(collection::EPISODES, &predicate).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Pause every active episode
    ///
    /// Idempotent: the predicate matches only the active state, so paused
    /// and settled episodes are untouched. Returns the number paused.
    pub async fn pause_all_active_episodes(&self) -> Result<usize> {
        let _guard = self.episode_gate.lock().await;
        self.pause_active_locked().await
    }

    async fn pause_active_locked(&self) -> Result<usize> {
        let patch = serde_json::json!({
            "status": {
                "state": "paused",
                "last_transition_reason": PAUSE_REASON,
            }
        });

        let paused = self
            .store
            .update(
                collection::EPISODES,
                &Predicate::eq("status.state", "active"),
                patch,
            )
            .await?;

        if paused > 0 {
            debug!("Paused {} active episode(s)", paused);
        }
        Ok(paused)
    }

    /// Persist caller-side episode edits
    ///
    /// Full-document replace keyed by id. `updated_at` is stamped here,
    /// overwriting whatever the caller set; no other merging happens. The
    /// caller is responsible for every other mutated field, including state
    /// transitions to completed or abandoned.
    pub async fn update_episode(&self, episode: &mut Episode) -> Result<()> {
        episode.updated_at = Utc::now();

        let replaced = self
            .store
            .replace(collection::EPISODES, &episode.id.to_string(), encode(episode)?)
            .await?;

        if replaced {
            debug!("Updated episode {}", episode.id);
        } else {
            warn!("Episode {} is not stored; update dropped", episode.id);
        }
        Ok(())
    }

    // ========== Preference Memory ==========

    /// Insert a preference, or reinforce the stored record with the same
    /// (category, feature, value) composite key
    ///
    /// Reinforcement bumps evidence, confidence, and the timestamp only;
    /// the incoming observation's type and other fields are not merged.
    /// Returns the stored state after the write.
    pub async fn upsert_preference(&self, pref: &Preference) -> Result<Preference> {
        pref.validate()?;
        let key = composite_key(pref)?;

        let _guard = self.preference_gate.lock().await;

        match self.store.get(collection::PREFERENCES, &key).await? {
            Some(doc) => {
                let mut stored: Preference = decode(doc)?;
                stored.reinforce();

                let patch = serde_json::json!({
                    "evidence_count": stored.evidence_count,
                    "confidence": stored.confidence,
                    "last_updated": stored.last_updated,
                });
                self.store.update(collection::PREFERENCES, &key, patch).await?;

                debug!(
                    "Reinforced preference {}/{} (evidence {})",
                    stored.category, stored.feature, stored.evidence_count
                );
                Ok(stored)
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                self.store
                    .insert(collection::PREFERENCES, &id, encode(pref)?)
                    .await?;

                debug!("Stored new preference {}/{}", pref.category, pref.feature);
                Ok(pref.clone())
            }
        }
    }

    /// Preferences scoped to the category, plus every global record
    ///
    /// No dedup between the two groups: a category record and a global
    /// record for the same feature/value are distinct learned facts.
    pub async fn get_preferences(&self, category: &str) -> Result<Vec<Preference>> {
        let predicate =
            Predicate::eq("category", category).or(Predicate::eq("category", GLOBAL_CATEGORY));
        let docs = self.store.find(collection::PREFERENCES, &predicate).await?;
        docs.into_iter().map(decode).collect()
    }

    // ========== Heuristic Memory ==========

    /// Heuristics whose applicability names exactly this category
    ///
    /// Unlike preferences there is no global fallback here.
    pub async fn get_heuristics(&self, category: &str) -> Result<Vec<Heuristic>> {
        let docs = self
            .store
            .find(
                collection::HEURISTICS,
                &Predicate::eq("applicability.category", category),
            )
            .await?;
        docs.into_iter().map(decode).collect()
    }

    /// Seed a heuristic; inserts unconditionally, no dedup by name or rule
    pub async fn add_heuristic(&self, heuristic: &Heuristic) -> Result<()> {
        self.store
            .insert(collection::HEURISTICS, &heuristic.id.to_string(), encode(heuristic)?)
            .await?;

        debug!("Added heuristic '{}'", heuristic.name);
        Ok(())
    }
}

fn encode<T: Serialize>(record: &T) -> Result<serde_json::Value> {
    serde_json::to_value(record).map_err(|e| Error::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(doc: serde_json::Value) -> Result<T> {
    serde_json::from_value(doc).map_err(|e| Error::Deserialization(e.to_string()))
}

/// Predicate for the (category, feature, value) composite key
fn composite_key(pref: &Preference) -> Result<Predicate> {
    let value = serde_json::to_value(&pref.value).map_err(|e| Error::Serialization(e.to_string()))?;
    Ok(Predicate::eq("category", pref.category.as_str())
        .and(Predicate::eq("feature", pref.feature.as_str()))
        .and(Predicate::eq("value", value)))
}
