//! Shopping episodes
//!
//! An episode is one bounded shopping inquiry: the category and query that
//! started it, plus the constraints and products accumulated while it runs.
//! At most one episode holds the active slot at any time; the service
//! enforces that invariant on the write path.

use chrono::{DateTime, Utc};
use oja_core::{Value, ValueMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Episode identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeId(Uuid);

impl EpisodeId {
    /// Create a new episode ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get as UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EpisodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeState {
    /// The single episode currently in focus for the conversation
    Active,
    /// Parked when another episode took the active slot
    Paused,
    /// The inquiry concluded
    Completed,
    /// The user walked away
    Abandoned,
}

impl EpisodeState {
    /// Completed and abandoned episodes never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, EpisodeState::Completed | EpisodeState::Abandoned)
    }
}

/// Current state plus why it last changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStatus {
    pub state: EpisodeState,

    #[serde(default)]
    pub last_transition_reason: Option<String>,
}

impl Default for EpisodeStatus {
    fn default() -> Self {
        Self {
            state: EpisodeState::Active,
            last_transition_reason: None,
        }
    }
}

/// One bounded shopping inquiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Unique identifier
    pub id: EpisodeId,

    /// Lifecycle state and last transition reason
    #[serde(default)]
    pub status: EpisodeStatus,

    /// Product category this inquiry is about (e.g. "Monitors")
    pub category: String,

    /// The user utterance that started the episode; immutable after creation
    pub initial_query: String,

    /// Constraints parsed from the conversation (budget, brand, specs)
    #[serde(default)]
    pub extracted_constraints: ValueMap,

    /// Products explored in this episode, in exploration order
    #[serde(default)]
    pub product_ids: Vec<i64>,

    /// Weak reference to a generated comparison, if one exists
    #[serde(default)]
    pub comparison_id: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Stamped by the service on every update
    pub updated_at: DateTime<Utc>,

    pub last_interaction_at: DateTime<Utc>,
}

impl Episode {
    /// Create a new active episode with fresh timestamps
    pub fn new(category: &str, initial_query: &str) -> Self {
        let now = Utc::now();
        Self {
            id: EpisodeId::new(),
            status: EpisodeStatus::default(),
            category: category.to_string(),
            initial_query: initial_query.to_string(),
            extracted_constraints: ValueMap::new(),
            product_ids: Vec::new(),
            comparison_id: None,
            created_at: now,
            updated_at: now,
            last_interaction_at: now,
        }
    }

    /// Check if this episode holds the active slot
    pub fn is_active(&self) -> bool {
        self.status.state == EpisodeState::Active
    }

    /// Move to a new state, recording why
    pub fn transition(&mut self, state: EpisodeState, reason: Option<&str>) {
        self.status.state = state;
        self.status.last_transition_reason = reason.map(str::to_string);
    }

    /// Park this episode without ending it
    pub fn pause(&mut self, reason: &str) {
        self.transition(EpisodeState::Paused, Some(reason));
    }

    /// Close out a finished inquiry
    pub fn complete(&mut self, reason: Option<&str>) {
        self.transition(EpisodeState::Completed, reason);
    }

    /// Close out an inquiry the user walked away from
    pub fn abandon(&mut self, reason: Option<&str>) {
        self.transition(EpisodeState::Abandoned, reason);
    }

    /// Record a parsed constraint
    pub fn set_constraint<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.extracted_constraints.insert(key.into(), value.into());
    }

    /// Get a constraint by name
    pub fn get_constraint(&self, key: &str) -> Option<&Value> {
        self.extracted_constraints.get(key)
    }

    /// Record a product explored in this episode
    pub fn record_product(&mut self, product_id: i64) {
        self.product_ids.push(product_id);
    }

    /// Mark user activity on this episode
    pub fn touch(&mut self) {
        self.last_interaction_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_episode_is_active() {
        let episode = Episode::new("Monitors", "Looking for a 27 inch monitor");

        assert!(episode.is_active());
        assert_eq!(episode.category, "Monitors");
        assert!(episode.status.last_transition_reason.is_none());
        assert!(episode.extracted_constraints.is_empty());
        assert!(episode.product_ids.is_empty());
        assert_eq!(episode.created_at, episode.updated_at);
    }

    #[test]
    fn test_transitions() {
        let mut episode = Episode::new("Monitors", "27 inch monitor");

        episode.pause("New episode started");
        assert_eq!(episode.status.state, EpisodeState::Paused);
        assert_eq!(
            episode.status.last_transition_reason.as_deref(),
            Some("New episode started")
        );
        assert!(!episode.status.state.is_terminal());

        episode.complete(Some("Purchase made"));
        assert!(episode.status.state.is_terminal());
    }

    #[test]
    fn test_abandon_is_terminal() {
        let mut episode = Episode::new("Inverters", "3kVA inverter");
        episode.abandon(None);

        assert_eq!(episode.status.state, EpisodeState::Abandoned);
        assert!(episode.status.state.is_terminal());
        assert!(episode.status.last_transition_reason.is_none());
    }

    #[test]
    fn test_constraints_and_products() {
        let mut episode = Episode::new("Monitors", "27 inch monitor");

        episode.set_constraint("budget", 250_000);
        episode.set_constraint("brand", "LG");
        episode.record_product(42);
        episode.record_product(7);

        assert_eq!(episode.get_constraint("budget").and_then(Value::as_integer), Some(250_000));
        assert_eq!(episode.get_constraint("brand").and_then(Value::as_str), Some("LG"));
        assert_eq!(episode.product_ids, vec![42, 7]);
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let episode = Episode::new("Monitors", "27 inch monitor");
        let doc = serde_json::to_value(&episode).unwrap();

        assert_eq!(doc["status"]["state"], "active");
        assert!(doc["created_at"].is_string());
    }

    #[test]
    fn test_older_documents_load_with_defaults() {
        // A document written before constraints/products/comparison existed
        let doc = serde_json::json!({
            "id": "0b2f7b3a-53c0-4e6a-9f4e-2a1f6a8a9d01",
            "category": "Monitors",
            "initial_query": "27 inch monitor",
            "created_at": "2026-01-05T10:00:00Z",
            "updated_at": "2026-01-05T10:00:00Z",
            "last_interaction_at": "2026-01-05T10:00:00Z"
        });

        let episode: Episode = serde_json::from_value(doc).unwrap();
        assert!(episode.is_active());
        assert!(episode.extracted_constraints.is_empty());
        assert!(episode.product_ids.is_empty());
        assert!(episode.comparison_id.is_none());
    }
}
