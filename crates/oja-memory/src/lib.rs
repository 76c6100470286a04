//! Memory for the oja shopping assistant
//!
//! # Memory kinds
//!
//! - **Episodic**: bounded shopping inquiries, with a single globally
//!   active episode at any time
//! - **Preference**: learned signals keyed by (category, feature, value),
//!   whose confidence strengthens asymptotically under repeated evidence
//! - **Heuristic**: seeded rules retrieved by applicability category
//!
//! [`MemoryService`] is the only interface the agent layer has to persisted
//! state; it enforces every invariant on the write path.

pub mod episode;
pub mod heuristic;
pub mod preference;
pub mod service;

pub use episode::{Episode, EpisodeId, EpisodeState, EpisodeStatus};
pub use heuristic::{Heuristic, HeuristicId};
pub use preference::{DEFAULT_CONFIDENCE, GLOBAL_CATEGORY, Preference, PreferenceType};
pub use service::MemoryService;
