//! Seeded heuristics
//!
//! Static rules with an applicability map and an instruction for how the
//! agent should weigh them. Inserted once, never mutated. Retrieval filters
//! on the applicability category exactly; there is no global fallback.

use oja_core::{Value, ValueMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Heuristic identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeuristicId(Uuid);

impl HeuristicId {
    /// Create a new heuristic ID
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

impl Default for HeuristicId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HeuristicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A seeded rule the agent can weigh when ranking options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heuristic {
    /// Unique identifier
    pub id: HeuristicId,

    /// Short name (e.g. "Lagos Delivery Premium")
    pub name: String,

    /// Natural-language description of the rule
    pub rule: String,

    /// When to apply this (e.g. {"category": "electronics"})
    pub applicability: ValueMap,

    /// Instruction for how the agent should weight the rule
    pub logic_hint: String,
}

impl Heuristic {
    /// Create a heuristic with an explicit applicability map
    pub fn new(name: &str, rule: &str, applicability: ValueMap, logic_hint: &str) -> Self {
        Self {
            id: HeuristicId::new(),
            name: name.to_string(),
            rule: rule.to_string(),
            applicability,
            logic_hint: logic_hint.to_string(),
        }
    }

    /// Create a heuristic applicable to a single category
    pub fn for_category(name: &str, rule: &str, category: &str, logic_hint: &str) -> Self {
        let mut applicability = ValueMap::new();
        applicability.insert("category".to_string(), Value::from(category));
        Self::new(name, rule, applicability, logic_hint)
    }

    /// True when the applicability map names exactly this category
    pub fn applies_to(&self, category: &str) -> bool {
        self.applicability.get("category").and_then(Value::as_str) == Some(category)
    }
}
