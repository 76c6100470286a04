//! Learned user preferences
//!
//! A preference is identified by its (category, feature, value) composite
//! key, never by a stored id. Repeated observations reinforce the stored
//! record instead of duplicating it: each reinforcement closes 10% of the
//! remaining confidence gap toward 1.0.

use chrono::{DateTime, Utc};
use oja_core::{Error, Result, Value};
use serde::{Deserialize, Serialize};

/// Category marking a preference as applicable everywhere
pub const GLOBAL_CATEGORY: &str = "global";

/// Default confidence for a freshly observed preference
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Fraction of the remaining confidence gap closed per reinforcement
const REINFORCEMENT_RATE: f64 = 0.1;

/// How a preference signal should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceType {
    #[default]
    Like,
    Dislike,
    MustHave,
    Dealbreaker,
}

/// A learned user signal scoped to a category, or global
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    /// Scoping category, or "global" for everywhere
    pub category: String,

    /// The specific attribute (e.g. "brand", "warranty_length")
    pub feature: String,

    /// The preferred value or range
    pub value: Value,

    #[serde(default)]
    pub preference_type: PreferenceType,

    /// How sure we are about this preference, within [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Times this exact (category, feature, value) has been observed
    #[serde(default = "default_evidence_count")]
    pub evidence_count: u32,

    pub last_updated: DateTime<Utc>,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

fn default_evidence_count() -> u32 {
    1
}

impl Preference {
    /// Create a preference with default type, confidence, and evidence
    pub fn new<V: Into<Value>>(category: &str, feature: &str, value: V) -> Self {
        Self {
            category: category.to_string(),
            feature: feature.to_string(),
            value: value.into(),
            preference_type: PreferenceType::default(),
            confidence: DEFAULT_CONFIDENCE,
            evidence_count: 1,
            last_updated: Utc::now(),
        }
    }

    /// Builder: set the signal type
    pub fn with_type(mut self, preference_type: PreferenceType) -> Self {
        self.preference_type = preference_type;
        self
    }

    /// Builder: override the starting confidence, failing fast when it
    /// falls outside [0, 1]
    pub fn with_confidence(mut self, confidence: f64) -> Result<Self> {
        self.confidence = confidence;
        self.validate()?;
        Ok(self)
    }

    /// Check field constraints before a write reaches the store
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::Validation(format!(
                "confidence must be within [0, 1], got {}",
                self.confidence
            )));
        }
        if self.evidence_count == 0 {
            return Err(Error::Validation(
                "evidence_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Record another observation of this exact preference
    ///
    /// Confidence approaches 1.0 asymptotically: it strictly increases but
    /// never crosses the ceiling.
    pub fn reinforce(&mut self) {
        self.evidence_count += 1;
        self.confidence =
            (self.confidence + (1.0 - self.confidence) * REINFORCEMENT_RATE).min(1.0);
        self.last_updated = Utc::now();
    }

    /// True for records applicable to every category
    pub fn is_global(&self) -> bool {
        self.category == GLOBAL_CATEGORY
    }
}
