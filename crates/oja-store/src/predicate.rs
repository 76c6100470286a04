//! Composable document predicates
//!
//! Queries against the store are boolean combinations of field-equality
//! tests. Paths are dot-separated and descend nested objects, so
//! `"status.state"` reaches into the status block of an episode document.

/// A predicate over JSON documents
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field at `path` equals `value`
    Eq {
        path: String,
        value: serde_json::Value,
    },

    /// Every branch matches
    And(Vec<Predicate>),

    /// At least one branch matches
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Equality test against a dot-separated field path
    pub fn eq(path: &str, value: impl Into<serde_json::Value>) -> Self {
        Predicate::Eq {
            path: path.to_string(),
            value: value.into(),
        }
    }

    /// Combine with AND, flattening nested conjunctions
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut branches) => {
                branches.push(other);
                Predicate::And(branches)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    /// Combine with OR, flattening nested disjunctions
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut branches) => {
                branches.push(other);
                Predicate::Or(branches)
            }
            first => Predicate::Or(vec![first, other]),
        }
    }

    /// Evaluate against a document
    pub fn matches(&self, doc: &serde_json::Value) -> bool {
        match self {
            Predicate::Eq { path, value } => resolve_path(doc, path) == Some(value),
            Predicate::And(branches) => branches.iter().all(|p| p.matches(doc)),
            Predicate::Or(branches) => branches.iter().any(|p| p.matches(doc)),
        }
    }
}

/// Walk a dot-separated path through nested objects
fn resolve_path<'a>(doc: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
