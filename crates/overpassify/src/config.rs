//! Translation settings supplied by the caller

use serde::{Deserialize, Serialize};

use crate::ast::core::SetKind;

/// A stable single-element reference set.
///
/// OverpassQL cannot branch, so `if` statements and loop guards filter this
/// set by a condition and loop over the (zero or one element) result. Any
/// element that is known to exist works; its kind must be specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pivot {
    pub kind: SetKind,
    pub id: u64,
}

impl Pivot {
    pub fn new(kind: SetKind, id: u64) -> Self {
        Self { kind, id }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslateConfig {
    /// Needed by `if` statements and by loops containing `break`/`continue`
    pub pivot: Option<Pivot>,
}

impl TranslateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pivot(mut self, kind: SetKind, id: u64) -> Self {
        self.pivot = Some(Pivot::new(kind, id));
        self
    }

    /// Load from JSON, e.g. `{"pivot": {"kind": "relation", "id": 2186646}}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
