//! One row of a gap analysis: how a source entity relates to a target entity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the two sides of a [`Correspondence`] relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Match,
    Rename,
    SourceOnly,
    TargetOnly,
}

impl Classification {
    /// Report text, e.g. `Not in LINZ` for a source-only row.
    pub fn label(&self, sides: &SideLabels) -> String {
        match self {
            Classification::Match => "Match".to_string(),
            Classification::Rename => "Rename".to_string(),
            Classification::SourceOnly => format!("Not in {}", sides.target),
            Classification::TargetOnly => format!("Not in {}", sides.source),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Classification::Match => "Match",
            Classification::Rename => "Rename",
            Classification::SourceOnly => "SourceOnly",
            Classification::TargetOnly => "TargetOnly",
        };
        f.write_str(s)
    }
}

/// Display names of the two schemas ("CCC" / "LINZ").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLabels {
    pub source: String,
    pub target: String,
}

impl SideLabels {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Placeholder for an absent source-side cell, e.g. `Attribute Not in CCC.`
    pub fn not_in_source(&self, kind: &str) -> String {
        format!("{kind} Not in {}.", self.source)
    }

    /// Placeholder for an absent target-side cell.
    pub fn not_in_target(&self, kind: &str) -> String {
        format!("{kind} Not in {}.", self.target)
    }
}

impl Default for SideLabels {
    fn default() -> Self {
        Self::new("Source", "Target")
    }
}

/// A compared pair. At least one side is always present and the
/// classification is derived from the pair at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correspondence {
    source: Option<String>,
    target: Option<String>,
    classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<f64>,
}

impl Correspondence {
    /// Both sides present: `Match` when equal, `Rename` otherwise.
    pub fn paired(source: impl Into<String>, target: impl Into<String>) -> Self {
        let (source, target) = (source.into(), target.into());
        let classification = if source == target {
            Classification::Match
        } else {
            Classification::Rename
        };
        Self {
            source: Some(source),
            target: Some(target),
            classification,
            similarity: None,
        }
    }

    pub fn source_only(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: None,
            classification: Classification::SourceOnly,
            similarity: None,
        }
    }

    pub fn target_only(target: impl Into<String>) -> Self {
        Self {
            source: None,
            target: Some(target.into()),
            classification: Classification::TargetOnly,
            similarity: None,
        }
    }

    /// `None` when both sides are absent.
    pub fn from_options(source: Option<String>, target: Option<String>) -> Option<Self> {
        match (source, target) {
            (Some(s), Some(t)) => Some(Self::paired(s, t)),
            (Some(s), None) => Some(Self::source_only(s)),
            (None, Some(t)) => Some(Self::target_only(t)),
            (None, None) => None,
        }
    }

    /// Attach an auto-mapping score (clamped to `[0, 1]`).
    pub fn with_similarity(mut self, score: f64) -> Self {
        self.similarity = Some(score.clamp(0.0, 1.0));
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn similarity(&self) -> Option<f64> {
        self.similarity
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }
}
