//! Heuristic memory record types.

use serde::{Deserialize, Serialize};

/// Kind of insight a heuristic memory captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptType {
    /// A recurring code or design pattern observed in the codebase.
    Pattern,
    /// A rule the codebase follows (naming, layering, style).
    Rule,
    /// A hard constraint (platform, dependency, performance).
    Constraint,
    /// A recorded decision and its direction.
    Decision,
    /// Background context that explains the surroundings.
    Context,
    /// Something learned the hard way.
    Learning,
}

impl ConceptType {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Rule => "rule",
            Self::Constraint => "constraint",
            Self::Decision => "decision",
            Self::Context => "context",
            Self::Learning => "learning",
        }
    }
}

impl std::fmt::Display for ConceptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConceptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pattern" => Ok(Self::Pattern),
            "rule" => Ok(Self::Rule),
            "constraint" => Ok(Self::Constraint),
            "decision" => Ok(Self::Decision),
            "context" => Ok(Self::Context),
            "learning" => Ok(Self::Learning),
            _ => Err(format!("unknown concept type: {s}")),
        }
    }
}

/// Lifecycle state of a memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    /// Live and returned by listings.
    Current,
    /// Replaced by a newer version in its chain.
    Superseded,
    /// Soft-deleted; hidden until restored.
    Archived,
}

impl MemoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Superseded => "superseded",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for MemoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Self::Current),
            "superseded" => Ok(Self::Superseded),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("unknown memory status: {s}")),
        }
    }
}

/// A heuristic memory record, matching the `heuristic_memories` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeuristicMemory {
    /// UUID primary key.
    pub id: String,
    pub concept: ConceptType,
    pub content: String,
    /// Optional domain tag (e.g. `"indexing"`, `"auth"`).
    pub domain: Option<String>,
    /// Stored confidence in `[0.0, 1.0]`. See
    /// [`effective_confidence`](crate::effective_confidence) for the
    /// decay-adjusted value.
    pub confidence: f64,
    /// Repeatedly validated and never violated; exempt from decay.
    pub golden: bool,
    pub validated_count: u32,
    pub violated_count: u32,
    pub status: MemoryStatus,
    /// Owning project, or `None` for a global memory.
    pub project_id: Option<String>,
    /// Id of the record this one replaced.
    pub evolved_from: Option<String>,
    /// Id of the record that replaced this one.
    pub superseded_by: Option<String>,
    /// Unix seconds.
    pub created_at: i64,
    pub updated_at: i64,
    pub last_validated_at: Option<i64>,
}

/// Outcome of a supersede call. State problems are values, not errors, so
/// callers branch without try/catch-style control flow.
#[derive(Debug)]
pub enum SupersedeOutcome {
    /// The chain was extended; `new` is the freshly created version.
    Superseded {
        old_id: String,
        new: HeuristicMemory,
    },
    /// No record with the given id.
    NotFound,
    /// The record is not `current` (already superseded, or archived); its
    /// supersede link is never overwritten.
    InvalidState { status: MemoryStatus },
}

impl SupersedeOutcome {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }
}

/// Outcome of a restore call.
#[derive(Debug)]
pub enum RestoreOutcome {
    Restored(HeuristicMemory),
    /// No record with the given id.
    NotFound,
    /// Only archived records can be restored.
    NotArchived { status: MemoryStatus },
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored(_))
    }
}
