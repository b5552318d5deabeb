//! # Engram Memory
//!
//! The self-revising heuristic knowledge store: confidence-scored
//! natural-language insights about a codebase that strengthen when
//! validated, weaken when violated, decay when idle, and form explicit
//! version chains when superseded.
//!
//! Repository operations that can hit a missing or wrongly-stated record
//! (supersede, restore) report outcomes as values, so callers branch
//! without exception-style control flow.
//!
//! [`classify_query_intent`] is the companion rule set that flags
//! history-seeking queries ("why did this change?") so the host can show a
//! supersede chain instead of plain results.

mod confidence;
mod error;
mod intent;
mod repository;
mod types;

pub use confidence::{effective_confidence, CONFIDENCE_DEFAULT, DECAY_HALF_LIFE_DAYS};
pub use error::{MemoryError, Result};
pub use intent::{classify_query_intent, QueryIntent};
pub use repository::{MemoryFilter, MemoryRepository, NewMemory};
pub use types::{
    ConceptType, HeuristicMemory, MemoryStatus, RestoreOutcome, SupersedeOutcome,
};
