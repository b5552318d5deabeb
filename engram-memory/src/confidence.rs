//! Confidence scoring: clamping and time decay.

use crate::types::HeuristicMemory;

/// Confidence assigned to a freshly added memory.
pub const CONFIDENCE_DEFAULT: f64 = 0.5;

/// Half-life of an idle memory's confidence.
pub const DECAY_HALF_LIFE_DAYS: f64 = 30.0;

const SECS_PER_DAY: f64 = 86_400.0;

/// Clamp a confidence score into `[0.0, 1.0]`.
pub(crate) fn clamp(confidence: f64) -> f64 {
    confidence.clamp(0.0, 1.0)
}

/// The decay-adjusted confidence of a memory at `now` (unix seconds).
///
/// Golden memories are exempt and return their stored confidence. Everything
/// else halves every [`DECAY_HALF_LIFE_DAYS`] since the last validation, or
/// since creation if never validated. Derived on read; the stored value is
/// untouched.
pub fn effective_confidence(memory: &HeuristicMemory, now: i64) -> f64 {
    if memory.golden {
        return memory.confidence;
    }

    let anchor = memory.last_validated_at.unwrap_or(memory.created_at);
    let idle_days = (now - anchor).max(0) as f64 / SECS_PER_DAY;
    memory.confidence * 0.5_f64.powf(idle_days / DECAY_HALF_LIFE_DAYS)
}
