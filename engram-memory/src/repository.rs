use crate::confidence::{clamp, effective_confidence, CONFIDENCE_DEFAULT};
use crate::error::Result;
use crate::types::{
    ConceptType, HeuristicMemory, MemoryStatus, RestoreOutcome, SupersedeOutcome,
};
use engram_db::now_secs;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Confidence gained per validation.
const VALIDATE_STEP: f64 = 0.05;

/// Confidence lost per violation.
const VIOLATE_STEP: f64 = 0.1;

/// Promotion to golden requires at least this stored confidence.
const GOLDEN_MIN_CONFIDENCE: f64 = 0.9;

/// Promotion to golden requires at least this many validations.
const GOLDEN_MIN_VALIDATIONS: u32 = 3;

/// Fields supplied when adding a memory; everything else is defaulted.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub concept: ConceptType,
    pub content: String,
    pub domain: Option<String>,
    /// Owning project, or `None` for a global memory.
    pub project_id: Option<String>,
}

/// Listing filter. Unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilter {
    pub domain: Option<String>,
    pub concept: Option<ConceptType>,
    /// When set, memories scoped to this project plus global ones; when
    /// unset, all scopes.
    pub project_id: Option<String>,
}

/// The heuristic memory repository, backed by the shared catalog.
pub struct MemoryRepository {
    db: Arc<Mutex<Connection>>,
}

const MEMORY_COLUMNS: &str = "id, concept, content, domain, confidence, golden, \
     validated_count, violated_count, status, project_id, evolved_from, superseded_by, \
     created_at, updated_at, last_validated_at";

fn parse_failure(
    column: usize,
    err: String,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, err.into())
}

fn map_memory(row: &rusqlite::Row<'_>) -> rusqlite::Result<HeuristicMemory> {
    let concept: String = row.get(1)?;
    let status: String = row.get(8)?;

    Ok(HeuristicMemory {
        id: row.get(0)?,
        concept: concept.parse().map_err(|e| parse_failure(1, e))?,
        content: row.get(2)?,
        domain: row.get(3)?,
        confidence: row.get(4)?,
        golden: row.get(5)?,
        validated_count: row.get(6)?,
        violated_count: row.get(7)?,
        status: status.parse().map_err(|e| parse_failure(8, e))?,
        project_id: row.get(9)?,
        evolved_from: row.get(10)?,
        superseded_by: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
        last_validated_at: row.get(14)?,
    })
}

/// Fetch a row regardless of status. Chain walking and state checks need
/// archived rows too.
fn fetch_any(conn: &Connection, id: &str) -> rusqlite::Result<Option<HeuristicMemory>> {
    conn.query_row(
        &format!("SELECT {MEMORY_COLUMNS} FROM heuristic_memories WHERE id = ?1"),
        params![id],
        map_memory,
    )
    .optional()
}

fn insert_memory(conn: &Connection, memory: &HeuristicMemory) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO heuristic_memories \
         (id, concept, content, domain, confidence, golden, validated_count, violated_count, \
          status, project_id, evolved_from, superseded_by, created_at, updated_at, \
          last_validated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            memory.id,
            memory.concept.as_str(),
            memory.content,
            memory.domain,
            memory.confidence,
            memory.golden,
            memory.validated_count,
            memory.violated_count,
            memory.status.as_str(),
            memory.project_id,
            memory.evolved_from,
            memory.superseded_by,
            memory.created_at,
            memory.updated_at,
            memory.last_validated_at,
        ],
    )?;
    Ok(())
}

impl MemoryRepository {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// Add a new memory at default confidence, status `current`.
    pub async fn add(&self, new: NewMemory) -> Result<HeuristicMemory> {
        let now = now_secs();
        let memory = HeuristicMemory {
            id: uuid::Uuid::new_v4().to_string(),
            concept: new.concept,
            content: new.content,
            domain: new.domain,
            confidence: CONFIDENCE_DEFAULT,
            golden: false,
            validated_count: 0,
            violated_count: 0,
            status: MemoryStatus::Current,
            project_id: new.project_id,
            evolved_from: None,
            superseded_by: None,
            created_at: now,
            updated_at: now,
            last_validated_at: None,
        };

        let conn = self.db.lock().await;
        insert_memory(&conn, &memory)?;

        debug!("added memory {} ({})", memory.id, memory.concept);
        Ok(memory)
    }

    /// Fetch a memory by id. Archived records are hidden until restored.
    pub async fn get(&self, id: &str) -> Result<Option<HeuristicMemory>> {
        let conn = self.db.lock().await;
        let memory = fetch_any(&conn, id)?;
        Ok(memory.filter(|m| m.status != MemoryStatus::Archived))
    }

    /// Record a validation: confidence +0.05 (capped at 1.0), and golden
    /// promotion once the record is repeatedly confirmed and never violated.
    /// Returns `None` for missing or archived ids.
    pub async fn validate(&self, id: &str) -> Result<Option<HeuristicMemory>> {
        let conn = self.db.lock().await;
        let Some(mut memory) =
            fetch_any(&conn, id)?.filter(|m| m.status != MemoryStatus::Archived)
        else {
            return Ok(None);
        };

        let now = now_secs();
        memory.confidence = clamp(memory.confidence + VALIDATE_STEP);
        memory.validated_count += 1;
        memory.last_validated_at = Some(now);
        memory.updated_at = now;

        if memory.confidence >= GOLDEN_MIN_CONFIDENCE
            && memory.validated_count >= GOLDEN_MIN_VALIDATIONS
            && memory.violated_count == 0
        {
            if !memory.golden {
                info!("memory {} promoted to golden", memory.id);
            }
            memory.golden = true;
        }

        conn.execute(
            "UPDATE heuristic_memories SET confidence = ?1, golden = ?2, \
             validated_count = ?3, last_validated_at = ?4, updated_at = ?5 WHERE id = ?6",
            params![
                memory.confidence,
                memory.golden,
                memory.validated_count,
                memory.last_validated_at,
                memory.updated_at,
                memory.id,
            ],
        )?;

        Ok(Some(memory))
    }

    /// Record a violation: confidence −0.1 (floored at 0.0) and immediate
    /// loss of golden status. Returns `None` for missing or archived ids.
    pub async fn violate(&self, id: &str) -> Result<Option<HeuristicMemory>> {
        let conn = self.db.lock().await;
        let Some(mut memory) =
            fetch_any(&conn, id)?.filter(|m| m.status != MemoryStatus::Archived)
        else {
            return Ok(None);
        };

        if memory.golden {
            info!("memory {} lost golden status on violation", memory.id);
        }

        memory.confidence = clamp(memory.confidence - VIOLATE_STEP);
        memory.violated_count += 1;
        memory.golden = false;
        memory.updated_at = now_secs();

        conn.execute(
            "UPDATE heuristic_memories SET confidence = ?1, golden = 0, \
             violated_count = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                memory.confidence,
                memory.violated_count,
                memory.updated_at,
                memory.id,
            ],
        )?;

        Ok(Some(memory))
    }

    /// Replace a current memory with a revised version, linking the two
    /// into a chain. The new record inherits concept, domain, and project
    /// scope, at default confidence. A missing id or a record that is not
    /// `current` yields an outcome, never an error, and an existing
    /// supersede link is never overwritten.
    pub async fn supersede(&self, old_id: &str, new_content: &str) -> Result<SupersedeOutcome> {
        let mut conn = self.db.lock().await;
        let tx = conn.transaction()?;

        let Some(old) = fetch_any(&tx, old_id)? else {
            return Ok(SupersedeOutcome::NotFound);
        };

        if old.status != MemoryStatus::Current || old.superseded_by.is_some() {
            return Ok(SupersedeOutcome::InvalidState { status: old.status });
        }

        let now = now_secs();
        let new = HeuristicMemory {
            id: uuid::Uuid::new_v4().to_string(),
            concept: old.concept,
            content: new_content.to_string(),
            domain: old.domain.clone(),
            confidence: CONFIDENCE_DEFAULT,
            golden: false,
            validated_count: 0,
            violated_count: 0,
            status: MemoryStatus::Current,
            project_id: old.project_id.clone(),
            evolved_from: Some(old.id.clone()),
            superseded_by: None,
            created_at: now,
            updated_at: now,
            last_validated_at: None,
        };

        insert_memory(&tx, &new)?;
        tx.execute(
            "UPDATE heuristic_memories SET superseded_by = ?1, status = 'superseded', \
             updated_at = ?2 WHERE id = ?3",
            params![new.id, now, old.id],
        )?;
        tx.commit()?;

        info!("memory {} superseded by {}", old.id, new.id);
        Ok(SupersedeOutcome::Superseded {
            old_id: old.id,
            new,
        })
    }

    /// The full version chain containing `id`, oldest first. A record with
    /// no links is a singleton chain; a dangling link (member row deleted)
    /// ends the walk without failing.
    pub async fn chain(&self, id: &str) -> Result<Vec<HeuristicMemory>> {
        let conn = self.db.lock().await;

        let Some(start) = fetch_any(&conn, id)? else {
            return Ok(Vec::new());
        };

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start.id.clone());

        // Walk back to the oldest version.
        let mut oldest = start.clone();
        while let Some(prev_id) = oldest.evolved_from.clone() {
            if !visited.insert(prev_id.clone()) {
                break;
            }
            match fetch_any(&conn, &prev_id)? {
                Some(prev) => oldest = prev,
                None => break,
            }
        }

        // Then forward to the newest.
        let mut members = vec![oldest];
        loop {
            let last = members.last().map(|m| m.superseded_by.clone());
            let Some(Some(next_id)) = last else { break };
            if members.iter().any(|m| m.id == next_id) {
                break;
            }
            match fetch_any(&conn, &next_id)? {
                Some(next) => members.push(next),
                None => break,
            }
        }

        Ok(members)
    }

    /// Soft-delete: status becomes `archived`. Works for chain members;
    /// links are left intact (no cascade). Returns whether a row was
    /// archived.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.db.lock().await;
        let rows = conn.execute(
            "UPDATE heuristic_memories SET status = 'archived', updated_at = ?1 \
             WHERE id = ?2 AND status != 'archived'",
            params![now_secs(), id],
        )?;
        Ok(rows > 0)
    }

    /// Bring an archived memory back to `current`.
    pub async fn restore(&self, id: &str) -> Result<RestoreOutcome> {
        let conn = self.db.lock().await;

        let Some(mut memory) = fetch_any(&conn, id)? else {
            return Ok(RestoreOutcome::NotFound);
        };

        if memory.status != MemoryStatus::Archived {
            return Ok(RestoreOutcome::NotArchived {
                status: memory.status,
            });
        }

        memory.status = MemoryStatus::Current;
        memory.updated_at = now_secs();
        conn.execute(
            "UPDATE heuristic_memories SET status = 'current', updated_at = ?1 WHERE id = ?2",
            params![memory.updated_at, memory.id],
        )?;

        Ok(RestoreOutcome::Restored(memory))
    }

    /// Non-archived memories matching the filter, ordered by descending
    /// effective confidence.
    pub async fn list(&self, filter: &MemoryFilter) -> Result<Vec<HeuristicMemory>> {
        let rows = {
            let conn = self.db.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMORY_COLUMNS} FROM heuristic_memories WHERE status != 'archived'"
            ))?;
            let mapped = stmt.query_map([], map_memory)?;
            mapped.collect::<rusqlite::Result<Vec<_>>>()?
        };

        let now = now_secs();
        let mut memories: Vec<HeuristicMemory> = rows
            .into_iter()
            .filter(|m| filter.domain.is_none() || m.domain == filter.domain)
            .filter(|m| filter.concept.is_none_or(|c| m.concept == c))
            .filter(|m| match &filter.project_id {
                // Project scope includes global memories.
                Some(pid) => m.project_id.as_deref().is_none_or(|p| p == pid.as_str()),
                None => true,
            })
            .collect();

        memories.sort_by(|a, b| {
            effective_confidence(b, now)
                .partial_cmp(&effective_confidence(a, now))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        Ok(memories)
    }
}
