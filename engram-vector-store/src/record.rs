use serde::{Deserialize, Serialize};

/// One embedded chunk as persisted in a namespace.
///
/// Unique per `(file_path, chunk_index)` within its namespace; an upsert
/// with the same key replaces the prior record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRecord {
    /// Root-relative path of the source file, `/`-separated.
    pub file_path: String,

    /// Ordinal of the chunk within its file.
    pub chunk_index: usize,

    /// Starting line number (1-indexed).
    pub start_line: usize,

    /// Ending line number (1-indexed, inclusive).
    pub end_line: usize,

    /// Raw chunk text.
    pub content: String,

    /// Extracted declaration name, if any.
    #[serde(default)]
    pub symbol: Option<String>,

    /// Enclosing declaration path for structural chunks.
    #[serde(default)]
    pub scope_chain: Option<String>,

    /// Contextualized text the vector was produced from, when it differs
    /// from `content`.
    #[serde(default)]
    pub contextualized: Option<String>,

    /// The embedding vector.
    pub vector: Vec<f32>,
}

impl EmbeddingRecord {
    /// Namespace-unique key.
    pub fn key(&self) -> (&str, usize) {
        (&self.file_path, self.chunk_index)
    }
}
