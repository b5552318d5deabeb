//! # Engram Chunker
//!
//! Splits source files into retrieval-sized chunks for embedding.
//!
//! Two strategies are provided:
//!
//! - **Generic** ([`chunk_generic`]): line accumulation against an estimated
//!   token budget with trailing-line overlap. Works on any text.
//! - **Structural** ([`chunk_structural`]): tree-sitter parse producing one
//!   chunk per semantic unit (function, method, class) with the enclosing
//!   scope chain recorded. Only available for a fixed set of languages;
//!   returns `None` on anything it cannot handle so the caller can fall back
//!   to the generic strategy.
//!
//! ## Example
//!
//! ```
//! use engram_chunker::{chunk_structural, chunk_generic, ChunkerConfig, Language};
//!
//! let source = "fn main() { println!(\"hello\"); }";
//! let config = ChunkerConfig::default();
//! let chunks = chunk_structural(source, "src/main.rs", Language::Rust, &config)
//!     .unwrap_or_else(|| chunk_generic(source, Language::Rust, &config));
//! assert!(!chunks.is_empty());
//! ```

mod config;
mod error;
mod generic;
mod language;
mod structural;

pub use config::ChunkerConfig;
pub use error::ChunkerError;
pub use generic::chunk_generic;
pub use language::Language;
pub use structural::chunk_structural;

use serde::{Deserialize, Serialize};

/// A retrieval-sized slice of a file's content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The chunk's raw text.
    pub content: String,

    /// Starting line number (1-indexed).
    pub start_line: usize,

    /// Ending line number (1-indexed, inclusive).
    pub end_line: usize,

    /// Ordinal position of this chunk within its file.
    pub chunk_index: usize,

    /// Best-effort extracted declaration name, if any.
    pub symbol: Option<String>,

    /// Enclosing declaration path (structural chunks only),
    /// e.g. `"MyStruct > my_method"`.
    pub scope_chain: Option<String>,

    /// Text preferred for embedding: the unit prefixed by its file and
    /// scope headers (structural chunks only).
    pub contextualized: Option<String>,
}

impl Chunk {
    /// Text to feed the embedding provider: contextualized when available,
    /// raw content otherwise.
    pub fn embedding_text(&self) -> &str {
        self.contextualized.as_deref().unwrap_or(&self.content)
    }

    /// Whether the chunk carries any non-whitespace text worth embedding.
    pub fn has_effective_text(&self) -> bool {
        !self.embedding_text().trim().is_empty()
    }
}
