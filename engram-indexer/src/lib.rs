/*!
# Engram Indexer

Incremental semantic indexing of a project tree: walk → hash → chunk →
embed → batched commit.

## Behavior

- **Incremental**: files whose content hash matches the catalog are skipped
  without a single embedding call.
- **Failure isolation**: a chunk that cannot be embedded after retries
  fails its whole file; the file's hash is not committed (so it retries
  next run), the failure is recorded in the report, and the run continues.
- **Batched commit**: vectors are upserted and the batch's file hashes
  committed together once the batch threshold is reached, so "vectors
  visible" and "file marked indexed" advance in step.
- **Stale cleanup**: previously indexed files missing from the current walk
  lose their vectors and hash entry.
- **Cooperative cancellation**: checked at file boundaries; the current
  batch is flushed best-effort before the run aborts.

Ephemeral indexing runs the identical pipeline against an arbitrary path,
writing into a throwaway namespace outside the project registry.
*/

mod config;
mod error;
mod hasher;
mod indexer;
mod temp;
mod walker;

pub use config::IndexerConfig;
pub use error::{IndexerError, Result};
pub use hasher::{hash_file, hash_text};
pub use indexer::{
    FileError, IndexOptions, IndexProgress, IndexReport, Indexer, ProgressCallback,
};
pub use temp::TempIndexReport;
pub use walker::{walk_project, WalkOutcome, WalkedFile};
