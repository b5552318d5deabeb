//! # Engram Embeddings
//!
//! Text embedding providers for semantic code search, behind one contract:
//! [`EmbeddingProvider::embed`] turns text into a fixed-length vector.
//!
//! ## Providers
//!
//! - [`LocalProvider`] — in-process inference via fastembed (ONNX Runtime),
//!   no network after the initial model download.
//! - [`RemoteProvider`] — an OpenAI-compatible embeddings endpoint with the
//!   caller's API key; failures are classified into actionable categories.
//! - [`DeterministicProvider`] — a seeded pseudo-random vector derived from
//!   a hash of the input, for reproducible tests without model or network
//!   cost.
//!
//! Every vector returned through [`embed_checked`] is length-verified
//! against the provider's declared dimensionality; a mismatch is a fatal
//! configuration error, never silently truncated or padded.
//!
//! [`embed_with_retry`] wraps embedding calls with exponential backoff and
//! a session-owned [`CircuitBreaker`].

mod error;
mod local;
mod provider;
mod remote;
mod retry;
mod similarity;

pub use error::EmbeddingError;
pub use local::{LocalModel, LocalProvider};
pub use provider::{embed_checked, DeterministicProvider, EmbeddingProvider};
pub use remote::{RemoteConfig, RemoteProvider};
pub use retry::{embed_with_retry, BreakerConfig, CircuitBreaker, RetryConfig};
pub use similarity::cosine_similarity;

/// Default embedding dimension for Nomic-embed-text-v1.5
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Dimension used by the deterministic test provider unless overridden.
pub const TEST_EMBEDDING_DIM: usize = 384;
