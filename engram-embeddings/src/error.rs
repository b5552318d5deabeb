use thiserror::Error;

/// Errors produced by embedding providers and their wrappers.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Failed to initialize a local model
    #[error("Failed to initialize embedding model: {0}")]
    ModelInitialization(String),

    /// Failed to generate an embedding
    #[error("Failed to generate embedding: {0}")]
    Generation(String),

    /// A provider returned a vector whose length does not match its
    /// declared dimensionality. This is a configuration fault, not a
    /// transient failure.
    #[error(
        "Embedding dimension mismatch: provider '{provider}' declares {expected} dimensions \
         but returned {actual}. Check the configured model and dimensions."
    )]
    DimensionMismatch {
        provider: String,
        expected: usize,
        actual: usize,
    },

    /// The remote API is not available from the caller's region.
    #[error(
        "Embedding API unavailable in this region: {0}. \
         Use a local embedding model or route through a supported region."
    )]
    RegionRestricted(String),

    /// The remote API rejected the configured credential.
    #[error(
        "Embedding API rejected the configured key: {0}. \
         Verify the API key and its permissions."
    )]
    InvalidApiKey(String),

    /// Any other remote API failure.
    #[error("Embedding API error: {0}")]
    Api(String),

    /// Transport-level failure talking to the remote API.
    #[error("Embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
}
