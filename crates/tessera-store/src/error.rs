/// Errors from chunk store operations.
///
/// An optimistic-concurrency conflict is not an error: [`commit`] reports it
/// as `Ok(false)`. Variants here mean the operation could not complete.
///
/// [`commit`]: crate::ChunkStore::commit
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The factory was used after `shutter()`.
    #[error("cannot use store factory after shutter")]
    FactoryShuttered,

    /// Attempted to store the empty sentinel chunk.
    #[error("cannot store an empty chunk")]
    EmptyChunk,

    /// Namespace name rejected by validation.
    #[error("invalid namespace {name:?}: {reason}")]
    InvalidNamespace { name: String, reason: String },

    /// The factory already holds its configured maximum of namespaces.
    #[error("namespace limit reached ({limit})")]
    NamespaceLimit { limit: usize },

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error from a persistent backend.
    ///
    /// The in-memory store never produces this; disk or network backends
    /// report transport failures here, apart from commit conflicts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
