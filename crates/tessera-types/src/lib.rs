//! Foundation types for the tessera chunk store.
//!
//! Every structure a higher layer persists (trees, commits, branches) is
//! reduced to [`Chunk`]s that reference each other by [`Hash`]. This crate
//! defines those two primitives and nothing else; storage lives in
//! `tessera-store`.
//!
//! # Key Types
//!
//! - [`Hash`] -- 32-byte BLAKE3 digest of a chunk's bytes, with a zero value
//! - [`HashSet`] -- unordered set of hashes used by batch lookups
//! - [`Chunk`] -- immutable, content-addressed byte payload
//! - [`ChunkHasher`] -- incremental builder for chunks assembled in pieces

pub mod chunk;
pub mod error;
pub mod hash;

pub use chunk::{Chunk, ChunkHasher};
pub use error::TypeError;
pub use hash::{Hash, HashSet};

/// Format tag advertised by every store built from this release.
///
/// Chunks written by one format version are not guaranteed to decode under
/// another, so stores report this value and callers compare it before
/// exchanging data.
pub const FORMAT_VERSION: &str = "7.18";
