//! Content-addressed chunk storage for tessera.
//!
//! A chunk store maps [`Hash`](tessera_types::Hash)es to immutable
//! [`Chunk`](tessera_types::Chunk)s and publishes a single root hash that
//! names the current committed state. Every higher-level structure is a graph
//! of chunks hanging off that root.
//!
//! # Components
//!
//! - [`MemoryStorage`] -- ground truth for one namespace: all persisted
//!   chunks plus the published root, advanced only by compare-and-swap
//! - [`MemoryStoreView`] -- per-session handle that buffers writes until
//!   `flush` or `commit`
//! - [`MemoryStoreFactory`] -- registry creating one storage per namespace
//! - [`CountingStoreView`] -- decorator counting calls into any store
//!
//! All handles implement [`ChunkStore`]; registries implement
//! [`StoreFactory`].
//!
//! # Design Rules
//!
//! 1. Chunks are immutable and never deleted once persisted.
//! 2. Writes are private to a view until it flushes or commits.
//! 3. `flush` makes chunks durable without publishing a root.
//! 4. `commit` persists, then swaps the root iff the caller's `last` is still
//!    current. Exactly one racing committer wins; the rest get `Ok(false)`.
//! 5. A lost race is a normal outcome, not an error. Rebase and retry.

pub mod config;
pub mod counting;
pub mod error;
pub mod factory;
pub mod memory;
pub mod traits;

pub use config::StoreConfig;
pub use counting::CountingStoreView;
pub use error::{StoreError, StoreResult};
pub use factory::MemoryStoreFactory;
pub use memory::{MemoryStorage, MemoryStoreView};
pub use traits::{ChunkStore, StoreFactory};
