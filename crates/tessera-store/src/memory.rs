//! In-memory chunk store.
//!
//! [`MemoryStorage`] holds the ground truth for one namespace: every chunk
//! ever persisted and the published root. [`MemoryStoreView`] is a session on
//! top of it that buffers writes until `flush` or `commit`.
//!
//! Lock order is always view before storage. A view holds its own lock while
//! calling into the storage; the storage never calls back into a view.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tessera_types::{Chunk, Hash, HashSet, FORMAT_VERSION};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ChunkStore;

// Poisoned locks still hold consistent state; keep serving.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Persisted {
    chunks: HashMap<Hash, Chunk>,
    root: Hash,
}

/// Ground truth backing every [`MemoryStoreView`] of one namespace.
///
/// Reads take a shared lock; `put_all` and `update_root` take the exclusive
/// lock. Chunks are never removed.
#[derive(Default)]
pub struct MemoryStorage {
    state: RwLock<Persisted>,
}

impl MemoryStorage {
    /// Create an empty storage whose root is the zero hash.
    pub fn new() -> Self {
        Self::default()
    }

    /// Vend a view initialized with the currently published root.
    pub fn new_view(self: &Arc<Self>) -> MemoryStoreView {
        MemoryStoreView {
            state: RwLock::new(ViewState {
                pending: HashMap::new(),
                root: self.root(),
            }),
            storage: Arc::clone(self),
        }
    }

    /// The stored chunk, or [`Chunk::empty`] if absent.
    pub fn get(&self, hash: &Hash) -> Chunk {
        read(&self.state)
            .chunks
            .get(hash)
            .cloned()
            .unwrap_or_else(Chunk::empty)
    }

    /// Whether the chunk is stored.
    pub fn has(&self, hash: &Hash) -> bool {
        read(&self.state).chunks.contains_key(hash)
    }

    /// Merge `chunks` into the stored set.
    ///
    /// A hash that is already present keeps its existing chunk; by content
    /// addressing both copies are the same bytes. Empty chunks are the absence
    /// sentinel and are skipped.
    pub fn put_all(&self, chunks: HashMap<Hash, Chunk>) {
        if chunks.is_empty() {
            return;
        }
        let mut state = write(&self.state);
        for (hash, chunk) in chunks {
            if chunk.is_empty() {
                debug!(hash = %hash.short_hex(), "skipping empty chunk");
                continue;
            }
            state.chunks.entry(hash).or_insert(chunk);
        }
    }

    /// Number of distinct stored chunks.
    pub fn len(&self) -> usize {
        read(&self.state).chunks.len()
    }

    /// Returns `true` if no chunk has been stored.
    pub fn is_empty(&self) -> bool {
        read(&self.state).chunks.is_empty()
    }

    /// The published root.
    pub fn root(&self) -> Hash {
        read(&self.state).root
    }

    /// Replace the root with `current` iff it is still `last`.
    pub fn update_root(&self, current: Hash, last: Hash) -> bool {
        let mut state = write(&self.state);
        if state.root != last {
            return false;
        }
        state.root = current;
        true
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = read(&self.state);
        f.debug_struct("MemoryStorage")
            .field("chunk_count", &state.chunks.len())
            .field("root", &state.root)
            .finish()
    }
}

struct ViewState {
    pending: HashMap<Hash, Chunk>,
    root: Hash,
}

/// Session onto a [`MemoryStorage`].
///
/// Obtain one through [`MemoryStorage::new_view`] or a
/// [`MemoryStoreFactory`](crate::MemoryStoreFactory).
pub struct MemoryStoreView {
    state: RwLock<ViewState>,
    storage: Arc<MemoryStorage>,
}

impl MemoryStoreView {
    /// The storage this view reads through to.
    pub fn storage(&self) -> &Arc<MemoryStorage> {
        &self.storage
    }

    /// Number of chunks staged but not yet persisted.
    pub fn pending_len(&self) -> usize {
        read(&self.state).pending.len()
    }
}

impl ChunkStore for MemoryStoreView {
    fn get(&self, hash: &Hash) -> StoreResult<Chunk> {
        let state = read(&self.state);
        if let Some(chunk) = state.pending.get(hash) {
            return Ok(chunk.clone());
        }
        Ok(self.storage.get(hash))
    }

    fn get_many(&self, hashes: &HashSet) -> StoreResult<Vec<Chunk>> {
        let state = read(&self.state);
        let found = hashes
            .iter()
            .filter_map(|hash| match state.pending.get(hash) {
                Some(chunk) => Some(chunk.clone()),
                None => Some(self.storage.get(hash)).filter(|c| !c.is_empty()),
            })
            .collect();
        Ok(found)
    }

    fn has(&self, hash: &Hash) -> StoreResult<bool> {
        let state = read(&self.state);
        Ok(state.pending.contains_key(hash) || self.storage.has(hash))
    }

    fn has_many(&self, hashes: &HashSet) -> StoreResult<HashSet> {
        let state = read(&self.state);
        Ok(hashes
            .iter()
            .filter(|hash| state.pending.contains_key(*hash) || self.storage.has(hash))
            .copied()
            .collect())
    }

    fn put(&self, chunk: Chunk) -> StoreResult<()> {
        if chunk.is_empty() {
            return Err(StoreError::EmptyChunk);
        }
        write(&self.state).pending.insert(chunk.hash(), chunk);
        Ok(())
    }

    // Counts pending chunks that are also persisted twice.
    fn len(&self) -> StoreResult<usize> {
        let state = read(&self.state);
        Ok(state.pending.len() + self.storage.len())
    }

    fn root(&self) -> StoreResult<Hash> {
        Ok(read(&self.state).root)
    }

    fn commit(&self, current: Hash, last: Hash) -> StoreResult<bool> {
        let mut state = write(&self.state);
        if last != state.root {
            debug!(
                last = %last.short_hex(),
                root = %state.root.short_hex(),
                "commit refused: stale last root"
            );
            return Ok(false);
        }

        let pending = std::mem::take(&mut state.pending);
        let count = pending.len();
        self.storage.put_all(pending);

        if !self.storage.update_root(current, last) {
            debug!(last = %last.short_hex(), persisted = count, "commit lost root race");
            return Ok(false);
        }
        state.root = current;
        debug!(
            root = %current.short_hex(),
            persisted = count,
            "commit advanced root"
        );
        Ok(true)
    }

    fn rebase(&self) -> StoreResult<()> {
        let mut state = write(&self.state);
        state.root = self.storage.root();
        debug!(root = %state.root.short_hex(), "view rebased");
        Ok(())
    }

    fn flush(&self) -> StoreResult<()> {
        let mut state = write(&self.state);
        let pending = std::mem::take(&mut state.pending);
        debug!(persisted = pending.len(), "view flushed");
        self.storage.put_all(pending);
        Ok(())
    }

    fn version(&self) -> &str {
        FORMAT_VERSION
    }
}

impl std::fmt::Debug for MemoryStoreView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = read(&self.state);
        f.debug_struct("MemoryStoreView")
            .field("pending_count", &state.pending.len())
            .field("root", &state.root)
            .field("storage", &self.storage)
            .finish()
    }
}
