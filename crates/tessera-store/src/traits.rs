use tessera_types::{Chunk, Hash, HashSet};

use crate::error::StoreResult;

/// Session handle onto a content-addressed chunk store.
///
/// All implementations must satisfy these invariants:
/// - Writes are private to the handle until `flush` or `commit`.
/// - Reads see the handle's own pending writes (read-your-own-writes).
/// - Chunks are never removed or rewritten once persisted.
/// - The root advances only through `commit`, and only if the caller's
///   `last` is still the published root.
/// - `commit` reports a lost race as `Ok(false)`. `Err` is reserved for
///   operations that could not complete at all.
pub trait ChunkStore: Send + Sync {
    /// Read a chunk by hash.
    ///
    /// Returns [`Chunk::empty`] if the chunk does not exist.
    fn get(&self, hash: &Hash) -> StoreResult<Chunk>;

    /// Read every chunk in `hashes` that exists. Absent hashes are skipped.
    /// The order of the returned chunks is unspecified.
    fn get_many(&self, hashes: &HashSet) -> StoreResult<Vec<Chunk>> {
        let mut found = Vec::with_capacity(hashes.len());
        for hash in hashes {
            let chunk = self.get(hash)?;
            if !chunk.is_empty() {
                found.push(chunk);
            }
        }
        Ok(found)
    }

    /// Check whether a chunk exists.
    fn has(&self, hash: &Hash) -> StoreResult<bool>;

    /// Return the subset of `hashes` that exists.
    fn has_many(&self, hashes: &HashSet) -> StoreResult<HashSet> {
        let mut present = HashSet::new();
        for hash in hashes {
            if self.has(hash)? {
                present.insert(*hash);
            }
        }
        Ok(present)
    }

    /// Stage a chunk, keyed by its own hash.
    fn put(&self, chunk: Chunk) -> StoreResult<()>;

    /// Stage a sequence of chunks. Not atomic across the sequence.
    fn put_many(&self, chunks: Vec<Chunk>) -> StoreResult<()> {
        for chunk in chunks {
            self.put(chunk)?;
        }
        Ok(())
    }

    /// Number of chunks this handle can serve.
    fn len(&self) -> StoreResult<usize>;

    /// Returns `true` if `len()` is zero.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// The root as of this handle's last `rebase` or successful `commit`.
    fn root(&self) -> StoreResult<Hash>;

    /// Persist pending chunks and advance the root from `last` to `current`.
    ///
    /// Returns `Ok(false)` if `last` is not this handle's root or if another
    /// writer advanced the published root first; call `rebase` and retry.
    fn commit(&self, current: Hash, last: Hash) -> StoreResult<bool>;

    /// Adopt the latest published root. Pending chunks are kept.
    fn rebase(&self) -> StoreResult<()>;

    /// Persist pending chunks without touching the root.
    fn flush(&self) -> StoreResult<()>;

    /// Format version advertised by this store.
    fn version(&self) -> &str;

    /// Release handle-local resources.
    fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Namespace-keyed registry that vends [`ChunkStore`] handles.
pub trait StoreFactory: Send + Sync {
    /// Return a handle onto the store registered under `namespace`, creating
    /// the store on first use.
    fn create_store(&self, namespace: &str) -> StoreResult<Box<dyn ChunkStore>>;

    /// Drop every namespace binding. Later `create_store` calls fail;
    /// handles already vended keep working.
    fn shutter(&self);
}
