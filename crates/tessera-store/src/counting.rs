//! Call-counting decorator for any [`ChunkStore`].
//!
//! Higher layers use it in tests to assert how many chunks they fetched or
//! wrote, e.g. that a cached lookup did not go back to the store.

use std::sync::atomic::{AtomicU64, Ordering};

use tessera_types::{Chunk, Hash, HashSet};

use crate::error::StoreResult;
use crate::traits::ChunkStore;

/// Wraps a [`ChunkStore`] and counts calls into it.
///
/// Batch operations count one per hash or chunk. Counters are monotonic and
/// use relaxed ordering; they are exact once the calls being counted have
/// returned.
#[derive(Debug)]
pub struct CountingStoreView<S> {
    inner: S,
    reads: AtomicU64,
    hases: AtomicU64,
    writes: AtomicU64,
    flushes: AtomicU64,
    commits: AtomicU64,
}

impl<S: ChunkStore> CountingStoreView<S> {
    /// Wrap `inner` with all counters at zero.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            reads: AtomicU64::new(0),
            hases: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            commits: AtomicU64::new(0),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap, discarding the counters.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Chunks requested through `get` / `get_many`.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Hashes checked through `has` / `has_many`.
    pub fn hases(&self) -> u64 {
        self.hases.load(Ordering::Relaxed)
    }

    /// Chunks staged through `put` / `put_many`.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Calls to `flush`.
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Calls to `commit`, successful or not.
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    fn bump(counter: &AtomicU64, by: usize) {
        counter.fetch_add(by as u64, Ordering::Relaxed);
    }
}

impl<S: ChunkStore> ChunkStore for CountingStoreView<S> {
    fn get(&self, hash: &Hash) -> StoreResult<Chunk> {
        Self::bump(&self.reads, 1);
        self.inner.get(hash)
    }

    fn get_many(&self, hashes: &HashSet) -> StoreResult<Vec<Chunk>> {
        Self::bump(&self.reads, hashes.len());
        self.inner.get_many(hashes)
    }

    fn has(&self, hash: &Hash) -> StoreResult<bool> {
        Self::bump(&self.hases, 1);
        self.inner.has(hash)
    }

    fn has_many(&self, hashes: &HashSet) -> StoreResult<HashSet> {
        Self::bump(&self.hases, hashes.len());
        self.inner.has_many(hashes)
    }

    fn put(&self, chunk: Chunk) -> StoreResult<()> {
        Self::bump(&self.writes, 1);
        self.inner.put(chunk)
    }

    fn put_many(&self, chunks: Vec<Chunk>) -> StoreResult<()> {
        Self::bump(&self.writes, chunks.len());
        self.inner.put_many(chunks)
    }

    fn len(&self) -> StoreResult<usize> {
        self.inner.len()
    }

    fn root(&self) -> StoreResult<Hash> {
        self.inner.root()
    }

    fn commit(&self, current: Hash, last: Hash) -> StoreResult<bool> {
        Self::bump(&self.commits, 1);
        self.inner.commit(current, last)
    }

    fn rebase(&self) -> StoreResult<()> {
        self.inner.rebase()
    }

    fn flush(&self) -> StoreResult<()> {
        Self::bump(&self.flushes, 1);
        self.inner.flush()
    }

    fn version(&self) -> &str {
        self.inner.version()
    }

    fn close(&self) -> StoreResult<()> {
        self.inner.close()
    }
}
