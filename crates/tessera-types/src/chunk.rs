use bytes::Bytes;

use crate::hash::Hash;

/// Immutable, content-addressed byte payload.
///
/// The hash is computed once, at construction, and travels with the chunk.
/// A chunk with an empty payload is the absence sentinel returned by lookups
/// that find nothing; it is never a valid stored chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    hash: Hash,
    data: Bytes,
}

impl Chunk {
    /// Create a chunk, hashing its payload.
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            hash: Hash::of(&data),
            data,
        }
    }

    /// Create a chunk from a payload whose hash the caller already knows.
    ///
    /// The hash is not checked; use [`Chunk::verify`] when the pair came from
    /// an untrusted source.
    pub fn with_hash(hash: Hash, data: impl Into<Bytes>) -> Self {
        Self {
            hash,
            data: data.into(),
        }
    }

    /// The absence sentinel.
    pub fn empty() -> Self {
        Self::new(Bytes::new())
    }

    /// Returns `true` for the absence sentinel (zero-length payload).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The chunk's content hash.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// The chunk's payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Recompute the hash of the payload and compare it with the stored one.
    pub fn verify(&self) -> bool {
        Hash::of(&self.data) == self.hash
    }
}

impl From<&[u8]> for Chunk {
    fn from(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

/// Incremental chunk builder.
///
/// Feeds payload pieces to the hasher as they arrive so the digest is ready
/// as soon as the last piece is written.
#[derive(Default)]
pub struct ChunkHasher {
    hasher: blake3::Hasher,
    buf: Vec<u8>,
}

impl ChunkHasher {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a piece of payload.
    pub fn update(&mut self, piece: &[u8]) -> &mut Self {
        self.hasher.update(piece);
        self.buf.extend_from_slice(piece);
        self
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish hashing and produce the chunk.
    pub fn finish(self) -> Chunk {
        let hash = Hash::from_digest(*self.hasher.finalize().as_bytes());
        Chunk::with_hash(hash, self.buf)
    }
}

impl std::io::Write for ChunkHasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_hashes_payload() {
        let c = Chunk::new(&b"abc"[..]);
        assert_eq!(c.hash(), Hash::of(b"abc"));
        assert_eq!(c.len(), 3);
        assert_eq!(c.data().as_ref(), b"abc");
        assert!(c.verify());
    }

    #[test]
    fn empty_sentinel() {
        let e = Chunk::empty();
        assert!(e.is_empty());
        assert_eq!(e, Chunk::empty());
        assert!(!Chunk::from(&b"x"[..]).is_empty());
    }

    #[test]
    fn with_hash_is_trusted_until_verified() {
        let c = Chunk::with_hash(Hash::of(b"other"), &b"payload"[..]);
        assert_eq!(c.hash(), Hash::of(b"other"));
        assert!(!c.verify());
    }

    #[test]
    fn hasher_matches_one_shot() {
        let mut h = ChunkHasher::new();
        assert!(h.is_empty());
        h.update(b"hello ").update(b"world");
        assert_eq!(h.len(), 11);
        assert_eq!(h.finish(), Chunk::from(&b"hello world"[..]));
    }

    #[test]
    fn hasher_as_io_write() {
        use std::io::Write;

        let mut h = ChunkHasher::new();
        write!(h, "{}-{}", "a", 1).unwrap();
        assert_eq!(h.finish(), Chunk::from(b"a-1".to_vec()));
    }

    proptest! {
        #[test]
        fn split_point_does_not_change_hash(
            data in proptest::collection::vec(any::<u8>(), 1..512),
            split in any::<prop::sample::Index>(),
        ) {
            let at = split.index(data.len());
            let mut h = ChunkHasher::new();
            h.update(&data[..at]).update(&data[at..]);
            prop_assert_eq!(h.finish(), Chunk::from(data.clone()));
        }
    }
}
