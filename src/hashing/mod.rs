use blake3::Hasher;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// 64 bits is plenty for point ids: with millions of chunks the birthday
/// collision probability is negligible (`≈ n² / 2^65`), and a collision
/// costs an overwritten point, not corruption — chunk payloads are
/// self-describing and a source's chunks are rebuilt as a unit on
/// re-ingestion. This hash is not used for any security purpose.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Deterministic point id for a persisted chunk.
///
/// Chunks for a source are created once, in order, so `(source_id, index)`
/// identifies a chunk for its whole lifetime. The separator byte keeps
/// `("ab", 1)` and `("ab1", …)` from colliding on concatenation.
#[inline]
pub fn chunk_point_id(source_id: &str, chunk_index: usize) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(source_id.as_bytes());
    hasher.update(b"|");
    hasher.update(&(chunk_index as u64).to_le_bytes());

    let hash = hasher.finalize();
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}
