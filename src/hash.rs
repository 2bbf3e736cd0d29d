//! Bucket hashing for text keys.
//!
//! The index is accumulated modulo the capacity byte by byte, with a
//! multiplier that starts at 31 and is itself reduced modulo `i16::MAX` on
//! every step so the products stay small. The exact arithmetic matters:
//! chain layouts (and the order the cursor visits items) depend on it.

const FACTOR_SEED: usize = 31;
const FACTOR_MODULUS: usize = i16::MAX as usize;

#[inline]
fn next_factor(factor: usize) -> usize {
    ((factor % FACTOR_MODULUS) * (FACTOR_SEED % FACTOR_MODULUS)) % FACTOR_MODULUS
}

/// Bucket for `key` in a table of `capacity` buckets. Always `< capacity`.
///
/// Panics if `capacity` is zero or `key` is empty; both are caller bugs.
pub fn bucket_index(capacity: usize, key: &str) -> usize {
    assert!(capacity > 0, "bucket_index: capacity must be positive");
    assert!(!key.is_empty(), "bucket_index: key must not be empty");
    let mut idx = 0usize;
    let mut factor = FACTOR_SEED;
    for &byte in key.as_bytes() {
        idx = ((idx % capacity) + (usize::from(byte) * factor) % capacity) % capacity;
        factor = next_factor(factor);
    }
    idx
}
