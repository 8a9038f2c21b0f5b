/// Deterministic hashing based on splitmix64/32. The noise field hashes lattice
/// corners with these; nothing here keeps state between calls.

#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[inline]
pub fn splitmix32(mut x: u32) -> u32 {
    x = x.wrapping_add(0x9E3779B9);
    let mut z = x;
    z = (z ^ (z >> 16)).wrapping_mul(0x7FEB352D);
    z = (z ^ (z >> 15)).wrapping_mul(0x846CA68B);
    z ^ (z >> 16)
}

#[inline]
pub fn seed_u32(seed: u64, salt: u64) -> u32 {
    splitmix64(seed ^ salt) as u32
}

#[inline]
pub fn hash3(ix: i64, iy: i64, iz: i64, seed: u32) -> u32 {
    let x = ix as u32;
    let y = iy as u32;
    let z = iz as u32;
    let mut h = seed ^ 0x9E3779B9;
    h = splitmix32(h ^ x.wrapping_mul(0x85EBCA6B));
    h = splitmix32(h ^ y.wrapping_mul(0xC2B2AE35));
    h = splitmix32(h ^ z.wrapping_mul(0x27D4EB2F));
    h
}

/// Folds a byte stream into one 64-bit value. Used for stable file names.
pub fn fingerprint(bytes: &[u8]) -> u64 {
    bytes
        .chunks(8)
        .fold(splitmix64(0xC10_7C10_7C10_7C10 ^ bytes.len() as u64), |acc, chunk| {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            splitmix64(acc ^ u64::from_le_bytes(word))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash3_depends_on_every_axis() {
        let base = hash3(1, 2, 3, 7);
        assert_ne!(base, hash3(2, 2, 3, 7));
        assert_ne!(base, hash3(1, 3, 3, 7));
        assert_ne!(base, hash3(1, 2, 4, 7));
        assert_ne!(base, hash3(1, 2, 3, 8));
        assert_eq!(base, hash3(1, 2, 3, 7));
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        assert_eq!(fingerprint(b"ring_count=100"), fingerprint(b"ring_count=100"));
        assert_ne!(fingerprint(b"ring_count=100"), fingerprint(b"ring_count=101"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abc\0"));
    }
}
