// Content digests for keystroke de-duplication

use sha2::{Digest, Sha256};

/// Number of leading samples hashed into a window's content digest. The
/// attack transient lands inside this prefix, which is enough to tell two
/// captures of the same physical press apart from two distinct presses.
pub const DIGEST_PREFIX_SAMPLES: usize = 30;

/// Deterministic fingerprint of a keystroke window.
///
/// Hashes the little-endian bytes of the window's first
/// [`DIGEST_PREFIX_SAMPLES`] samples (fewer if the window is shorter) and
/// truncates to 64 bits. Stable across runs and platforms, so digests
/// persisted by one collection run de-duplicate against later runs.
pub fn sound_digest(samples: &[i32]) -> i64 {
    let prefix = &samples[..samples.len().min(DIGEST_PREFIX_SAMPLES)];
    let mut hasher = Sha256::new();
    for sample in prefix {
        hasher.update(sample.to_le_bytes());
    }
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    i64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let window = vec![5i32, -3, 900, 0, 12];
        assert_eq!(sound_digest(&window), sound_digest(&window));
    }

    #[test]
    fn test_digest_ignores_samples_past_prefix() {
        let mut a = vec![7i32; DIGEST_PREFIX_SAMPLES];
        let mut b = a.clone();
        a.push(1);
        b.push(2);
        assert_eq!(sound_digest(&a), sound_digest(&b));
    }

    #[test]
    fn test_digest_distinguishes_prefixes() {
        let a = vec![1i32; DIGEST_PREFIX_SAMPLES];
        let mut b = a.clone();
        b[0] = 2;
        assert_ne!(sound_digest(&a), sound_digest(&b));
    }

    #[test]
    fn test_short_window_hashes_available_samples() {
        // Shorter than the prefix: still deterministic, still length-aware
        assert_ne!(sound_digest(&[1, 2]), sound_digest(&[1, 2, 0]));
    }
}
