//! Seeded ordering of embedding sites.
//!
//! A Fisher-Yates shuffle driven by ChaCha20 seeded from the 32-bit watermark
//! seed. The seed is the only state shared between embedder and extractor,
//! so the shuffle must be reproducible bit for bit on every platform: the
//! random range is drawn as `u32`, never `usize`, so 32-bit and 64-bit
//! targets consume the same amount of PRNG output per step.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PermuteError {
    #[error("{0} sites exceed the 2^32 indices a portable shuffle can address")]
    TooManySites(usize),
}

/// ChaCha stream used for the length-header key, distinct from the shuffle.
const HEADER_KEY_STREAM: u64 = 1;

fn rng_for(seed: u32) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(u64::from(seed))
}

/// Return the indices `0..n` in an order determined entirely by `seed`.
///
/// Every index must fit in a `u32`; larger `n` is rejected before any
/// allocation.
pub fn make_permutation(n: usize, seed: u32) -> Result<Vec<usize>, PermuteError> {
    check_addressable(n)?;
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = rng_for(seed);
    for i in (1..n).rev() {
        let upper = u32::try_from(i).map_err(|_| PermuteError::TooManySites(n))?;
        let j = rng.gen_range(0..=upper) as usize;
        order.swap(i, j);
    }
    Ok(order)
}

fn check_addressable(n: usize) -> Result<(), PermuteError> {
    match n.checked_sub(1) {
        Some(last) if u32::try_from(last).is_err() => Err(PermuteError::TooManySites(n)),
        _ => Ok(()),
    }
}

/// 32-bit key XORed into the length header.
///
/// `context` binds the remaining embedding parameters (see
/// [`WatermarkOptions::key_context`](crate::config::WatermarkOptions::key_context));
/// at most 28 bytes of it are used. Unmodified smooth regions read back as
/// all-zero bits, and a coarser `q` can read a finer lattice unchanged, so
/// without the key a mismatched call could decode a plausible length.
pub fn header_key(seed: u32, context: &[u8]) -> u32 {
    let mut material = [0u8; 32];
    material[..4].copy_from_slice(&seed.to_le_bytes());
    let n = context.len().min(28);
    material[4..4 + n].copy_from_slice(&context[..n]);

    let mut rng = ChaCha20Rng::from_seed(material);
    rng.set_stream(HEADER_KEY_STREAM);
    rng.next_u32()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trivial_sizes() {
        assert_eq!(make_permutation(0, 1234).unwrap(), Vec::<usize>::new());
        assert_eq!(make_permutation(1, 1234).unwrap(), vec![0]);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(make_permutation(50, 1234).unwrap(), make_permutation(50, 1234).unwrap());
        assert_eq!(header_key(1234, b"ctx"), header_key(1234, b"ctx"));
    }

    #[test]
    fn test_different_seeds_differ() {
        assert_ne!(make_permutation(50, 1234).unwrap(), make_permutation(50, 5678).unwrap());
        assert_ne!(header_key(1234, b"ctx"), header_key(9999, b"ctx"));
        assert_ne!(header_key(1234, b"ctx"), header_key(1234, b"cty"));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_rejects_unaddressable_size() {
        let limit = u32::MAX as usize + 1;
        assert!(check_addressable(limit).is_ok());
        assert_eq!(
            make_permutation(limit + 1, 1234),
            Err(PermuteError::TooManySites(limit + 1))
        );
    }

    #[test]
    fn test_actually_shuffles() {
        let order = make_permutation(100, 42).unwrap();
        let identity: Vec<usize> = (0..100).collect();
        assert_ne!(order, identity);
    }

    proptest! {
        #[test]
        fn proptest_bijection(n in 0usize..2000, seed in any::<u32>()) {
            let mut order = make_permutation(n, seed).unwrap();
            prop_assert_eq!(order.len(), n);
            order.sort_unstable();
            let identity: Vec<usize> = (0..n).collect();
            prop_assert_eq!(order, identity);
        }
    }
}
