//! State Hashing for Verification
//!
//! SHA-256 over a canonical byte encoding of the simulation state. A replay
//! that reproduces the match bit for bit reproduces the hash; anything else
//! almost surely does not.

use sha2::{Sha256, Digest};
use super::grid::GridVec;
use super::time::Timestamp;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Something with a canonical byte encoding for state hashing.
///
/// Implementations must write fields in a fixed order and must not depend
/// on anything outside the value (addresses, hash-map order).
pub trait Digestible {
    /// Feed this value into `hasher`.
    fn digest(&self, hasher: &mut StateHasher);
}

/// Incremental SHA-256 with a domain separator.
pub struct StateHasher {
    inner: Sha256,
}

impl StateHasher {
    /// Start a hash in the given domain.
    pub fn new(domain: &[u8]) -> Self {
        let mut inner = Sha256::new();
        inner.update(domain);
        Self { inner }
    }

    /// Feed raw bytes.
    #[inline]
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.inner.update(bytes);
        self
    }

    /// Feed one value.
    #[inline]
    pub fn put<T: Digestible + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.digest(self);
        self
    }

    /// Finish and return the digest.
    pub fn finish(self) -> StateHash {
        self.inner.finalize().into()
    }
}

macro_rules! digest_le_bytes {
    ($($ty:ty),*) => {
        $(
            impl Digestible for $ty {
                #[inline]
                fn digest(&self, hasher: &mut StateHasher) {
                    hasher.bytes(&self.to_le_bytes());
                }
            }
        )*
    };
}

digest_le_bytes!(u8, u32, u64, i32, i64);

impl Digestible for bool {
    #[inline]
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&(*self as u8));
    }
}

impl Digestible for char {
    #[inline]
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&(*self as u32));
    }
}

impl Digestible for GridVec {
    #[inline]
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&self.x).put(&self.y);
    }
}

impl Digestible for Timestamp {
    #[inline]
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&self.as_millis());
    }
}

impl<T: Digestible> Digestible for Option<T> {
    fn digest(&self, hasher: &mut StateHasher) {
        match self {
            None => hasher.put(&0u8),
            Some(value) => hasher.put(&1u8).put(value),
        };
    }
}

impl<A: Digestible, B: Digestible> Digestible for (A, B) {
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&self.0).put(&self.1);
    }
}

/// Length-prefixed, so `[a] ++ [b, c]` and `[a, b] ++ [c]` differ.
impl<T: Digestible> Digestible for [T] {
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&(self.len() as u32));
        for item in self {
            hasher.put(item);
        }
    }
}

impl<T: Digestible, const N: usize> Digestible for [T; N] {
    fn digest(&self, hasher: &mut StateHasher) {
        for item in self {
            hasher.put(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of<T: Digestible + ?Sized>(value: &T) -> StateHash {
        let mut hasher = StateHasher::new(b"test");
        hasher.put(value);
        hasher.finish()
    }

    #[test]
    fn test_hash_determinism() {
        let make = || {
            let mut hasher = StateHasher::new(b"test");
            hasher
                .put(&100u32)
                .put(&GridVec::new(8, 12))
                .put(&Timestamp::from_millis(2200))
                .put(&true);
            hasher.finish()
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn test_hash_order_matters() {
        assert_ne!(hash_of(&GridVec::new(1, 2)), hash_of(&GridVec::new(2, 1)));
    }

    #[test]
    fn test_domain_separates() {
        let mut a = StateHasher::new(b"one");
        let mut b = StateHasher::new(b"two");
        a.put(&7u64);
        b.put(&7u64);
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_option_tagged() {
        assert_ne!(hash_of(&None::<u32>), hash_of(&Some(0u32)));
    }

    #[test]
    fn test_slices_length_prefixed() {
        let mut split_early = StateHasher::new(b"test");
        split_early.put(&[1u32][..]).put(&[2u32, 3][..]);

        let mut split_late = StateHasher::new(b"test");
        split_late.put(&[1u32, 2][..]).put(&[3u32][..]);

        assert_ne!(split_early.finish(), split_late.finish());
    }
}
