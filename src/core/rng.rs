//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded through SplitMix64. Identical sequence on every
//! platform, so a recorded match replays to the same powerup spawns and
//! bot choices.

use std::ops::RangeInclusive;

use serde::{Serialize, Deserialize};

use super::grid::{ArenaBounds, GridVec};
use super::hash::{Digestible, StateHasher};

/// Domain separator for sub-stream seeds.
const STREAM_DOMAIN: &[u8] = b"DUEL_ARENA_SEED_V1";

/// Deterministic PRNG (Xorshift128+).
///
/// ```
/// use duel_arena::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::for_stream(7, b"powerups");
/// let mut b = DeterministicRng::for_stream(7, b"powerups");
/// assert_eq!(a.below(100), b.below(100));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    s0: u64,
    s1: u64,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create from a 64-bit seed. Any seed, including zero, is usable.
    pub fn new(seed: u64) -> Self {
        let mut mix = seed;
        let s0 = splitmix64(&mut mix);
        let s1 = splitmix64(&mut mix);

        // All-zero state is a fixed point of xorshift
        if s0 == 0 && s1 == 0 {
            Self { s0: 1, s1: 1 }
        } else {
            Self { s0, s1 }
        }
    }

    /// Independent stream for one consumer of a match seed.
    ///
    /// The powerup spawner and each bot draw from their own stream, so a bot
    /// joining never shifts where powerups appear.
    pub fn for_stream(match_seed: u64, label: &[u8]) -> Self {
        Self::new(stream_seed(match_seed, label))
    }

    /// Next raw 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let (s0, mut s1) = (self.s0, self.s1);
        let out = s0.wrapping_add(s1);

        s1 ^= s0;
        self.s0 = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.s1 = s1.rotate_left(37);

        out
    }

    /// Uniform in `[0, bound)`; zero for an empty range.
    #[inline]
    pub fn below(&mut self, bound: u32) -> u32 {
        match bound {
            0 => 0,
            _ => (self.next_u64() % u64::from(bound)) as u32,
        }
    }

    /// Uniform in an inclusive range; the start for an empty or inverted one.
    pub fn in_range(&mut self, range: RangeInclusive<i32>) -> i32 {
        let (lo, hi) = range.into_inner();
        if lo >= hi {
            return lo;
        }
        lo + self.below((hi - lo + 1) as u32) as i32
    }

    /// Random cell at least `margin` cells from every edge.
    ///
    /// Arenas too small for the margin still yield an in-bounds cell.
    pub fn random_cell(&mut self, bounds: ArenaBounds, margin: i32) -> GridVec {
        let x = self.in_range(margin..=bounds.width - 1 - margin);
        let y = self.in_range(margin..=bounds.height - 1 - margin);
        bounds.clamp(GridVec::new(x, y))
    }

    /// Uniform pick from a slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.below(items.len() as u32) as usize)
    }

    /// Pick from `(item, weight)` pairs proportionally to weight.
    pub fn choose_weighted<'a, T>(&mut self, table: &'a [(T, u32)]) -> Option<&'a T> {
        let total: u32 = table.iter().map(|&(_, w)| w).sum();
        if total == 0 {
            return None;
        }

        let mut roll = self.below(total);
        table.iter().find_map(|(item, weight)| {
            if roll < *weight {
                Some(item)
            } else {
                roll -= *weight;
                None
            }
        })
    }
}

impl Digestible for DeterministicRng {
    fn digest(&self, hasher: &mut StateHasher) {
        hasher.put(&self.s0).put(&self.s1);
    }
}

/// SplitMix64 step, for spreading weak seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Seed for a labelled sub-stream of a match seed.
pub fn stream_seed(match_seed: u64, label: &[u8]) -> u64 {
    let mut hasher = StateHasher::new(STREAM_DOMAIN);
    hasher.put(&match_seed).bytes(label);
    let digest = hasher.finish();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

// =============================================================================
// TESTS
// =============================================================================
