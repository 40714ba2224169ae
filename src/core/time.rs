//! Simulation Clock Units
//!
//! All cooldowns, buffs and expiries are integer milliseconds. Adapters that
//! read a wall clock in seconds convert once at the boundary, so every
//! comparison inside the simulation is exact.

use std::fmt;
use serde::{Serialize, Deserialize};

/// A span of time in milliseconds.
pub type Millis = i64;

/// A reading of the monotonic simulation clock, in milliseconds.
///
/// Signed so that "never happened" can sit safely before any real reading.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Clock origin.
    pub const ZERO: Self = Self(0);

    /// Far in the past; any elapsed check against it passes.
    pub const NEVER: Self = Self(i64::MIN / 4);

    /// Create from milliseconds.
    #[inline]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    /// Create from fractional seconds (rounded to the nearest millisecond).
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1000.0).round() as i64)
    }

    /// Raw milliseconds.
    #[inline]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Fractional seconds (display only).
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Milliseconds elapsed since `earlier` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: Timestamp) -> Millis {
        self.0.saturating_sub(earlier.0)
    }

    /// This instant plus a span.
    #[inline]
    pub fn after(self, span: Millis) -> Timestamp {
        Self(self.0.saturating_add(span))
    }

    /// Has `deadline` been reached?
    #[inline]
    pub fn has_reached(self, deadline: Timestamp) -> bool {
        self >= deadline
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NEVER {
            write!(f, "T(never)")
        } else {
            write!(f, "T({}ms)", self.0)
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// Time left until `deadline`, floored at zero.
#[inline]
pub fn remaining(now: Timestamp, deadline: Timestamp) -> Millis {
    deadline.since(now).max(0)
}
