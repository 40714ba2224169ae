//! Integer Grid Vectors
//!
//! Cell positions, facings and projectile velocities on the arena grid.
//! Screen convention: +X is right, +Y is down.

use std::fmt;
use std::ops::{Add, Sub, Neg};
use serde::{Serialize, Deserialize};

/// 2D vector with integer components.
///
/// Used both as a cell position and as a direction. Directions produced by
/// this module always have components in `{-1, 0, 1}`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GridVec {
    /// Column (0 = left edge)
    pub x: i32,
    /// Row (0 = top edge)
    pub y: i32,
}

impl GridVec {
    /// Zero vector ("no direction")
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: 1, y: 0 };

    /// Unit vector pointing left (-X)
    pub const LEFT: Self = Self { x: -1, y: 0 };

    /// Unit vector pointing up the screen (-Y)
    pub const UP: Self = Self { x: 0, y: -1 };

    /// Unit vector pointing down the screen (+Y)
    pub const DOWN: Self = Self { x: 0, y: 1 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Scale by an integer scalar.
    #[inline]
    pub fn scale(self, scalar: i32) -> Self {
        Self {
            x: self.x.saturating_mul(scalar),
            y: self.y.saturating_mul(scalar),
        }
    }

    /// Component-wise sign, giving one of the 8 unit directions or ZERO.
    #[inline]
    pub fn signum(self) -> Self {
        Self {
            x: self.x.signum(),
            y: self.y.signum(),
        }
    }

    /// Is this the zero vector?
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> i32 {
        self.x * other.x + self.y * other.y
    }

    /// Manhattan (taxicab) distance to another cell.
    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Rotate 90 degrees (x, y) -> (-y, x).
    #[inline]
    pub fn perpendicular(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }
}

impl Add for GridVec {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
        }
    }
}

impl Sub for GridVec {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}

impl Neg for GridVec {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl fmt::Debug for GridVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({}, {})", self.x, self.y)
    }
}

impl fmt::Display for GridVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// ARENA BOUNDS
// =============================================================================

/// Playable area: cells in `[0, width) x [0, height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArenaBounds {
    /// Number of columns
    pub width: i32,
    /// Number of rows
    pub height: i32,
}

impl ArenaBounds {
    /// Create bounds. Dimensions below 1 are raised to 1.
    pub const fn new(width: i32, height: i32) -> Self {
        let width = if width < 1 { 1 } else { width };
        let height = if height < 1 { 1 } else { height };
        Self { width, height }
    }

    /// Check if a cell lies inside the arena.
    #[inline]
    pub fn contains(&self, pos: GridVec) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Clamp a cell into the arena.
    #[inline]
    pub fn clamp(&self, pos: GridVec) -> GridVec {
        GridVec {
            x: pos.x.clamp(0, self.width - 1),
            y: pos.y.clamp(0, self.height - 1),
        }
    }

    /// Center row.
    #[inline]
    pub fn mid_row(&self) -> i32 {
        self.height / 2
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_constants() {
        assert_eq!(GridVec::ZERO, GridVec::new(0, 0));
        assert_eq!(GridVec::RIGHT + GridVec::LEFT, GridVec::ZERO);
        assert_eq!(GridVec::UP + GridVec::DOWN, GridVec::ZERO);
        assert_eq!(-GridVec::RIGHT, GridVec::LEFT);
    }

    #[test]
    fn test_grid_scale_and_signum() {
        let v = GridVec::new(1, -1).scale(4);
        assert_eq!(v, GridVec::new(4, -4));
        assert_eq!(v.signum(), GridVec::new(1, -1));
        assert_eq!(GridVec::new(2, 0).signum(), GridVec::RIGHT);
        assert!(GridVec::new(0, 0).signum().is_zero());
    }

    #[test]
    fn test_manhattan() {
        let a = GridVec::new(10, 5);
        assert_eq!(a.manhattan(a), 0);
        assert_eq!(a.manhattan(GridVec::new(11, 5)), 1);
        assert_eq!(a.manhattan(GridVec::new(9, 6)), 2);
        assert_eq!(a.manhattan(GridVec::new(13, 1)), 7);
    }

    #[test]
    fn test_perpendicular() {
        assert_eq!(GridVec::RIGHT.perpendicular(), GridVec::DOWN);
        assert_eq!(GridVec::RIGHT.perpendicular().dot(GridVec::RIGHT), 0);
        assert_eq!(GridVec::new(1, 1).perpendicular(), GridVec::new(-1, 1));
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = ArenaBounds::new(70, 24);

        let inside = GridVec::new(10, 20);
        assert_eq!(bounds.clamp(inside), inside);
        assert!(bounds.contains(inside));

        let outside = GridVec::new(100, -3);
        assert!(!bounds.contains(outside));
        assert_eq!(bounds.clamp(outside), GridVec::new(69, 0));

        assert!(!bounds.contains(GridVec::new(70, 0)));
        assert!(!bounds.contains(GridVec::new(0, 24)));
    }

    #[test]
    fn test_bounds_minimum_size() {
        let bounds = ArenaBounds::new(0, -5);
        assert_eq!(bounds.width, 1);
        assert_eq!(bounds.height, 1);
        assert_eq!(bounds.clamp(GridVec::new(7, 7)), GridVec::ZERO);
    }
}
