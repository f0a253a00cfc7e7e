//! Axis-aligned bounds in continuous (nanometre) space.
//!
//! `Bounds` is the continuous-coordinate counterpart of a voxel region: every
//! editing operation first expresses the affected space as a `Bounds`, and the
//! grid module converts it to discrete voxel indices on demand.

use std::fmt;

use glam::DVec3;

/// Axis-aligned interval box in continuous nanometre coordinates.
///
/// A box is either *valid* (`min <= max` on every axis) or *empty* (the
/// canonical uninitialized sentinel, `max < min` on every axis). All geometric
/// operations assume valid inputs; `bounding_box` and `intersection` on empty
/// boxes produce garbage, so check `is_valid` first when a box may be empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl Bounds {
  /// Create bounds from min and max corners.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    Self { min, max }
  }

  /// Create the empty sentinel (`max < min` on every axis).
  pub fn empty() -> Self {
    Self {
      min: DVec3::ZERO,
      max: DVec3::splat(-1.0),
    }
  }

  /// Degenerate zero-thickness box around a single point.
  pub fn point(p: DVec3) -> Self {
    Self { min: p, max: p }
  }

  /// Create bounds from the `(xmin, xmax, ymin, ymax, zmin, zmax)` layout
  /// used by persisted descriptors.
  pub fn from_extents(e: [f64; 6]) -> Self {
    Self {
      min: DVec3::new(e[0], e[2], e[4]),
      max: DVec3::new(e[1], e[3], e[5]),
    }
  }

  /// True iff `min <= max` on every axis.
  pub fn is_valid(&self) -> bool {
    self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
  }

  /// True iff the per-axis intervals overlap on all three axes.
  ///
  /// Touching boxes (`self.max == other.min` on some axis) count as
  /// intersecting.
  #[inline]
  pub fn intersects(&self, other: &Bounds) -> bool {
    self.min.x <= other.max.x
      && self.max.x >= other.min.x
      && self.min.y <= other.max.y
      && self.max.y >= other.min.y
      && self.min.z <= other.max.z
      && self.max.z >= other.min.z
  }

  /// Per-axis `max(min), min(max)`.
  ///
  /// Undefined (inverted on some axis) when the boxes do not intersect;
  /// callers must check `intersects` first.
  #[inline]
  pub fn intersection(&self, other: &Bounds) -> Bounds {
    Bounds {
      min: self.min.max(other.min),
      max: self.max.min(other.max),
    }
  }

  /// True iff `self` lies entirely within `other` on every axis.
  #[inline]
  pub fn is_inside(&self, other: &Bounds) -> bool {
    other.min.x <= self.min.x
      && self.max.x <= other.max.x
      && other.min.y <= self.min.y
      && self.max.y <= other.max.y
      && other.min.z <= self.min.z
      && self.max.z <= other.max.z
  }

  /// True iff the point lies within the bounds (boundary included).
  #[inline]
  pub fn contains_point(&self, p: DVec3) -> bool {
    self.min.x <= p.x
      && p.x <= self.max.x
      && self.min.y <= p.y
      && p.y <= self.max.y
      && self.min.z <= p.z
      && p.z <= self.max.z
  }
}

/// Bounding box of two boxes: per-axis `min(mins), max(maxes)`.
///
/// Always defined for valid inputs, even when they do not overlap.
#[inline]
pub fn bounding_box(a: &Bounds, b: &Bounds) -> Bounds {
  Bounds {
    min: a.min.min(b.min),
    max: a.max.max(b.max),
  }
}

impl fmt::Display for Bounds {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{{{}, {}, {}, {}, {}, {}}}",
      self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
    )
  }
}

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;
