//! Conversion between continuous space and discrete voxel indices.
//!
//! Every draw and fill operation funnels through `VoxelGrid::index_for_point`;
//! the rounding convention here (round half away from zero, which is what
//! `f64::round` implements) is the single most important numeric contract in
//! the engine. Off-by-one drift in this module silently corrupts region
//! arithmetic everywhere above it.

use glam::DVec3;

use crate::bounds::Bounds;

/// Discrete voxel coordinate.
pub type VoxelIndex = [i64; 3];

/// Axis-aligned region in voxel-index space: per-axis offset plus extent.
///
/// Sizes are always non-negative; a region with a zero size on any axis is
/// considered empty. Regions are derived on demand from `Bounds` and never
/// outlive the buffer they describe, except transiently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelRegion {
  /// Minimum index per axis.
  pub index: [i64; 3],
  /// Extent per axis, in voxels.
  pub size: [u64; 3],
}

impl VoxelRegion {
  pub fn new(index: [i64; 3], size: [u64; 3]) -> Self {
    Self { index, size }
  }

  /// Region with no voxels.
  pub fn zero() -> Self {
    Self {
      index: [0; 3],
      size: [0; 3],
    }
  }

  /// Exclusive upper index on one axis.
  #[inline]
  pub fn end(&self, axis: usize) -> i64 {
    self.index[axis] + self.size[axis] as i64
  }

  /// Total number of voxels.
  pub fn num_voxels(&self) -> u64 {
    self.size[0] * self.size[1] * self.size[2]
  }

  pub fn is_empty(&self) -> bool {
    self.size.iter().any(|&s| s == 0)
  }

  /// True iff `index` lies within the region.
  #[inline]
  pub fn contains_index(&self, index: VoxelIndex) -> bool {
    (0..3).all(|a| self.index[a] <= index[a] && index[a] < self.end(a))
  }

  /// True iff `other` lies entirely within this region.
  pub fn contains(&self, other: &VoxelRegion) -> bool {
    (0..3).all(|a| self.index[a] <= other.index[a] && other.end(a) <= self.end(a))
  }

  /// Smallest region covering both inputs.
  pub fn bounding_box(&self, other: &VoxelRegion) -> VoxelRegion {
    let mut res = VoxelRegion::zero();
    for a in 0..3 {
      let min = self.index[a].min(other.index[a]);
      let max = (self.end(a) - 1).max(other.end(a) - 1);
      res.index[a] = min;
      res.size[a] = (max - min + 1) as u64;
    }
    res
  }

  /// Overlap of two regions, `None` when they are disjoint.
  pub fn intersection(&self, other: &VoxelRegion) -> Option<VoxelRegion> {
    let mut res = VoxelRegion::zero();
    for a in 0..3 {
      let min = self.index[a].max(other.index[a]);
      let end = self.end(a).min(other.end(a));
      if end <= min {
        return None;
      }
      res.index[a] = min;
      res.size[a] = (end - min) as u64;
    }
    Some(res)
  }

  /// Iterate all indices in the region, x fastest.
  pub fn iter_indices(&self) -> impl Iterator<Item = VoxelIndex> {
    let r = *self;
    (r.index[2]..r.end(2)).flat_map(move |k| {
      (r.index[1]..r.end(1)).flat_map(move |j| (r.index[0]..r.end(0)).map(move |i| [i, j, k]))
    })
  }
}

/// Affine map between voxel-index space and continuous nanometre space.
///
/// Spacing components must be strictly positive; zero spacing is a caller
/// contract violation and produces garbage indices, it is not defended
/// against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelGrid {
  /// Continuous-space coordinate of voxel index (0, 0, 0).
  pub origin: DVec3,
  /// Physical size of one voxel along each axis.
  pub spacing: DVec3,
}

impl VoxelGrid {
  pub fn new(origin: DVec3, spacing: DVec3) -> Self {
    debug_assert!(
      spacing.x > 0.0 && spacing.y > 0.0 && spacing.z > 0.0,
      "voxel spacing must be strictly positive"
    );
    Self { origin, spacing }
  }

  /// Grid with the given spacing and origin at zero.
  pub fn with_spacing(spacing: DVec3) -> Self {
    Self::new(DVec3::ZERO, spacing)
  }

  /// Index of the voxel whose centre is nearest to `p`.
  ///
  /// Rounds half away from zero on each axis.
  #[inline]
  pub fn index_for_point(&self, p: DVec3) -> VoxelIndex {
    let n = (p - self.origin) / self.spacing;
    [
      n.x.round() as i64,
      n.y.round() as i64,
      n.z.round() as i64,
    ]
  }

  /// Continuous-space centre of a voxel.
  #[inline]
  pub fn point_for_index(&self, index: VoxelIndex) -> DVec3 {
    self.origin
      + DVec3::new(index[0] as f64, index[1] as f64, index[2] as f64) * self.spacing
  }

  /// Per-axis `round(origin / spacing)`: the index shift between this grid's
  /// local frame and the origin-at-zero frame.
  #[inline]
  pub fn origin_shift(&self) -> [i64; 3] {
    let s = self.origin / self.spacing;
    [s.x.round() as i64, s.y.round() as i64, s.z.round() as i64]
  }

  /// Voxel region covering `bounds`, expressed in this grid's local frame.
  ///
  /// Per axis: `min = round(min / spacing)`, `size = round(max / spacing) -
  /// min + 1`. The inclusive upper bound means even a degenerate
  /// zero-thickness box maps to at least one voxel per axis. The result is
  /// shifted by `-origin_shift()` so it indexes the buffer directly.
  pub fn region_for_bounds(&self, bounds: &Bounds) -> VoxelRegion {
    let shift = self.origin_shift();
    let lo = bounds.min / self.spacing;
    let hi = bounds.max / self.spacing;
    let lo = [lo.x.round() as i64, lo.y.round() as i64, lo.z.round() as i64];
    let hi = [hi.x.round() as i64, hi.y.round() as i64, hi.z.round() as i64];

    let mut res = VoxelRegion::zero();
    for a in 0..3 {
      res.index[a] = lo[a] - shift[a];
      res.size[a] = (hi[a] - lo[a] + 1) as u64;
    }
    res
  }

  /// Continuous bounds of a local-frame region: inverse of
  /// `region_for_bounds` up to rounding.
  ///
  /// Per axis: `min = origin + index * spacing`, `max = min + (size - 1) *
  /// spacing`.
  pub fn bounds_for_region(&self, region: &VoxelRegion) -> Bounds {
    if region.is_empty() {
      return Bounds::empty();
    }
    let index = DVec3::new(
      region.index[0] as f64,
      region.index[1] as f64,
      region.index[2] as f64,
    );
    let span = DVec3::new(
      (region.size[0] - 1) as f64,
      (region.size[1] - 1) as f64,
      (region.size[2] - 1) as f64,
    );
    let min = self.origin + index * self.spacing;
    Bounds::new(min, min + span * self.spacing)
  }

  /// Region expressed as if the grid origin were zero.
  ///
  /// Two volumes with different origins but identical spacing compare and
  /// combine correctly in this common frame.
  pub fn normalized_region(&self, region: &VoxelRegion) -> VoxelRegion {
    let shift = self.origin_shift();
    VoxelRegion {
      index: [
        region.index[0] + shift[0],
        region.index[1] + shift[1],
        region.index[2] + shift[2],
      ],
      size: region.size,
    }
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
