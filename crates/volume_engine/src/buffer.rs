//! Dense voxel storage with grow-on-demand reallocation.
//!
//! A `VolumeBuffer` owns a contiguous x-fastest voxel array sized to its
//! current index region. Growth happens by arena-style reallocation: allocate
//! a zero-filled array covering the union region, block-copy the old voxels
//! translated into the new frame, and swap the storage in a single
//! assignment. Growth can occur on any side, including below the current
//! origin, because edits land anywhere in continuous space.

use glam::DVec3;
use tracing::debug;

use crate::bounds::{bounding_box, Bounds};
use crate::grid::{VoxelGrid, VoxelIndex, VoxelRegion};

/// Stored voxel sample.
pub type Voxel = u8;

/// Value painted into foreground voxels of a segmentation.
pub const SEG_VOXEL_VALUE: Voxel = 255;

/// Background (unset) voxel value.
pub const SEG_BG_VALUE: Voxel = 0;

/// Dense 3-D voxel array positioned in continuous space.
///
/// The allocated region always covers every box that has been drawn into the
/// buffer since creation; `expand_to_fit` enforces this and nothing ever
/// violates it silently. The buffer is exclusively owned by one
/// `SegmentationVolume` at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeBuffer {
  voxels: Vec<Voxel>,
  region: VoxelRegion,
  grid: VoxelGrid,
}

impl VolumeBuffer {
  /// Buffer with no storage. Spacing defaults to one until allocated.
  pub fn empty() -> Self {
    Self {
      voxels: Vec::new(),
      region: VoxelRegion::zero(),
      grid: VoxelGrid::with_spacing(DVec3::ONE),
    }
  }

  /// Allocate a zero-filled buffer covering `bounds`, origin at zero.
  pub fn allocate(bounds: &Bounds, spacing: DVec3) -> Self {
    let grid = VoxelGrid::with_spacing(spacing);
    let region = grid.region_for_bounds(bounds);
    Self::zeroed(region, grid)
  }

  /// Allocate a zero-filled buffer over an index region.
  pub fn zeroed(region: VoxelRegion, grid: VoxelGrid) -> Self {
    Self {
      voxels: vec![SEG_BG_VALUE; region.num_voxels() as usize],
      region,
      grid,
    }
  }

  /// Wrap an externally produced voxel array.
  ///
  /// # Panics
  /// Panics if the payload length does not match the region extent.
  pub fn from_parts(voxels: Vec<Voxel>, region: VoxelRegion, grid: VoxelGrid) -> Self {
    assert_eq!(
      voxels.len() as u64,
      region.num_voxels(),
      "voxel payload does not match region extent"
    );
    Self {
      voxels,
      region,
      grid,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.region.is_empty()
  }

  /// Current allocated region, in this buffer's local index frame.
  pub fn region(&self) -> VoxelRegion {
    self.region
  }

  /// Allocated region in the origin-at-zero frame.
  pub fn normalized_region(&self) -> VoxelRegion {
    self.grid.normalized_region(&self.region)
  }

  pub fn grid(&self) -> VoxelGrid {
    self.grid
  }

  pub fn spacing(&self) -> DVec3 {
    self.grid.spacing
  }

  pub fn origin(&self) -> DVec3 {
    self.grid.origin
  }

  /// Continuous bounds of the allocated region; the empty sentinel for an
  /// unallocated buffer.
  pub fn bounds(&self) -> Bounds {
    self.grid.bounds_for_region(&self.region)
  }

  /// Raw voxel payload, x fastest.
  pub fn voxels(&self) -> &[Voxel] {
    &self.voxels
  }

  #[inline]
  fn offset(&self, index: VoxelIndex) -> usize {
    let dx = (index[0] - self.region.index[0]) as usize;
    let dy = (index[1] - self.region.index[1]) as usize;
    let dz = (index[2] - self.region.index[2]) as usize;
    (dz * self.region.size[1] as usize + dy) * self.region.size[0] as usize + dx
  }

  /// Read one voxel.
  ///
  /// # Panics
  /// Panics when `index` lies outside the allocated region; indexing outside
  /// the buffer is a caller contract violation.
  #[inline]
  pub fn voxel(&self, index: VoxelIndex) -> Voxel {
    assert!(
      self.region.contains_index(index),
      "voxel index {index:?} outside allocated region {:?}",
      self.region
    );
    self.voxels[self.offset(index)]
  }

  /// Write one voxel. Same contract as `voxel`.
  #[inline]
  pub fn set_voxel(&mut self, index: VoxelIndex, value: Voxel) {
    assert!(
      self.region.contains_index(index),
      "voxel index {index:?} outside allocated region {:?}",
      self.region
    );
    let offset = self.offset(index);
    self.voxels[offset] = value;
  }

  /// Iterate `(index, value)` over a sub-region, x fastest.
  ///
  /// The region must lie inside the allocated region.
  pub fn iter_region(&self, region: VoxelRegion) -> impl Iterator<Item = (VoxelIndex, Voxel)> + '_ {
    debug_assert!(self.region.contains(&region));
    region.iter_indices().map(move |i| (i, self.voxels[self.offset(i)]))
  }

  /// Set every voxel of a sub-region to `value`.
  pub fn fill_region(&mut self, region: VoxelRegion, value: Voxel) {
    debug_assert!(self.region.contains(&region));
    for k in region.index[2]..region.end(2) {
      for j in region.index[1]..region.end(1) {
        let start = self.offset([region.index[0], j, k]);
        let end = start + region.size[0] as usize;
        self.voxels[start..end].fill(value);
      }
    }
  }

  /// Block-copy `region` from `src` into this buffer.
  ///
  /// Both buffers must cover `region` in a common index frame.
  pub fn copy_region_from(&mut self, src: &VolumeBuffer, region: VoxelRegion) {
    debug_assert!(self.region.contains(&region));
    debug_assert!(src.region.contains(&region));
    for k in region.index[2]..region.end(2) {
      for j in region.index[1]..region.end(1) {
        let row = [region.index[0], j, k];
        let src_start = src.offset(row);
        let dst_start = self.offset(row);
        let len = region.size[0] as usize;
        self.voxels[dst_start..dst_start + len]
          .copy_from_slice(&src.voxels[src_start..src_start + len]);
      }
    }
  }

  /// Grow storage so that `bounds` lies inside the allocated region.
  ///
  /// No-op when the current region already covers `bounds` (the buffer is
  /// untouched and any derived views stay valid). Otherwise reallocates to
  /// the union of the current and requested bounds, copies the old region
  /// into the new frame and swaps the storage in one assignment; voxels
  /// outside the copied overlap start zero-filled, so stale memory is never
  /// visible. Returns whether a reallocation happened.
  ///
  /// Never shrinks.
  pub fn expand_to_fit(&mut self, bounds: &Bounds) -> bool {
    if self.is_empty() {
      *self = Self::zeroed(self.grid.region_for_bounds(bounds), self.grid);
      return true;
    }

    let current = self.bounds();
    if bounds.is_inside(&current) {
      return false;
    }

    let expanded = bounding_box(&current, bounds);
    let mut next = Self::zeroed(self.grid.region_for_bounds(&expanded), self.grid);
    debug!(
      from = %current,
      to = %expanded,
      "expanding volume buffer"
    );
    next.copy_region_from(self, self.region);
    *self = next;
    true
  }

  /// Independent copy of a sub-region.
  ///
  /// The region must lie inside the allocated region.
  pub fn clone_region(&self, region: VoxelRegion) -> VolumeBuffer {
    assert!(
      self.region.contains(&region),
      "clone region {region:?} outside allocated region {:?}",
      self.region
    );
    let mut out = Self::zeroed(region, self.grid);
    out.copy_region_from(self, region);
    out
  }

  /// Tight region of all non-background voxels, `None` when the whole buffer
  /// is background.
  pub fn foreground_region(&self) -> Option<VoxelRegion> {
    let mut lo = [i64::MAX; 3];
    let mut hi = [i64::MIN; 3];
    let mut found = false;

    for (index, value) in self.iter_region(self.region) {
      if value != SEG_BG_VALUE {
        found = true;
        for a in 0..3 {
          lo[a] = lo[a].min(index[a]);
          hi[a] = hi[a].max(index[a]);
        }
      }
    }

    found.then(|| {
      VoxelRegion::new(
        lo,
        [
          (hi[0] - lo[0] + 1) as u64,
          (hi[1] - lo[1] + 1) as u64,
          (hi[2] - lo[2] + 1) as u64,
        ],
      )
    })
  }
}

#[cfg(test)]
#[path = "buffer_test.rs"]
mod buffer_test;
