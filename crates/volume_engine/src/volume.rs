//! SegmentationVolume - the public editing API over a voxel buffer.
//!
//! Every mutating operation follows the same skeleton: compute the affected
//! continuous-space box, register it with the edited-region tracker, grow the
//! buffer to cover it, mutate, then bump the modification counter. Storage
//! only ever shrinks through the explicit `fit_to_content`.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec3;
use tracing::debug;

use crate::bounds::Bounds;
use crate::buffer::{Voxel, VolumeBuffer};
use crate::error::VolumeError;
use crate::grid::{VoxelIndex, VoxelRegion};
use crate::snapshot::{self, SnapshotEntry};
use crate::stencil::{PlanarContour, Stencil};
use crate::tracker::EditedRegionTracker;

/// Atomic counter for generating unique volume ids.
static VOLUME_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque volume identifier.
///
/// Generated atomically - unique within process lifetime. Used as the key of
/// derived-view caches instead of raw pointers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct VolumeId(u64);

impl VolumeId {
  pub fn new() -> Self {
    Self(VOLUME_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl Default for VolumeId {
  fn default() -> Self {
    Self::new()
  }
}

/// A segmentation (or channel) positioned in continuous space, owning its
/// voxel buffer and the record of where it has been edited.
///
/// Single-threaded by contract: a volume is exclusively owned and mutated by
/// one logical owner at a time.
#[derive(Debug)]
pub struct SegmentationVolume {
  id: VolumeId,
  buffer: VolumeBuffer,
  edited: EditedRegionTracker,
  modifications: u64,
}

impl SegmentationVolume {
  /// Create a zero-filled volume covering `bounds`.
  pub fn new(bounds: &Bounds, spacing: DVec3) -> Self {
    Self::from_buffer(VolumeBuffer::allocate(bounds, spacing))
  }

  /// Wrap an existing buffer (e.g. a filter output or a restored snapshot).
  pub fn from_buffer(buffer: VolumeBuffer) -> Self {
    Self {
      id: VolumeId::new(),
      buffer,
      edited: EditedRegionTracker::new(),
      modifications: 0,
    }
  }

  pub fn id(&self) -> VolumeId {
    self.id
  }

  pub fn buffer(&self) -> &VolumeBuffer {
    &self.buffer
  }

  pub fn bounds(&self) -> Bounds {
    self.buffer.bounds()
  }

  pub fn spacing(&self) -> DVec3 {
    self.buffer.spacing()
  }

  /// Counter bumped by every mutation; derived views compare against it.
  pub fn modification_count(&self) -> u64 {
    self.modifications
  }

  /// Read one voxel by index.
  pub fn voxel(&self, index: VoxelIndex) -> Voxel {
    self.buffer.voxel(index)
  }

  /// Value of the voxel nearest to a continuous-space point.
  pub fn voxel_at(&self, p: DVec3) -> Voxel {
    self.buffer.voxel(self.buffer.grid().index_for_point(p))
  }

  /// Bump the modification counter. Called by every mutating operation;
  /// public so the undo layer can invalidate derived views after swapping
  /// buffers wholesale.
  pub fn mark_modified(&mut self) {
    self.modifications += 1;
  }

  /// Paint the voxel nearest to `(x, y, z)`.
  pub fn draw_point(&mut self, p: DVec3, value: Voxel) {
    let bounds = Bounds::point(p);
    self.edited.add_region(bounds);
    self.buffer.expand_to_fit(&bounds);

    let index = self.buffer.grid().index_for_point(p);
    self.buffer.set_voxel(index, value);
    self.mark_modified();
  }

  /// Paint a single voxel at an already-resolved index (no rounding).
  pub fn draw_voxel(&mut self, index: VoxelIndex, value: Voxel) {
    let bounds = Bounds::point(self.buffer.grid().point_for_index(index));
    self.edited.add_region(bounds);
    self.buffer.expand_to_fit(&bounds);

    self.buffer.set_voxel(index, value);
    self.mark_modified();
  }

  /// Paint every voxel of `bounds` whose centre lies inside the stencil
  /// (`stencil.value(centre) <= 0`).
  pub fn draw_stencil(&mut self, stencil: &dyn Stencil, bounds: &Bounds, value: Voxel) {
    self.edited.add_region(*bounds);
    self.buffer.expand_to_fit(bounds);

    let grid = self.buffer.grid();
    let region = grid.region_for_bounds(bounds);
    for index in region.iter_indices() {
      let center = grid.point_for_index(index);
      if stencil.value(center) <= 0.0 {
        self.buffer.set_voxel(index, value);
      }
    }
    self.mark_modified();
  }

  /// Rasterize a closed planar contour onto the slice nearest to `slice`.
  ///
  /// The slice is snapped to the voxel plane at or below `slice +
  /// spacing/2`: plain rounding can land one slice above the one the user is
  /// looking at when drawing with slice fitting, so a round that overshoots
  /// falls back to the floor.
  ///
  /// Contours with fewer than three vertices paint nothing.
  pub fn draw_contour(&mut self, contour: &PlanarContour, slice: f64, value: Voxel) {
    let Some((lo, hi)) = contour.in_plane_bounds() else {
      return;
    };

    let plane = contour.plane();
    let normal = plane.normal_axis();
    let (ua, va) = plane.in_plane_axes();
    let spacing = self.buffer.spacing();

    let sn = spacing[normal];
    let mut slice_pos = ((slice + sn / 2.0) / sn).round() * sn;
    if slice_pos > slice + sn / 2.0 {
      slice_pos = ((slice + sn / 2.0) / sn).floor() * sn;
    }

    // Snap the in-plane bounds to voxel multiples before tracking, so the
    // edited region matches what actually gets painted.
    let mut min = DVec3::ZERO;
    let mut max = DVec3::ZERO;
    min[ua] = (lo.x / spacing[ua]).round() * spacing[ua];
    max[ua] = (hi.x / spacing[ua]).round() * spacing[ua];
    min[va] = (lo.y / spacing[va]).round() * spacing[va];
    max[va] = (hi.y / spacing[va]).round() * spacing[va];
    min[normal] = slice_pos;
    max[normal] = slice_pos;
    let bounds = Bounds::new(min, max);

    self.edited.add_region(bounds);
    self.buffer.expand_to_fit(&bounds);

    let grid = self.buffer.grid();
    let region = grid.region_for_bounds(&bounds);
    for index in region.iter_indices() {
      let center = grid.point_for_index(index);
      if contour.contains(center[ua], center[va]) {
        self.buffer.set_voxel(index, value);
      }
    }
    self.mark_modified();
  }

  /// Block-copy another buffer's voxels into this volume over the other's
  /// box, expanding first if necessary. Every voxel of the source region is
  /// copied, background included (overwrite semantics).
  ///
  /// An unallocated volume simply adopts the drawn buffer.
  pub fn draw_volume(&mut self, other: &VolumeBuffer) {
    let drawn = other.bounds();
    self.edited.add_region(drawn);

    if self.buffer.is_empty() {
      self.buffer = other.clone();
      self.mark_modified();
      return;
    }

    self.buffer.expand_to_fit(&drawn);

    // Map through continuous space so volumes with different origins land on
    // the right voxels.
    let src_grid = other.grid();
    let dst_grid = self.buffer.grid();
    for (src_index, voxel) in other.iter_region(other.region()) {
      let index = dst_grid.index_for_point(src_grid.point_for_index(src_index));
      self.buffer.set_voxel(index, voxel);
    }
    self.mark_modified();
  }

  /// Set every voxel of the whole volume to `value`.
  pub fn fill(&mut self, value: Voxel) {
    let bounds = self.bounds();
    self.fill_bounds(&bounds, value);
  }

  /// Set every voxel in `bounds` to `value`, expanding first if necessary.
  pub fn fill_bounds(&mut self, bounds: &Bounds, value: Voxel) {
    self.edited.add_region(*bounds);
    self.buffer.expand_to_fit(bounds);

    let region = self.buffer.grid().region_for_bounds(bounds);
    self.buffer.fill_region(region, value);
    self.mark_modified();
  }

  /// Read-only copy of the whole volume.
  pub fn clone_volume(&self) -> VolumeBuffer {
    self.buffer.clone_region(self.buffer.region())
  }

  /// Read-only copy of a sub-box.
  pub fn clone_volume_bounds(&self, bounds: &Bounds) -> VolumeBuffer {
    let region = self.buffer.grid().region_for_bounds(bounds);
    self.buffer.clone_region(region)
  }

  /// Read-only copy of an index region.
  pub fn clone_volume_region(&self, region: VoxelRegion) -> VolumeBuffer {
    self.buffer.clone_region(region)
  }

  /// Shrink storage to the tight bounding box of all foreground voxels.
  ///
  /// Returns whether a shrink occurred. Fails with `EmptyVolume` when there
  /// is no foreground; the volume is left unchanged in that case.
  pub fn fit_to_content(&mut self) -> Result<bool, VolumeError> {
    let tight = self
      .buffer
      .foreground_region()
      .ok_or(VolumeError::EmptyVolume)?;

    if tight == self.buffer.region() {
      return Ok(false);
    }

    debug!(volume = self.id.raw(), "fitting volume to content");
    self.buffer = self.buffer.clone_region(tight);
    self.mark_modified();
    Ok(true)
  }

  /// Replace the buffer wholesale (undo restore, filter re-run).
  pub fn restore_buffer(&mut self, buffer: VolumeBuffer) {
    self.buffer = buffer;
    self.mark_modified();
  }

  /// Boxes mutated since the last checkpoint, in insertion order.
  pub fn edited_regions(&self) -> &[Bounds] {
    self.edited.tracked_regions()
  }

  /// Snapshot entries for every tracked edited region, named under `prefix`.
  ///
  /// Persistence writes these to the archive and then calls
  /// `clear_edited_regions`.
  pub fn commit_edited_regions(&self, prefix: &str) -> Vec<SnapshotEntry> {
    snapshot::dump_edited(&self.buffer, self.edited.tracked_regions(), prefix)
  }

  /// Drop the edited-region record after a successful commit.
  pub fn clear_edited_regions(&mut self) {
    self.edited.clear();
  }
}

#[cfg(test)]
#[path = "volume_test.rs"]
mod volume_test;
