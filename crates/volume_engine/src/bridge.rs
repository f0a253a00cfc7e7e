//! Cached bridge to the rendering representation.
//!
//! The renderer consumes a read-only view of the voxel buffer. Building that
//! view copies the payload, so it is memoized with a version stamp: rebuild
//! only when the volume's modification counter differs from the counter
//! recorded at the last build. Skipping the stamp check would serve a stale
//! view after a draw; rebuilding unconditionally would be correct but wasteful.

use std::collections::HashMap;
use std::sync::Arc;

use glam::DVec3;

use crate::buffer::Voxel;
use crate::grid::VoxelRegion;
use crate::volume::{SegmentationVolume, VolumeId};

/// Immutable snapshot of a volume handed to the external renderer.
///
/// Cheap to clone; the payload is shared.
#[derive(Clone, Debug)]
pub struct RenderView {
  pub region: VoxelRegion,
  pub origin: DVec3,
  pub spacing: DVec3,
  pub voxels: Arc<[Voxel]>,
}

/// Memoized render view for one volume.
#[derive(Debug, Default)]
pub struct RenderBridge {
  view: Option<RenderView>,
  built_at: u64,
}

impl RenderBridge {
  pub fn new() -> Self {
    Self::default()
  }

  /// Current view, rebuilt only when the volume changed since the last build.
  pub fn view(&mut self, volume: &SegmentationVolume) -> &RenderView {
    let stamp = volume.modification_count();
    if self.view.is_none() || self.built_at != stamp {
      let buffer = volume.buffer();
      self.view = Some(RenderView {
        region: buffer.region(),
        origin: buffer.origin(),
        spacing: buffer.spacing(),
        voxels: buffer.voxels().into(),
      });
      self.built_at = stamp;
    }
    self.view.as_ref().unwrap()
  }

  /// True when a subsequent `view` call would rebuild.
  pub fn is_stale(&self, volume: &SegmentationVolume) -> bool {
    self.view.is_none() || self.built_at != volume.modification_count()
  }

  /// Drop the cached view; the next access rebuilds.
  pub fn invalidate(&mut self) {
    self.view = None;
  }
}

/// Render bridges for many volumes, keyed by volume id.
///
/// An explicit map with explicit invalidation, instead of a singleton cache
/// keyed by object pointers whose lifetime nobody owns.
#[derive(Debug, Default)]
pub struct ViewCache {
  bridges: HashMap<VolumeId, RenderBridge>,
}

impl ViewCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// View for `volume`, building or refreshing its bridge as needed.
  pub fn view(&mut self, volume: &SegmentationVolume) -> RenderView {
    self
      .bridges
      .entry(volume.id())
      .or_default()
      .view(volume)
      .clone()
  }

  /// Mark one volume's cached view stale.
  pub fn invalidate(&mut self, id: VolumeId) {
    if let Some(bridge) = self.bridges.get_mut(&id) {
      bridge.invalidate();
    }
  }

  /// Forget a destroyed volume entirely.
  pub fn remove(&mut self, id: VolumeId) {
    self.bridges.remove(&id);
  }

  pub fn len(&self) -> usize {
    self.bridges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bridges.is_empty()
  }
}
