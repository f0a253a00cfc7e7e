//! Background detection of a channel's usable edges.
//!
//! Stacks acquired at an angle leave dark margins around the imaged tissue;
//! tools need to know where the real data starts. `detect_edges` scans every
//! slice for voxels outside the `background ± threshold` band and reduces
//! each slice to its border quad, plus a running estimate of the enclosed
//! volume.
//!
//! The scan is linear in the stack size, so `EdgeDetector` runs it off-thread
//! on rayon's pool and publishes the result through a synchronized slot.
//! Readers that need the edges block on the slot; the completion channel lets
//! a frame loop poll instead.

use std::sync::{Arc, Condvar, Mutex};

use crossbeam_channel::{bounded, Receiver};
use glam::DVec3;
use rayon::spawn;
use tracing::{debug, warn};

use crate::buffer::{Voxel, VolumeBuffer};

/// Border quad of one slice: corners of the non-background extent, in
/// continuous space, wound `(xmin,ymin) (xmax,ymin) (xmax,ymax) (xmin,ymax)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliceEdges {
  /// Z index of the slice in the buffer's frame.
  pub slice: i64,
  pub corners: [DVec3; 4],
}

/// Result of one edge-detection pass over a channel volume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelEdges {
  /// One entry per slice containing any non-background voxel, bottom-up.
  pub slices: Vec<SliceEdges>,
  /// Volume enclosed by the per-slice borders, in cubic nanometres.
  pub computed_volume: f64,
}

#[inline]
fn in_background_band(value: Voxel, background: Voxel, threshold: Voxel) -> bool {
  value >= background.saturating_sub(threshold) && value <= background.saturating_add(threshold)
}

/// Scan `buffer` slice by slice for voxels outside the background band.
///
/// Slices that are entirely background contribute neither a quad nor volume.
pub fn detect_edges(buffer: &VolumeBuffer, background: Voxel, threshold: Voxel) -> ChannelEdges {
  let region = buffer.region();
  let grid = buffer.grid();
  let spacing = buffer.spacing();
  let slice_volume = spacing.x * spacing.y * spacing.z;

  let mut edges = ChannelEdges::default();
  for k in region.index[2]..region.end(2) {
    let mut lo = [i64::MAX; 2];
    let mut hi = [i64::MIN; 2];
    for j in region.index[1]..region.end(1) {
      for i in region.index[0]..region.end(0) {
        if !in_background_band(buffer.voxel([i, j, k]), background, threshold) {
          lo[0] = lo[0].min(i);
          hi[0] = hi[0].max(i);
          lo[1] = lo[1].min(j);
          hi[1] = hi[1].max(j);
        }
      }
    }
    if lo[0] > hi[0] {
      continue;
    }

    let p_min = grid.point_for_index([lo[0], lo[1], k]);
    let p_max = grid.point_for_index([hi[0], hi[1], k]);
    edges.slices.push(SliceEdges {
      slice: k,
      corners: [
        DVec3::new(p_min.x, p_min.y, p_min.z),
        DVec3::new(p_max.x, p_min.y, p_min.z),
        DVec3::new(p_max.x, p_max.y, p_min.z),
        DVec3::new(p_min.x, p_max.y, p_min.z),
      ],
    });
    let voxels = (hi[0] - lo[0] + 1) * (hi[1] - lo[1] + 1);
    edges.computed_volume += voxels as f64 * slice_volume;
  }
  edges
}

enum SlotState {
  Idle,
  Computing,
  Done(Arc<ChannelEdges>),
}

struct Slot {
  state: Mutex<SlotState>,
  ready: Condvar,
}

/// Asynchronous edge detection with a blocking result slot.
///
/// One detection at a time: a request made while one is in flight is rejected
/// rather than queued or cancelled. A finished result stays available until
/// the next successful request replaces it.
pub struct EdgeDetector {
  slot: Arc<Slot>,
}

impl EdgeDetector {
  pub fn new() -> Self {
    Self {
      slot: Arc::new(Slot {
        state: Mutex::new(SlotState::Idle),
        ready: Condvar::new(),
      }),
    }
  }

  /// Start detecting edges of `buffer` on the worker pool.
  ///
  /// Returns a completion receiver, or `None` when a detection is already
  /// running.
  pub fn compute(
    &self,
    buffer: VolumeBuffer,
    background: Voxel,
    threshold: Voxel,
  ) -> Option<Receiver<()>> {
    {
      let mut state = self.slot.state.lock().unwrap();
      if matches!(*state, SlotState::Computing) {
        warn!("edge detection already in progress, request rejected");
        return None;
      }
      *state = SlotState::Computing;
    }

    let (done_tx, done_rx) = bounded(1);
    let slot = Arc::clone(&self.slot);
    spawn(move || {
      let edges = detect_edges(&buffer, background, threshold);
      debug!(
        slices = edges.slices.len(),
        volume = edges.computed_volume,
        "edge detection finished"
      );
      *slot.state.lock().unwrap() = SlotState::Done(Arc::new(edges));
      slot.ready.notify_all();
      let _ = done_tx.send(());
    });
    Some(done_rx)
  }

  /// Latest result, blocking while a detection is in flight.
  ///
  /// `None` when no detection has ever been requested.
  pub fn edges(&self) -> Option<Arc<ChannelEdges>> {
    let mut state = self.slot.state.lock().unwrap();
    while matches!(*state, SlotState::Computing) {
      state = self.slot.ready.wait(state).unwrap();
    }
    match &*state {
      SlotState::Done(edges) => Some(Arc::clone(edges)),
      _ => None,
    }
  }

  /// Latest result without blocking; `None` while computing or never run.
  pub fn try_edges(&self) -> Option<Arc<ChannelEdges>> {
    match &*self.slot.state.lock().unwrap() {
      SlotState::Done(edges) => Some(Arc::clone(edges)),
      _ => None,
    }
  }

  pub fn is_computing(&self) -> bool {
    matches!(*self.slot.state.lock().unwrap(), SlotState::Computing)
  }
}

impl Default for EdgeDetector {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
#[path = "margins_test.rs"]
mod margins_test;
