//! Edited-region bookkeeping for incremental persistence.

use smallvec::SmallVec;

use crate::bounds::Bounds;

/// Insertion-ordered set of continuous-space boxes mutated since the last
/// persistence checkpoint.
///
/// Deduplication is containment-based only: a new box is dropped when some
/// already-tracked box fully contains it, but overlapping-but-not-contained
/// boxes both remain. The union of the tracked boxes covers all mutated
/// space; it is not a minimal cover. Downstream persistence relies on
/// one-region-per-edit granularity, so partial-overlap merging is
/// deliberately not performed here.
#[derive(Clone, Debug, Default)]
pub struct EditedRegionTracker {
  regions: SmallVec<[Bounds; 4]>,
}

impl EditedRegionTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a mutated box unless an already-tracked region fully contains it.
  pub fn add_region(&mut self, bounds: Bounds) {
    let included = self.regions.iter().any(|tracked| bounds.is_inside(tracked));
    if !included {
      self.regions.push(bounds);
    }
  }

  /// Tracked boxes in insertion order.
  pub fn tracked_regions(&self) -> &[Bounds] {
    &self.regions
  }

  /// Forget everything; invoked after a successful commit.
  pub fn clear(&mut self) {
    self.regions.clear();
  }

  pub fn len(&self) -> usize {
    self.regions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.regions.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use glam::DVec3;

  use super::*;

  fn b(min: f64, max: f64) -> Bounds {
    Bounds::new(DVec3::splat(min), DVec3::splat(max))
  }

  #[test]
  fn records_in_insertion_order() {
    let mut tracker = EditedRegionTracker::new();
    tracker.add_region(b(0.0, 5.0));
    tracker.add_region(b(20.0, 25.0));
    assert_eq!(tracker.tracked_regions(), &[b(0.0, 5.0), b(20.0, 25.0)]);
  }

  #[test]
  fn contained_region_is_dropped() {
    let mut tracker = EditedRegionTracker::new();
    tracker.add_region(b(0.0, 10.0));
    tracker.add_region(b(2.0, 5.0));
    assert_eq!(tracker.len(), 1);
  }

  #[test]
  fn partial_overlap_keeps_both() {
    let mut tracker = EditedRegionTracker::new();
    tracker.add_region(b(0.0, 10.0));
    tracker.add_region(b(5.0, 15.0));
    assert_eq!(tracker.len(), 2);
  }

  #[test]
  fn larger_region_is_still_appended() {
    // Containment check only looks one way: a new box covering an existing
    // one is appended, not substituted.
    let mut tracker = EditedRegionTracker::new();
    tracker.add_region(b(2.0, 5.0));
    tracker.add_region(b(0.0, 10.0));
    assert_eq!(tracker.len(), 2);
  }

  #[test]
  fn clear_resets() {
    let mut tracker = EditedRegionTracker::new();
    tracker.add_region(b(0.0, 1.0));
    tracker.clear();
    assert!(tracker.is_empty());
  }
}
