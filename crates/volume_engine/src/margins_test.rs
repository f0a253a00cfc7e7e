use glam::DVec3;

use crate::bounds::Bounds;
use crate::buffer::SEG_VOXEL_VALUE;
use crate::volume::SegmentationVolume;

use super::*;

fn channel_with_tissue() -> VolumeBuffer {
  // 10x10x3 channel, dark except a bright rectangle on the middle slice
  let mut volume = SegmentationVolume::new(
    &Bounds::new(DVec3::ZERO, DVec3::new(9.0, 9.0, 2.0)),
    DVec3::ONE,
  );
  volume.fill_bounds(
    &Bounds::new(DVec3::new(2.0, 3.0, 1.0), DVec3::new(6.0, 8.0, 1.0)),
    SEG_VOXEL_VALUE,
  );
  volume.clone_volume()
}

#[test]
fn detects_border_quad_of_bright_slice() {
  let edges = detect_edges(&channel_with_tissue(), 0, 10);

  assert_eq!(edges.slices.len(), 1);
  let slice = &edges.slices[0];
  assert_eq!(slice.slice, 1);
  assert_eq!(slice.corners[0], DVec3::new(2.0, 3.0, 1.0));
  assert_eq!(slice.corners[2], DVec3::new(6.0, 8.0, 1.0));
}

#[test]
fn computed_volume_counts_border_extent() {
  let edges = detect_edges(&channel_with_tissue(), 0, 10);
  // 5 x 6 voxels on one slice, unit spacing
  assert_eq!(edges.computed_volume, 30.0);
}

#[test]
fn all_background_yields_no_edges() {
  let volume = SegmentationVolume::new(&Bounds::new(DVec3::ZERO, DVec3::splat(4.0)), DVec3::ONE);
  let edges = detect_edges(&volume.clone_volume(), 0, 0);
  assert!(edges.slices.is_empty());
  assert_eq!(edges.computed_volume, 0.0);
}

#[test]
fn background_band_swallows_noise() {
  let mut volume =
    SegmentationVolume::new(&Bounds::new(DVec3::ZERO, DVec3::splat(4.0)), DVec3::ONE);
  // Faint noise inside the band, one genuine voxel outside it
  volume.draw_voxel([1, 1, 1], 8);
  volume.draw_voxel([3, 3, 2], 200);

  let edges = detect_edges(&volume.clone_volume(), 0, 10);
  assert_eq!(edges.slices.len(), 1);
  assert_eq!(edges.slices[0].slice, 2);
  assert_eq!(edges.slices[0].corners[0], DVec3::new(3.0, 3.0, 2.0));
}

#[test]
fn spacing_scales_computed_volume() {
  let mut volume = SegmentationVolume::new(
    &Bounds::new(DVec3::ZERO, DVec3::new(4.0, 4.0, 8.0)),
    DVec3::new(1.0, 1.0, 2.0),
  );
  volume.draw_voxel([2, 2, 1], SEG_VOXEL_VALUE);

  let edges = detect_edges(&volume.clone_volume(), 0, 0);
  // One voxel, 1 x 1 x 2 nm
  assert_eq!(edges.computed_volume, 2.0);
}

#[test]
fn detector_publishes_through_slot() {
  let detector = EdgeDetector::new();
  assert!(detector.edges().is_none());

  let done = detector
    .compute(channel_with_tissue(), 0, 10)
    .expect("no detection should be in flight");
  done.recv().unwrap();

  let edges = detector.edges().expect("result should be published");
  assert_eq!(edges.slices.len(), 1);
  assert!(!detector.is_computing());
  assert!(detector.try_edges().is_some());
}

#[test]
fn blocking_read_waits_for_worker() {
  let detector = EdgeDetector::new();
  detector
    .compute(channel_with_tissue(), 0, 10)
    .expect("no detection should be in flight");

  // No recv first: edges() itself must block until the worker publishes
  let edges = detector.edges().expect("result should be published");
  assert_eq!(edges.computed_volume, 30.0);
}

#[test]
fn finished_result_survives_until_replaced() {
  let detector = EdgeDetector::new();
  let done = detector.compute(channel_with_tissue(), 0, 10).unwrap();
  done.recv().unwrap();
  let first = detector.edges().unwrap();

  // A second request is accepted once the first finished
  let done = detector
    .compute(channel_with_tissue(), 0, 255)
    .expect("detector should be idle again");
  done.recv().unwrap();
  let second = detector.edges().unwrap();

  assert_eq!(first.slices.len(), 1);
  // Threshold 255 puts everything in the background band
  assert!(second.slices.is_empty());
}
