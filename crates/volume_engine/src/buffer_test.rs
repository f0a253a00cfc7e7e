use glam::DVec3;

use super::*;

fn ten_cubed() -> VolumeBuffer {
  VolumeBuffer::allocate(
    &Bounds::new(DVec3::ZERO, DVec3::splat(9.0)),
    DVec3::ONE,
  )
}

#[test]
fn allocate_is_zero_filled() {
  let buffer = ten_cubed();
  assert_eq!(buffer.region().size, [10, 10, 10]);
  assert!(buffer.voxels().iter().all(|&v| v == SEG_BG_VALUE));
  assert_eq!(buffer.bounds(), Bounds::new(DVec3::ZERO, DVec3::splat(9.0)));
}

#[test]
fn empty_buffer_has_empty_bounds() {
  let buffer = VolumeBuffer::empty();
  assert!(buffer.is_empty());
  assert!(!buffer.bounds().is_valid());
}

#[test]
fn set_and_read_voxel() {
  let mut buffer = ten_cubed();
  buffer.set_voxel([5, 5, 5], SEG_VOXEL_VALUE);
  assert_eq!(buffer.voxel([5, 5, 5]), SEG_VOXEL_VALUE);
  assert_eq!(buffer.voxel([5, 5, 4]), SEG_BG_VALUE);
}

#[test]
#[should_panic(expected = "outside allocated region")]
fn read_outside_region_panics() {
  let buffer = ten_cubed();
  buffer.voxel([10, 0, 0]);
}

#[test]
fn expand_noop_when_covered() {
  let mut buffer = ten_cubed();
  let before = buffer.region();
  let grew = buffer.expand_to_fit(&Bounds::new(DVec3::splat(2.0), DVec3::splat(5.0)));
  assert!(!grew);
  assert_eq!(buffer.region(), before);
}

#[test]
fn expand_preserves_data() {
  let mut buffer = ten_cubed();
  buffer.set_voxel([5, 5, 5], SEG_VOXEL_VALUE);

  let grew = buffer.expand_to_fit(&Bounds::point(DVec3::splat(15.0)));
  assert!(grew);
  assert_eq!(buffer.bounds(), Bounds::new(DVec3::ZERO, DVec3::splat(15.0)));
  assert_eq!(buffer.voxel([5, 5, 5]), SEG_VOXEL_VALUE);
  // Newly allocated space reads as background
  assert_eq!(buffer.voxel([12, 12, 12]), SEG_BG_VALUE);
  assert_eq!(buffer.voxel([15, 15, 15]), SEG_BG_VALUE);
}

#[test]
fn expand_below_current_origin() {
  let mut buffer = ten_cubed();
  buffer.set_voxel([0, 0, 0], 7);

  buffer.expand_to_fit(&Bounds::point(DVec3::splat(-4.0)));
  assert_eq!(buffer.region().index, [-4, -4, -4]);
  assert_eq!(buffer.region().size, [14, 14, 14]);
  assert_eq!(buffer.voxel([0, 0, 0]), 7);
  assert_eq!(buffer.voxel([-4, -4, -4]), SEG_BG_VALUE);
}

#[test]
fn expand_on_empty_allocates() {
  let mut buffer = VolumeBuffer::empty();
  let grew = buffer.expand_to_fit(&Bounds::new(DVec3::ZERO, DVec3::splat(3.0)));
  assert!(grew);
  assert_eq!(buffer.region().size, [4, 4, 4]);
}

#[test]
fn fill_region_sets_only_that_region() {
  let mut buffer = ten_cubed();
  buffer.fill_region(VoxelRegion::new([2, 2, 2], [3, 3, 3]), SEG_VOXEL_VALUE);
  assert_eq!(buffer.voxel([2, 2, 2]), SEG_VOXEL_VALUE);
  assert_eq!(buffer.voxel([4, 4, 4]), SEG_VOXEL_VALUE);
  assert_eq!(buffer.voxel([5, 5, 5]), SEG_BG_VALUE);
  assert_eq!(buffer.voxel([1, 2, 2]), SEG_BG_VALUE);
}

#[test]
fn clone_region_is_independent() {
  let mut buffer = ten_cubed();
  buffer.set_voxel([3, 3, 3], SEG_VOXEL_VALUE);

  let clone = buffer.clone_region(VoxelRegion::new([2, 2, 2], [4, 4, 4]));
  assert_eq!(clone.voxel([3, 3, 3]), SEG_VOXEL_VALUE);
  assert_eq!(clone.region().index, [2, 2, 2]);

  buffer.set_voxel([3, 3, 3], SEG_BG_VALUE);
  assert_eq!(clone.voxel([3, 3, 3]), SEG_VOXEL_VALUE);
}

#[test]
fn foreground_region_tight() {
  let mut buffer = ten_cubed();
  assert!(buffer.foreground_region().is_none());

  buffer.set_voxel([2, 3, 4], SEG_VOXEL_VALUE);
  buffer.set_voxel([6, 3, 4], SEG_VOXEL_VALUE);
  let region = buffer.foreground_region().unwrap();
  assert_eq!(region.index, [2, 3, 4]);
  assert_eq!(region.size, [5, 1, 1]);
}

#[test]
fn from_parts_checks_extent() {
  let grid = VoxelGrid::with_spacing(DVec3::ONE);
  let region = VoxelRegion::new([0, 0, 0], [2, 2, 2]);
  let buffer = VolumeBuffer::from_parts(vec![1; 8], region, grid);
  assert_eq!(buffer.voxel([1, 1, 1]), 1);
}

#[test]
#[should_panic(expected = "payload does not match")]
fn from_parts_rejects_bad_payload() {
  let grid = VoxelGrid::with_spacing(DVec3::ONE);
  VolumeBuffer::from_parts(vec![0; 7], VoxelRegion::new([0, 0, 0], [2, 2, 2]), grid);
}
