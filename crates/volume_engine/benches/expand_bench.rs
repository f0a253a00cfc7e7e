//! Benchmarks for buffer growth and draw workloads.
//!
//! The workloads mirror interactive editing: repeated small brush strokes
//! that occasionally force the buffer to reallocate, and block fills over
//! volumes the size of a typical segmentation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::DVec3;
use volume_engine::{Bounds, SegmentationVolume, SphereStencil, Stencil, SEG_VOXEL_VALUE};

const SIDES: [u64; 3] = [32, 64, 128];

fn cube(side: u64) -> Bounds {
  Bounds::new(DVec3::ZERO, DVec3::splat((side - 1) as f64))
}

/// Grow a volume to double its side, forcing a full reallocate + copy.
fn bench_expand(c: &mut Criterion) {
  let mut group = c.benchmark_group("expand_to_double");
  for side in SIDES {
    group.throughput(Throughput::Elements(side * side * side));
    group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
      b.iter(|| {
        let mut volume = SegmentationVolume::new(&cube(side), DVec3::ONE);
        volume.draw_point(DVec3::splat((2 * side - 1) as f64), SEG_VOXEL_VALUE);
        black_box(volume.bounds())
      })
    });
  }
  group.finish();
}

/// Fill the whole volume, the fastest path through the buffer.
fn bench_fill(c: &mut Criterion) {
  let mut group = c.benchmark_group("fill_volume");
  for side in SIDES {
    group.throughput(Throughput::Elements(side * side * side));
    let mut volume = SegmentationVolume::new(&cube(side), DVec3::ONE);
    group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
      b.iter(|| {
        volume.fill(SEG_VOXEL_VALUE);
        black_box(volume.modification_count())
      })
    });
  }
  group.finish();
}

/// Spherical brush strokes inside an already-allocated volume.
fn bench_stencil(c: &mut Criterion) {
  let mut group = c.benchmark_group("draw_sphere_stencil");
  for radius in [4.0, 8.0, 16.0] {
    let mut volume = SegmentationVolume::new(&cube(128), DVec3::ONE);
    let brush = SphereStencil::new(DVec3::splat(64.0), radius);
    group.bench_with_input(
      BenchmarkId::from_parameter(radius as u64),
      &radius,
      |b, _| {
        b.iter(|| {
          volume.draw_stencil(&brush, &brush.bounds(), SEG_VOXEL_VALUE);
          black_box(volume.modification_count())
        })
      },
    );
  }
  group.finish();
}

criterion_group!(benches, bench_expand, bench_fill, bench_stencil);
criterion_main!(benches);
