//! Brush stencils and planar contours supplied by editing tools.
//!
//! A `Stencil` is an implicit function over continuous space: a voxel whose
//! centre evaluates to `<= 0` is inside the brush. Editing tools hand these
//! to `SegmentationVolume::draw_stencil`; the engine never constructs them
//! itself.

use glam::{DVec2, DVec3};

use crate::bounds::Bounds;

/// Implicit brush shape evaluated at voxel centres.
pub trait Stencil {
  /// Signed value at `p`: `<= 0` inside the brush, `> 0` outside.
  fn value(&self, p: DVec3) -> f64;

  /// Continuous box containing the whole brush.
  fn bounds(&self) -> Bounds;
}

/// Spherical brush.
#[derive(Clone, Copy, Debug)]
pub struct SphereStencil {
  pub center: DVec3,
  pub radius: f64,
}

impl SphereStencil {
  pub fn new(center: DVec3, radius: f64) -> Self {
    Self { center, radius }
  }
}

impl Stencil for SphereStencil {
  fn value(&self, p: DVec3) -> f64 {
    (p - self.center).length() - self.radius
  }

  fn bounds(&self) -> Bounds {
    Bounds::new(
      self.center - DVec3::splat(self.radius),
      self.center + DVec3::splat(self.radius),
    )
  }
}

/// Flat disc brush: a circle in one canonical plane with a small thickness
/// along the plane normal (typically one slice).
#[derive(Clone, Copy, Debug)]
pub struct DiscStencil {
  pub center: DVec3,
  pub radius: f64,
  pub plane: Plane,
  /// Half-thickness along the plane normal.
  pub half_thickness: f64,
}

impl DiscStencil {
  pub fn new(center: DVec3, radius: f64, plane: Plane, half_thickness: f64) -> Self {
    Self {
      center,
      radius,
      plane,
      half_thickness,
    }
  }
}

impl Stencil for DiscStencil {
  fn value(&self, p: DVec3) -> f64 {
    let (u, v) = self.plane.in_plane_axes();
    let n = self.plane.normal_axis();
    let d = p - self.center;
    let radial = DVec2::new(d[u], d[v]).length() - self.radius;
    let axial = d[n].abs() - self.half_thickness;
    radial.max(axial)
  }

  fn bounds(&self) -> Bounds {
    let (u, v) = self.plane.in_plane_axes();
    let n = self.plane.normal_axis();
    let mut half = DVec3::ZERO;
    half[u] = self.radius;
    half[v] = self.radius;
    half[n] = self.half_thickness;
    Bounds::new(self.center - half, self.center + half)
  }
}

/// Canonical slicing plane of the image stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
  /// XY plane, slices stacked along Z.
  Axial,
  /// XZ plane, slices stacked along Y.
  Coronal,
  /// YZ plane, slices stacked along X.
  Sagittal,
}

impl Plane {
  /// Axis perpendicular to the plane.
  #[inline]
  pub fn normal_axis(&self) -> usize {
    match self {
      Plane::Axial => 2,
      Plane::Coronal => 1,
      Plane::Sagittal => 0,
    }
  }

  /// The two world axes spanning the plane, in `(u, v)` order.
  #[inline]
  pub fn in_plane_axes(&self) -> (usize, usize) {
    match self {
      Plane::Axial => (0, 1),
      Plane::Coronal => (0, 2),
      Plane::Sagittal => (1, 2),
    }
  }
}

/// Closed 2-D polygon drawn in one of the canonical planes.
///
/// Vertices are `(u, v)` pairs in the plane's world axes; the contour is
/// implicitly closed from the last vertex back to the first.
#[derive(Clone, Debug)]
pub struct PlanarContour {
  plane: Plane,
  points: Vec<DVec2>,
}

impl PlanarContour {
  pub fn new(plane: Plane, points: Vec<DVec2>) -> Self {
    Self { plane, points }
  }

  pub fn plane(&self) -> Plane {
    self.plane
  }

  pub fn points(&self) -> &[DVec2] {
    &self.points
  }

  /// In-plane bounding rectangle, `None` for a contour with no vertices.
  pub fn in_plane_bounds(&self) -> Option<(DVec2, DVec2)> {
    let first = *self.points.first()?;
    let mut min = first;
    let mut max = first;
    for p in &self.points[1..] {
      min = min.min(*p);
      max = max.max(*p);
    }
    Some((min, max))
  }

  /// Even-odd point-in-polygon test against the closed contour.
  pub fn contains(&self, u: f64, v: f64) -> bool {
    let n = self.points.len();
    if n < 3 {
      return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
      let pi = self.points[i];
      let pj = self.points[j];
      if (pi.y > v) != (pj.y > v) {
        let cross = (pj.x - pi.x) * (v - pi.y) / (pj.y - pi.y) + pi.x;
        if u < cross {
          inside = !inside;
        }
      }
      j = i;
    }
    inside
  }
}
