//! volume_engine - region and voxel storage for interactive segmentation
//!
//! This crate stores labelled 3-D volumes (segmentations carved out of
//! microscopy channel stacks) as dense voxel buffers positioned in continuous
//! nanometre space, and grows them on demand as editing tools paint outside
//! the allocated region.
//!
//! # Features
//!
//! - **Grow-on-demand storage**: drawing outside the current box reallocates
//!   to the union region and block-copies the old contents
//! - **Edited-region tracking**: every mutation records its bounding box so
//!   persistence can rewrite only what changed
//! - **Brush stencils and contours**: implicit-function brushes and planar
//!   polygon rasterization for manual edition tools
//! - **MetaImage snapshots**: header + raw payload pairs that round-trip
//!   bounds, spacing and voxel contents exactly
//! - **Background edge detection**: off-thread per-slice margin scan for
//!   channel stacks acquired at an angle
//!
//! # Example
//!
//! ```ignore
//! use glam::DVec3;
//! use volume_engine::{Bounds, SegmentationVolume, SEG_VOXEL_VALUE};
//!
//! let bounds = Bounds::new(DVec3::ZERO, DVec3::splat(9.0));
//! let mut volume = SegmentationVolume::new(&bounds, DVec3::ONE);
//!
//! // Draw outside the allocated box; the buffer grows to fit
//! volume.draw_point(DVec3::splat(15.0), SEG_VOXEL_VALUE);
//! assert_eq!(volume.voxel([15, 15, 15]), SEG_VOXEL_VALUE);
//! ```

pub mod bounds;
pub use bounds::{bounding_box, Bounds};

pub mod grid;
pub use grid::{VoxelGrid, VoxelIndex, VoxelRegion};

pub mod buffer;
pub use buffer::{VolumeBuffer, Voxel, SEG_BG_VALUE, SEG_VOXEL_VALUE};

pub mod error;
pub use error::{SnapshotError, SnapshotResult, VolumeError};

// Edited-region bookkeeping for incremental persistence
pub mod tracker;
pub use tracker::EditedRegionTracker;

// Brush shapes and planar contours supplied by editing tools
pub mod stencil;
pub use stencil::{DiscStencil, Plane, PlanarContour, SphereStencil, Stencil};

pub mod volume;
pub use volume::{SegmentationVolume, VolumeId};

// Memoized read-only views for the external renderer
pub mod bridge;
pub use bridge::{RenderBridge, RenderView, ViewCache};

// MetaImage-style snapshot persistence
pub mod snapshot;
pub use snapshot::{MemoryStore, SnapshotEntry, SnapshotStore};

// Off-thread channel margin detection
pub mod margins;
pub use margins::{ChannelEdges, EdgeDetector, SliceEdges};
