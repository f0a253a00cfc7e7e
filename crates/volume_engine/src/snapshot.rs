//! Snapshot serialization of voxel buffers.
//!
//! A buffer persists as two entries in a key-to-blob archive: a small text
//! header describing geometry (`<prefix>.mhd`, MetaImage-style `Key = value`
//! lines) and the raw x-fastest voxel payload (`<prefix>.raw`). Edited
//! regions are dumped the same way, one pair per region, so persistence can
//! rewrite only what changed since the last checkpoint.

use std::collections::HashMap;

use glam::DVec3;
use tracing::warn;

use crate::bounds::Bounds;
use crate::buffer::VolumeBuffer;
use crate::error::{SnapshotError, SnapshotResult};
use crate::grid::{VoxelGrid, VoxelRegion};

/// Archive key prefix for volume snapshots.
pub const VOLUME_KIND: &str = "Volume";

/// One named blob destined for the persistence store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotEntry {
  /// Path-like archive key, e.g. `Volume/7.mhd`.
  pub name: String,
  pub data: Vec<u8>,
}

/// Read side of the external key-to-blob archive.
pub trait SnapshotStore {
  /// Blob stored under `name`, or `None` when absent.
  fn fetch(&self, name: &str) -> Option<Vec<u8>>;
}

/// In-memory store, used in tests and as a staging area before the real
/// archive is written.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
  blobs: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, entry: SnapshotEntry) {
    self.blobs.insert(entry.name, entry.data);
  }

  pub fn insert_all(&mut self, entries: impl IntoIterator<Item = SnapshotEntry>) {
    for entry in entries {
      self.insert(entry);
    }
  }

  pub fn len(&self) -> usize {
    self.blobs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.blobs.is_empty()
  }
}

impl SnapshotStore for MemoryStore {
  fn fetch(&self, name: &str) -> Option<Vec<u8>> {
    self.blobs.get(name).cloned()
  }
}

fn header_name(prefix: &str) -> String {
  format!("{VOLUME_KIND}/{prefix}.mhd")
}

fn payload_name(prefix: &str) -> String {
  format!("{VOLUME_KIND}/{prefix}.raw")
}

/// Serialize the full buffer as a header + payload entry pair.
pub fn dump(buffer: &VolumeBuffer, prefix: &str) -> Vec<SnapshotEntry> {
  let region = buffer.region();
  // World position of the first voxel; the region index folds into it, so a
  // restored buffer starts at index zero.
  let offset = buffer.grid().point_for_index(region.index);
  let spacing = buffer.spacing();

  let mut header = String::new();
  header.push_str("ObjectType = Image\n");
  header.push_str("NDims = 3\n");
  header.push_str("BinaryData = True\n");
  header.push_str("BinaryDataByteOrderMSB = False\n");
  header.push_str("CompressedData = False\n");
  header.push_str(&format!("Offset = {} {} {}\n", offset.x, offset.y, offset.z));
  header.push_str(&format!(
    "ElementSpacing = {} {} {}\n",
    spacing.x, spacing.y, spacing.z
  ));
  header.push_str(&format!(
    "DimSize = {} {} {}\n",
    region.size[0], region.size[1], region.size[2]
  ));
  header.push_str("ElementType = MET_UCHAR\n");
  header.push_str(&format!("ElementDataFile = {prefix}.raw\n"));

  vec![
    SnapshotEntry {
      name: header_name(prefix),
      data: header.into_bytes(),
    },
    SnapshotEntry {
      name: payload_name(prefix),
      data: buffer.voxels().to_vec(),
    },
  ]
}

/// Serialize only the tracked edited regions, one header/payload pair per
/// region, named `<prefix>_<ordinal>`.
///
/// Regions are clipped to the allocated buffer; a tracked region that no
/// longer overlaps the buffer (after a `fit_to_content`) is skipped.
pub fn dump_edited(
  buffer: &VolumeBuffer,
  regions: &[Bounds],
  prefix: &str,
) -> Vec<SnapshotEntry> {
  let mut entries = Vec::with_capacity(regions.len() * 2);
  for (ordinal, bounds) in regions.iter().enumerate() {
    let region = buffer.grid().region_for_bounds(bounds);
    let Some(clipped) = region.intersection(&buffer.region()) else {
      continue;
    };
    let sub = buffer.clone_region(clipped);
    entries.extend(dump(&sub, &format!("{prefix}_{ordinal}")));
  }
  entries
}

/// Restore a buffer dumped under `prefix`.
///
/// The restored buffer has its region index at zero with the original index
/// folded into the origin; bounds, spacing and voxel contents round-trip
/// exactly.
pub fn restore(store: &dyn SnapshotStore, prefix: &str) -> SnapshotResult<VolumeBuffer> {
  let header_key = header_name(prefix);
  let header = store
    .fetch(&header_key)
    .ok_or_else(|| SnapshotError::NotFound(header_key.clone()))?;
  let header = String::from_utf8(header).map_err(|_| SnapshotError::Corrupt {
    name: header_key.clone(),
    reason: "header is not valid UTF-8".into(),
  })?;

  let mut fields = HashMap::new();
  for line in header.lines() {
    if let Some((key, value)) = line.split_once('=') {
      fields.insert(key.trim().to_string(), value.trim().to_string());
    }
  }

  let corrupt = |reason: &str| SnapshotError::Corrupt {
    name: header_key.clone(),
    reason: reason.into(),
  };

  if fields.get("NDims").map(String::as_str) != Some("3") {
    return Err(corrupt("expected NDims = 3"));
  }
  if fields.get("ElementType").map(String::as_str) != Some("MET_UCHAR") {
    return Err(corrupt("unsupported element type"));
  }

  let size = parse_triple::<u64>(fields.get("DimSize")).ok_or_else(|| corrupt("bad DimSize"))?;
  let spacing =
    parse_triple::<f64>(fields.get("ElementSpacing")).ok_or_else(|| corrupt("bad ElementSpacing"))?;
  let offset = parse_triple::<f64>(fields.get("Offset")).ok_or_else(|| corrupt("bad Offset"))?;
  if spacing.iter().any(|&s| s <= 0.0) {
    return Err(corrupt("non-positive spacing"));
  }

  let payload_key = payload_name(prefix);
  let payload = store
    .fetch(&payload_key)
    .ok_or_else(|| SnapshotError::NotFound(payload_key.clone()))?;

  let region = VoxelRegion::new([0, 0, 0], size);
  if payload.len() as u64 != region.num_voxels() {
    return Err(SnapshotError::Corrupt {
      name: payload_key,
      reason: format!(
        "payload is {} bytes, region holds {} voxels",
        payload.len(),
        region.num_voxels()
      ),
    });
  }

  let grid = VoxelGrid::new(
    DVec3::new(offset[0], offset[1], offset[2]),
    DVec3::new(spacing[0], spacing[1], spacing[2]),
  );
  Ok(VolumeBuffer::from_parts(payload, region, grid))
}

/// Restore one previously dumped edited region by ordinal index.
///
/// Used to replay edits while reconstructing undo history.
pub fn restore_edited(
  store: &dyn SnapshotStore,
  prefix: &str,
  ordinal: usize,
) -> SnapshotResult<VolumeBuffer> {
  restore(store, &format!("{prefix}_{ordinal}")).inspect_err(|err| {
    warn!(prefix, ordinal, %err, "couldn't restore edited region");
  })
}

fn parse_triple<T: std::str::FromStr>(value: Option<&String>) -> Option<[T; 3]> {
  let mut parts = value?.split_whitespace();
  let a = parts.next()?.parse().ok()?;
  let b = parts.next()?.parse().ok()?;
  let c = parts.next()?.parse().ok()?;
  if parts.next().is_some() {
    return None;
  }
  Some([a, b, c])
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;
