//! Error types for recoverable engine failures.
//!
//! Geometric contract violations (zero spacing, inverted boxes, out-of-region
//! indexing) are programmer errors and are not represented here; they panic
//! or produce garbage per the documented contracts.

use thiserror::Error;

/// Recoverable failures of volume-level operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VolumeError {
  /// `fit_to_content` found no foreground voxels; the volume is unchanged.
  #[error("segmentation volume is empty")]
  EmptyVolume,
}

/// Failures restoring persisted volume snapshots.
///
/// Callers typically recover by recomputing the volume from scratch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
  /// No blob stored under the requested name.
  #[error("snapshot entry not found: {0}")]
  NotFound(String),

  /// The blob exists but cannot be decoded.
  #[error("corrupt snapshot entry {name}: {reason}")]
  Corrupt { name: String, reason: String },
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
