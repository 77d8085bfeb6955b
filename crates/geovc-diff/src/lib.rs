//! Snapshot comparison for GeoVC.
//!
//! [`TreeDiff`] walks two revision trees and lazily yields one
//! [`DiffEntry`] per changed feature, in ascending full-path order.
//! Subtrees and shards with equal ObjectIds are skipped without being
//! read, so the cost is proportional to the amount of change, not to
//! snapshot size.

pub mod diff;
pub mod entry;
pub mod error;
pub mod filter;

pub use diff::{diff_count, DiffStats, TreeDiff};
pub use entry::{ChangeType, DiffEntry};
pub use error::{DiffError, DiffResult};
pub use filter::PathFilter;
