//! Staging area for GeoVC.
//!
//! Sits between the working tree and commits: edits land in the working
//! tree, [`StagingArea::stage`] promotes them to the staged tree, and a
//! commit snapshots the staged tree. Conflicts recorded by a merge live
//! here too and block commits until resolved.
//!
//! All state is keyed by a namespace string, so concurrent transactions
//! get fully isolated working/staged trees and conflict sets. The
//! default namespace is the empty string.

pub mod error;
pub mod memory;
pub mod staging;
pub mod traits;

pub use error::{IndexError, IndexResult};
pub use memory::InMemoryStagingStore;
pub use staging::StagingArea;
pub use traits::StagingStore;
