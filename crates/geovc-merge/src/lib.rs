//! Three-way merge for GeoVC revision trees.
//!
//! Given a common ancestor tree and the two diverging sides, the merge
//! applies every change made on exactly one side, applies identical
//! changes once, and records a [`Conflict`] for each path both sides
//! changed differently — leaving the ancestor's value in the result tree
//! at conflicted paths.
//!
//! [`Conflict`]: geovc_model::Conflict

pub mod error;
pub mod merge;

pub use error::{MergeError, MergeResult};
pub use merge::{merge_trees, MergeReport};
