//! Mutable refs for GeoVC.
//!
//! Refs are the only mutable state in a repository: named pointers
//! (`refs/heads/main`, `HEAD`) to immutable commits or to other refs.
//! Every head advance goes through compare-and-swap, so two writers
//! racing on a branch cannot silently lose a commit.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{RefError, RefResult};
pub use memory::InMemoryRefStore;
pub use traits::RefStore;
pub use types::{is_valid_ref_name, Ref, RefValue, HEAD, R_HEADS, R_REMOTES, R_TAGS};
