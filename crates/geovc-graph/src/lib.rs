//! Commit ancestry for GeoVC.
//!
//! A [`GraphStore`] keeps a lightweight mirror of the commit DAG —
//! parent edges plus author timestamps — so ancestry queries never load
//! commit payloads from the object store. [`ops`] builds the derived
//! queries on top: ancestry tests, merge-base resolution, and
//! timestamp-ordered history walks.

pub mod error;
pub mod memory;
pub mod ops;
pub mod traits;

pub use error::{GraphError, GraphResult};
pub use memory::InMemoryGraphStore;
pub use ops::{history, is_ancestor, merge_base, HistoryIter, LogQuery};
pub use traits::GraphStore;
