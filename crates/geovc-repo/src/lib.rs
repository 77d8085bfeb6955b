//! Repository facade for GeoVC.
//!
//! [`Repository`] wires the engine components — object store, staging
//! area, ref store, commit graph — into the porcelain-facing operations:
//! stage, commit, diff, merge, log, branch, and conflict resolution.
//! The [`harness`] module gates operations on declared capabilities, and
//! [`exchange`] implements the object framing used by push transports.

pub mod error;
pub mod exchange;
pub mod harness;
pub mod repository;

pub use error::{RepoError, RepoResult};
pub use exchange::{ExchangeError, ObjectFrame, PushSession};
pub use harness::{run_op, AccessMode, Environment, OpCapabilities};
pub use repository::{MergeOutcome, Repository, Resolution, DEFAULT_BRANCH};
