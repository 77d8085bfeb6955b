//! Foundation types for GeoVC.
//!
//! This crate holds the one type every other GeoVC crate depends on: the
//! [`ObjectId`], a 160-bit content hash identifying an immutable object.
//! Everything else in the system — trees, features, commits, refs — is
//! defined in terms of it.

pub mod error;
pub mod object_id;

pub use error::TypeError;
pub use object_id::{ObjectId, OBJECT_ID_LEN};
