//! Content hashing for GeoVC.
//!
//! Every object identity in GeoVC is derived from its canonical serialized
//! bytes through a domain-separated BLAKE3 hash, truncated to the 160-bit
//! [`ObjectId`] width. Domain separation guarantees that a feature and a
//! tree with coincidentally identical payload bytes never collide.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
