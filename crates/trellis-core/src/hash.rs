//! Hashing used for child-key maps.
//!
//! Key maps are rebuilt on every reconciliation of a keyed child list, so
//! the hasher matters more than for ordinary long-lived maps.

pub use ahash::{AHasher as DefaultHasher, RandomState};
