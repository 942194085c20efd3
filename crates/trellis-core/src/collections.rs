//! Hashed collections used across the reconciler.

/// Map keyed with the crate-wide hasher.
pub type HashMap<K, V> = hashbrown::HashMap<K, V, crate::hash::RandomState>;

/// Set keyed with the crate-wide hasher.
pub type HashSet<T> = hashbrown::HashSet<T, crate::hash::RandomState>;
