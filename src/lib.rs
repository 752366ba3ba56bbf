//! # Pallet Drift
//!
//! Tracks how the set of installed pallets evolves across a chain's runtime
//! upgrades: which pallets each upgrade added, removed or kept, and which
//! survived every upgrade.

mod hex;

/// Opaque historical block references.
pub mod block_hash;
/// Reads one runtime snapshot per configured upgrade point.
pub mod collector;
/// Pairwise and whole-history comparison of pallet sets.
pub mod diff;
pub mod error;
/// Sorted pallet name sets and their fingerprints.
pub mod module_set;
/// Text and JSON rendering of the comparison.
pub mod report;
/// Runtime snapshots and the version-ordered series built from them.
pub mod snapshot;
/// The chain history the collector reads from.
pub mod source;
/// The configured list of upgrade points.
pub mod upgrades;

pub use error::Error;
