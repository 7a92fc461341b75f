//! In-memory result store and index helpers.

/// Value-keyed grouping helpers.
pub mod indices;
/// Snapshot-swapping result store.
pub mod store;
