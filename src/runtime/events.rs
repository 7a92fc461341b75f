//! Runtime event stream payloads.

/// Store changes broadcast by the service loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Store content was replaced by a load.
    Loaded {
        /// Results now in the store.
        results: usize,
        /// Lines skipped as malformed.
        skipped: usize,
        /// Files read.
        files: usize,
    },
    /// A load failed; the store is unchanged.
    LoadFailed {
        /// Human-readable cause.
        reason: String,
    },
    /// One manually entered result was appended.
    ResultAdded {
        /// Identifier of the swimmer the result belongs to.
        swimmer_id: String,
    },
}
