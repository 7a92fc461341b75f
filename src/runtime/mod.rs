//! Single-writer async service and event stream APIs.
//!
//! All store mutations and reads go through one task, so loads and appends are
//! serialized and no query ever observes a half-finished load.

/// Event stream types emitted by the service.
pub mod events;
/// Handle and command loop implementation.
pub mod handle;
