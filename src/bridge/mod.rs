//! Completion Bridge Module
//!
//! Turns a push-style asynchronous stream of store operations into a single
//! terminal signal: completed, or failed on the first error.
//!
//! Store calls are asynchronous while some callers (the bootstrap sequence, the demo
//! client) need to know that a whole stream has finished before moving on. The bridge
//! is that rendezvous point and nothing more: no retries, no partial-result salvage.
//!
//! ## Submodules
//! - **`completion`**: `CompletionBridge`, `BridgeHandle` and `BridgeCanceller`.
//! - **`types`**: the state machine (`BridgeState`), the terminal `Completion` and `BridgeError`.

pub mod completion;
pub mod types;

pub use completion::{BridgeCanceller, BridgeHandle, CompletionBridge};
pub use types::{BridgeError, BridgeState, Completion};

#[cfg(test)]
mod tests;
