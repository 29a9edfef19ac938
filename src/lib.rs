//! Company Store Library
//!
//! Read access to a small organizational dataset (departments with employees,
//! scored teams) kept in a key-value/sorted-set store, plus a bootstrap operation
//! that resets the store to a deterministic sample dataset.
//!
//! ## Modules
//! - **`store`**: The Store Client contract with an in-process and a Redis implementation.
//! - **`bridge`**: The Completion Bridge, turning a stream of store operations into one
//!   terminal signal that can be awaited or waited on from a plain thread.
//! - **`company`**: Domain types, repositories, queries, bootstrap and the HTTP layer.
//! - **`config`**: Command-line and environment settings of the server binary.

pub mod bridge;
pub mod company;
pub mod config;
pub mod store;
