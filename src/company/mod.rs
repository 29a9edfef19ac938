//! Company Module
//!
//! The organizational dataset (departments with employees, scored teams) and every
//! operation exposed on it.
//!
//! ## Submodules
//! - **`types`**: `Department`, `Employee`, `Team`, `TeamScore`.
//! - **`dataset`**: The deterministic sample dataset, built from `DatasetBounds`.
//! - **`repository`**: `DepartmentRepository` (JSON values) and `TeamRepository` (sorted collection).
//! - **`queries`**: Read operations returning `QueryOutcome`.
//! - **`bootstrap`**: Flush-and-reload of the sample dataset through completion bridges.
//! - **`protocol`**: HTTP endpoint paths and DTOs.
//! - **`handlers`**: Axum handlers and the router.

pub mod bootstrap;
pub mod dataset;
pub mod handlers;
pub mod protocol;
pub mod queries;
pub mod repository;
pub mod types;

pub use bootstrap::Bootstrapper;
pub use dataset::{DatasetBounds, TEAMS_KEY};
pub use handlers::{CompanyState, router};
pub use queries::QueryOutcome;
pub use repository::{DepartmentRepository, TeamRepository};
pub use types::{Department, Employee, Team, TeamScore};
