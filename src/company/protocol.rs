//! Company HTTP Protocol
//!
//! Endpoint paths and the query/response DTOs of the public API. Domain values
//! (`Department`, `Employee`, `TeamScore`) are returned as-is and are not wrapped.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Flushes the store and loads the sample dataset.
pub const ENDPOINT_LOAD_SAMPLE_DATASET: &str = "/loadSampleDataset";
pub const ENDPOINT_DEPARTMENTS: &str = "/company/departments";
pub const ENDPOINT_DEPARTMENT: &str = "/company/departments/:departmentKey";
pub const ENDPOINT_DEPARTMENT_EMPLOYEES: &str = "/company/departments/:departmentKey/employees";
pub const ENDPOINT_TEAMS: &str = "/company/teams";
/// Teams whose score lies in `[rangeFrom, rangeTo]`.
pub const ENDPOINT_TEAMS_RANGE: &str = "/company/teams/range";
/// 0-based rank of one team, ascending by score.
pub const ENDPOINT_TEAM_RANK: &str = "/company/teams/rank";

pub const LOAD_SAMPLE_DATASET_RESULT: &str = "The sample dataset was loaded with success.";

// --- Data Transfer Objects ---

/// Acknowledgement returned by the bootstrap endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadSampleDatasetResponse {
    pub result: String,
}

impl LoadSampleDatasetResponse {
    pub fn success() -> Self {
        Self {
            result: LOAD_SAMPLE_DATASET_RESULT.to_string(),
        }
    }
}

/// Optional, case-insensitive name filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Kept as raw strings so a malformed number is a 400 from the query layer
/// rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
    pub range_from: Option<String>,
    pub range_to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankParams {
    pub id: Option<String>,
}
