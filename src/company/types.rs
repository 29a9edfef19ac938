//! Company Domain Types
//!
//! The values persisted in the store (`Department`, `Employee`, `Team`) and the
//! read-time pairing of a team with its score (`TeamScore`).
//!
//! JSON field names are camelCase so stored values and HTTP bodies share one shape.

use serde::{Deserialize, Serialize};

/// A department and its employees, stored as one JSON value under a department key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub name: String,
    /// Insertion order from the bootstrap step.
    pub employees: Vec<Employee>,
}

/// An employee; only reachable through its department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    /// Case-insensitive match; a missing filter accepts every employee.
    pub fn matches(&self, first_name: Option<&str>, last_name: Option<&str>) -> bool {
        let first_ok = first_name
            .map(|name| same_name(&self.first_name, name))
            .unwrap_or(true);
        let last_ok = last_name
            .map(|name| same_name(&self.last_name, name))
            .unwrap_or(true);
        first_ok && last_ok
    }
}

fn same_name(stored: &str, filter: &str) -> bool {
    stored.eq_ignore_ascii_case(filter) || stored.to_lowercase() == filter.to_lowercase()
}

/// A team; its identity is `id`. Stored as a member of the teams collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Team {
    pub id: i32,
}

impl Team {
    pub fn new(id: i32) -> Self {
        Self { id }
    }
}

/// A team and the score the collection holds for it. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamScore {
    pub team: Team,
    pub score: f64,
}

impl TeamScore {
    /// Pairs `team` with `score`, defaulting a missing score to `0.0`.
    pub fn new(team: Team, score: Option<f64>) -> Self {
        Self {
            team,
            score: score.unwrap_or(0.0),
        }
    }
}
