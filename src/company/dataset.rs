//! Sample Dataset Factory
//!
//! Pure functions that build the bootstrap payload from explicit index bounds.
//! Nothing here touches the store; the same bounds always produce the same dataset.

use super::types::{Department, Employee, Team};

use std::collections::BTreeMap;

/// Key of the sorted collection holding every team.
pub const TEAMS_KEY: &str = "K-TEAMS";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("department bounds are inverted: {from} > {to}")]
    InvertedDepartments { from: u32, to: u32 },

    #[error("employee bounds are inverted: {from} > {to}")]
    InvertedEmployees { from: u32, to: u32 },

    #[error("team count must be positive")]
    NoTeams,

    #[error("team ids starting at {from} overflow for {count} teams")]
    TeamIdOverflow { from: i32, count: u32 },
}

/// Inclusive index ranges the sample dataset is generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetBounds {
    pub department_from: u32,
    pub department_to: u32,
    pub employee_from: u32,
    pub employee_to: u32,
    pub team_id_from: i32,
    pub team_count: u32,
}

impl Default for DatasetBounds {
    fn default() -> Self {
        Self {
            department_from: 1,
            department_to: 2,
            employee_from: 1,
            employee_to: 2,
            team_id_from: 1,
            team_count: 5,
        }
    }
}

impl DatasetBounds {
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.department_from > self.department_to {
            return Err(DatasetError::InvertedDepartments {
                from: self.department_from,
                to: self.department_to,
            });
        }
        if self.employee_from > self.employee_to {
            return Err(DatasetError::InvertedEmployees {
                from: self.employee_from,
                to: self.employee_to,
            });
        }
        if self.team_count == 0 {
            return Err(DatasetError::NoTeams);
        }
        if i64::from(self.team_id_from) + i64::from(self.team_count) - 1 > i64::from(i32::MAX) {
            return Err(DatasetError::TeamIdOverflow {
                from: self.team_id_from,
                count: self.team_count,
            });
        }
        Ok(())
    }

    pub fn department_count(&self) -> usize {
        (self.department_to - self.department_from) as usize + 1
    }

    pub fn employees_per_department(&self) -> usize {
        (self.employee_to - self.employee_from) as usize + 1
    }
}

pub fn department_key(department_index: u32) -> String {
    format!("K-DEP-{}", department_index)
}

pub fn department_name(department_index: u32) -> String {
    format!("D-Name-{}", department_index)
}

pub fn employee_index(department_index: u32, employee_index: u32) -> u64 {
    100 * u64::from(department_index) + u64::from(employee_index)
}

pub fn employee_from_index(index: u64) -> Employee {
    Employee {
        first_name: format!("EF-Name-{:02}", index),
        last_name: format!("EL-Name-{:02}", index),
    }
}

/// Department key -> Department for every department index in `bounds`.
pub fn sample_departments(bounds: &DatasetBounds) -> BTreeMap<String, Department> {
    (bounds.department_from..=bounds.department_to)
        .map(|dep| {
            let employees = (bounds.employee_from..=bounds.employee_to)
                .map(|emp| employee_from_index(employee_index(dep, emp)))
                .collect();
            (
                department_key(dep),
                Department {
                    name: department_name(dep),
                    employees,
                },
            )
        })
        .collect()
}

/// Teams in ascending id order with their scores.
///
/// The score is `team_count - position`, so the lowest id gets the highest score
/// and the scores form a strictly descending sequence. Generation stops at
/// `i32::MAX`; `DatasetBounds::validate` rejects bounds that would reach past it.
pub fn sample_teams(bounds: &DatasetBounds) -> Vec<(Team, f64)> {
    (0..bounds.team_count)
        .map_while(|position| {
            let offset = i32::try_from(position).ok()?;
            let id = bounds.team_id_from.checked_add(offset)?;
            Some((Team::new(id), f64::from(bounds.team_count - position)))
        })
        .collect()
}
