//! Query Functions
//!
//! The read operations behind the HTTP endpoints. Each one separates the three
//! outcomes a caller has to distinguish:
//!
//! - **`Found`**: the data exists.
//! - **`NotFound`**: nothing matched, or the collection is empty. Not an error.
//! - **`BadRequest`**: a malformed parameter, rejected before touching the store.
//!
//! Store failures travel separately as the `Err` side of `StoreResult`.

use super::dataset::TEAMS_KEY;
use super::repository::{DepartmentRepository, TeamRepository};
use super::types::{Department, Employee, Team, TeamScore};
use crate::store::error::StoreResult;

use futures::TryStreamExt;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    Found(T),
    NotFound,
    BadRequest(String),
}

impl<T> QueryOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, QueryOutcome::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryOutcome<U> {
        match self {
            QueryOutcome::Found(value) => QueryOutcome::Found(f(value)),
            QueryOutcome::NotFound => QueryOutcome::NotFound,
            QueryOutcome::BadRequest(reason) => QueryOutcome::BadRequest(reason),
        }
    }

    fn from_option(value: Option<T>) -> Self {
        value.map_or(QueryOutcome::NotFound, QueryOutcome::Found)
    }
}

impl<T> QueryOutcome<Vec<T>> {
    fn non_empty(values: Vec<T>) -> Self {
        if values.is_empty() {
            QueryOutcome::NotFound
        } else {
            QueryOutcome::Found(values)
        }
    }
}

pub async fn list_departments(
    departments: &DepartmentRepository,
) -> StoreResult<QueryOutcome<Vec<Department>>> {
    let all: Vec<Department> = departments.list_all().try_collect().await?;
    Ok(QueryOutcome::non_empty(all))
}

pub async fn get_department(
    departments: &DepartmentRepository,
    key: &str,
) -> StoreResult<QueryOutcome<Department>> {
    Ok(QueryOutcome::from_option(departments.get_by_key(key).await?))
}

/// First employee of the department matching both name filters. A filter that is
/// `None` accepts everyone, so with no filters this is the first employee.
pub async fn get_employee(
    departments: &DepartmentRepository,
    key: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> StoreResult<QueryOutcome<Employee>> {
    let Some(department) = departments.get_by_key(key).await? else {
        return Ok(QueryOutcome::NotFound);
    };

    let employee = department
        .employees
        .into_iter()
        .find(|employee| employee.matches(first_name, last_name));

    Ok(QueryOutcome::from_option(employee))
}

pub async fn list_teams(teams: &TeamRepository) -> StoreResult<QueryOutcome<Vec<TeamScore>>> {
    let scored = teams.all_with_scores(TEAMS_KEY).await?;
    Ok(QueryOutcome::non_empty(to_team_scores(scored)))
}

/// Teams whose score lies in `[range_from, range_to]`.
pub async fn teams_in_range(
    teams: &TeamRepository,
    range_from: Option<&str>,
    range_to: Option<&str>,
) -> StoreResult<QueryOutcome<Vec<TeamScore>>> {
    let (low, high) = match (parse_score("rangeFrom", range_from), parse_score("rangeTo", range_to)) {
        (Ok(low), Ok(high)) => (low, high),
        (Err(reason), _) | (_, Err(reason)) => return Ok(QueryOutcome::BadRequest(reason)),
    };

    let scored = teams.range_by_score(TEAMS_KEY, low, high).await?;
    Ok(QueryOutcome::non_empty(to_team_scores(scored)))
}

/// 0-based ascending rank of the team with the given id.
pub async fn team_rank(teams: &TeamRepository, id: Option<&str>) -> StoreResult<QueryOutcome<u64>> {
    let team = match parse_team_id(id) {
        Ok(id) => Team::new(id),
        Err(reason) => return Ok(QueryOutcome::BadRequest(reason)),
    };

    Ok(QueryOutcome::from_option(teams.rank_of(TEAMS_KEY, team).await?))
}

fn to_team_scores(scored: Vec<(Team, Option<f64>)>) -> Vec<TeamScore> {
    scored
        .into_iter()
        .map(|(team, score)| TeamScore::new(team, score))
        .collect()
}

fn parse_score(name: &str, raw: Option<&str>) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("missing parameter '{}'", name))?;
    match raw.trim().parse::<f64>() {
        Ok(value) if !value.is_nan() => Ok(value),
        _ => Err(format!("parameter '{}' is not a number: '{}'", name, raw)),
    }
}

/// Unlike scores, ids are parsed exactly as given: surrounding whitespace is rejected.
fn parse_team_id(raw: Option<&str>) -> Result<i32, String> {
    let raw = raw.ok_or_else(|| "missing parameter 'id'".to_string())?;
    raw.parse::<i32>()
        .map_err(|e| format!("parameter 'id' is not a valid team id '{}': {}", raw, e))
}
