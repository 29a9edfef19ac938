use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use super::bootstrap::Bootstrapper;
use super::protocol::*;
use super::queries::{self, QueryOutcome};
use super::repository::{DepartmentRepository, TeamRepository};
use crate::store::client::StoreClient;
use crate::store::error::StoreResult;

/// Everything the handlers need, shared through an `Extension` layer.
#[derive(Clone)]
pub struct CompanyState {
    pub departments: DepartmentRepository,
    pub teams: TeamRepository,
    pub bootstrap: Bootstrapper,
}

impl CompanyState {
    pub fn new(store: Arc<dyn StoreClient>, bootstrap: Bootstrapper, fan_out: usize) -> Self {
        Self {
            departments: DepartmentRepository::new(store.clone()).with_fan_out(fan_out),
            teams: TeamRepository::new(store),
            bootstrap,
        }
    }
}

pub fn router(state: Arc<CompanyState>) -> Router {
    Router::new()
        .route(ENDPOINT_LOAD_SAMPLE_DATASET, get(handle_load_sample_dataset))
        .route(ENDPOINT_DEPARTMENTS, get(handle_list_departments))
        .route(ENDPOINT_DEPARTMENT, get(handle_get_department))
        .route(ENDPOINT_DEPARTMENT_EMPLOYEES, get(handle_get_employee))
        .route(ENDPOINT_TEAMS, get(handle_list_teams))
        .route(ENDPOINT_TEAMS_RANGE, get(handle_teams_in_range))
        .route(ENDPOINT_TEAM_RANK, get(handle_team_rank))
        .layer(Extension(state))
}

pub async fn handle_load_sample_dataset(
    Extension(state): Extension<Arc<CompanyState>>,
) -> Response {
    tracing::info!("GET {}", ENDPOINT_LOAD_SAMPLE_DATASET);
    match state.bootstrap.load_sample_dataset().await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load sample dataset: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn handle_list_departments(Extension(state): Extension<Arc<CompanyState>>) -> Response {
    tracing::info!("GET {}", ENDPOINT_DEPARTMENTS);
    respond(
        "list departments",
        queries::list_departments(&state.departments).await,
    )
}

pub async fn handle_get_department(
    Extension(state): Extension<Arc<CompanyState>>,
    Path(department_key): Path<String>,
) -> Response {
    tracing::info!("GET department '{}'", department_key);
    respond(
        "get department",
        queries::get_department(&state.departments, &department_key).await,
    )
}

pub async fn handle_get_employee(
    Extension(state): Extension<Arc<CompanyState>>,
    Path(department_key): Path<String>,
    Query(params): Query<EmployeeParams>,
) -> Response {
    tracing::info!(
        "GET employee in '{}' (first={:?}, last={:?})",
        department_key,
        params.first_name,
        params.last_name
    );
    respond(
        "get employee",
        queries::get_employee(
            &state.departments,
            &department_key,
            params.first_name.as_deref(),
            params.last_name.as_deref(),
        )
        .await,
    )
}

pub async fn handle_list_teams(Extension(state): Extension<Arc<CompanyState>>) -> Response {
    tracing::info!("GET {}", ENDPOINT_TEAMS);
    respond("list teams", queries::list_teams(&state.teams).await)
}

pub async fn handle_teams_in_range(
    Extension(state): Extension<Arc<CompanyState>>,
    Query(params): Query<RangeParams>,
) -> Response {
    tracing::info!(
        "GET teams in range [{:?}, {:?}]",
        params.range_from,
        params.range_to
    );
    respond(
        "teams in range",
        queries::teams_in_range(
            &state.teams,
            params.range_from.as_deref(),
            params.range_to.as_deref(),
        )
        .await,
    )
}

pub async fn handle_team_rank(
    Extension(state): Extension<Arc<CompanyState>>,
    Query(params): Query<RankParams>,
) -> Response {
    tracing::info!("GET rank of team {:?}", params.id);
    respond(
        "team rank",
        queries::team_rank(&state.teams, params.id.as_deref()).await,
    )
}

fn respond<T: Serialize>(operation: &str, result: StoreResult<QueryOutcome<T>>) -> Response {
    match result {
        Ok(QueryOutcome::Found(value)) => (StatusCode::OK, Json(value)).into_response(),
        Ok(QueryOutcome::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Ok(QueryOutcome::BadRequest(reason)) => {
            tracing::warn!("{}: rejected request: {}", operation, reason);
            StatusCode::BAD_REQUEST.into_response()
        }
        Err(e) => {
            tracing::error!("{}: store failure: {}", operation, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
