//! Sample Dataset Bootstrap
//!
//! Destructive reset of the store followed by a fresh load of the sample dataset.
//! Runs three phases strictly in sequence, each one drained through its own
//! `CompletionBridge`:
//!
//! 1. **flush**: clear the whole store.
//! 2. **departments**: bulk-write the department map in one call.
//! 3. **teams**: add every team to `K-TEAMS`, with bounded fan-out.
//!
//! A phase only starts after the previous bridge reported `Completed`; the first
//! failure is returned and later phases never run. Nothing is rolled back.

use super::dataset::{DatasetBounds, DatasetError, TEAMS_KEY, sample_departments, sample_teams};
use super::protocol::LoadSampleDatasetResponse;
use super::repository::{DepartmentRepository, TeamRepository};
use crate::bridge::completion::CompletionBridge;
use crate::store::client::StoreClient;
use crate::store::error::{StoreError, StoreResult};

use futures::stream::{self, Stream, StreamExt};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Bootstrapper {
    store: Arc<dyn StoreClient>,
    departments: DepartmentRepository,
    teams: TeamRepository,
    bounds: DatasetBounds,
    fan_out: usize,
    timeout: Option<Duration>,
}

impl Bootstrapper {
    /// Fails if `bounds` would not produce a valid dataset.
    pub fn new(store: Arc<dyn StoreClient>, bounds: DatasetBounds) -> Result<Self, DatasetError> {
        bounds.validate()?;
        Ok(Self {
            departments: DepartmentRepository::new(store.clone()),
            teams: TeamRepository::new(store.clone()),
            store,
            bounds,
            fan_out: 8,
            timeout: None,
        })
    }

    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// Upper bound for each phase. `None` waits as long as the store takes.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn bounds(&self) -> &DatasetBounds {
        &self.bounds
    }

    pub async fn load_sample_dataset(&self) -> StoreResult<LoadSampleDatasetResponse> {
        tracing::info!(
            "Loading sample dataset: departments {}..={}, employees {}..={}, {} teams",
            self.bounds.department_from,
            self.bounds.department_to,
            self.bounds.employee_from,
            self.bounds.employee_to,
            self.bounds.team_count
        );

        // 1. Flush
        let store = self.store.clone();
        self.run_phase("flush", stream::once(async move { store.flush_all().await }))
            .await?;

        // 2. Departments
        let departments = self.departments.clone();
        let payload = sample_departments(&self.bounds);
        self.run_phase(
            "departments",
            stream::once(async move { departments.bulk_write(&payload).await }),
        )
        .await?;

        // 3. Teams
        let teams = self.teams.clone();
        let additions = stream::iter(sample_teams(&self.bounds))
            .map(move |(team, score)| {
                let teams = teams.clone();
                async move {
                    let added = teams.add_scored(TEAMS_KEY, team, score).await?;
                    Ok::<_, StoreError>((team.id, score, added))
                }
            })
            .buffer_unordered(self.fan_out);
        let added = self.run_phase("teams", additions).await?;

        tracing::info!("Sample dataset loaded ({} teams)", added);
        Ok(LoadSampleDatasetResponse::success())
    }

    async fn run_phase<S, T>(&self, label: &'static str, phase: S) -> StoreResult<usize>
    where
        S: Stream<Item = StoreResult<T>> + Send + 'static,
        T: Debug + Send + 'static,
    {
        let completion = CompletionBridge::<StoreError>::arm(label)
            .with_timeout(self.timeout)
            .subscribe(phase, move |outcome| {
                tracing::debug!("{}: {:?}", label, outcome);
            })
            .wait()
            .await;

        let observed = completion.into_result()?;
        tracing::debug!("Phase '{}' finished after {} elements", label, observed);
        Ok(observed)
    }
}
