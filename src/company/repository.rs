//! Repositories
//!
//! Typed access to the store for the two shapes of data the company keeps:
//!
//! - **`DepartmentRepository`**: departments as JSON string values, one per key.
//! - **`TeamRepository`**: teams as JSON-encoded members of a sorted collection.
//!
//! Both hold a shared `Arc<dyn StoreClient>` and keep no state of their own; every
//! call goes straight to the store and store failures are returned unchanged.

use super::types::{Department, Team};
use crate::store::client::{KeyScan, ScoredMember, StoreClient};
use crate::store::error::StoreResult;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_FAN_OUT: usize = 8;

#[derive(Clone)]
pub struct DepartmentRepository {
    store: Arc<dyn StoreClient>,
    fan_out: usize,
}

impl DepartmentRepository {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self {
            store,
            fan_out: DEFAULT_FAN_OUT,
        }
    }

    /// Caps how many values `list_all` fetches concurrently.
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// Looks up one department. An unknown key is `Ok(None)`, never an error.
    pub async fn get_by_key(&self, key: &str) -> StoreResult<Option<Department>> {
        fetch_department(self.store.as_ref(), key).await
    }

    /// Every stored department.
    ///
    /// Keys are scanned first and resolved afterwards, without any lock in between.
    /// A key deleted after the scan simply drops out of the result; this is accepted
    /// eventual consistency, not an error.
    pub fn list_all(&self) -> BoxStream<'static, StoreResult<Department>> {
        let store = self.store.clone();
        let fan_out = self.fan_out;

        let scan = {
            let store = store.clone();
            async move { store.scan_keys(&KeyScan::strings()).await }
        };

        stream::once(scan)
            .map_ok(move |keys| {
                tracing::debug!("list_all: resolving {} scanned keys", keys.len());
                let store = store.clone();
                stream::iter(keys)
                    .map(move |key| {
                        let store = store.clone();
                        async move { fetch_department(store.as_ref(), &key).await }
                    })
                    .buffered(fan_out)
            })
            .try_flatten()
            .try_filter_map(|department| futures::future::ready(Ok(department)))
            .boxed()
    }

    /// Writes every department in a single multi-set call.
    pub async fn bulk_write(&self, departments: &BTreeMap<String, Department>) -> StoreResult<bool> {
        let mut entries = Vec::with_capacity(departments.len());
        for (key, department) in departments {
            entries.push((key.clone(), serde_json::to_string(department)?));
        }

        tracing::debug!("bulk_write: {} departments", entries.len());
        self.store.multi_set(entries).await
    }
}

async fn fetch_department(store: &dyn StoreClient, key: &str) -> StoreResult<Option<Department>> {
    match store.get(key).await? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => {
            tracing::debug!("Department key '{}' has no value", key);
            Ok(None)
        }
    }
}

#[derive(Clone)]
pub struct TeamRepository {
    store: Arc<dyn StoreClient>,
}

impl TeamRepository {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    /// Upserts `team` with `score`. `true` if the team was not yet in the collection.
    pub async fn add_scored(&self, collection: &str, team: Team, score: f64) -> StoreResult<bool> {
        let member = serde_json::to_string(&team)?;
        self.store.zadd(collection, &member, score).await
    }

    /// 0-based ascending rank. Equal scores are ordered by the encoded member bytes.
    pub async fn rank_of(&self, collection: &str, team: Team) -> StoreResult<Option<u64>> {
        let member = serde_json::to_string(&team)?;
        self.store.zrank(collection, &member).await
    }

    /// Every team with its score, ascending by score.
    pub async fn all_with_scores(&self, collection: &str) -> StoreResult<Vec<(Team, Option<f64>)>> {
        decode_members(self.store.zscan(collection).await?)
    }

    /// Teams whose score lies in `[low, high]`. Inverted bounds give an empty result.
    pub async fn range_by_score(
        &self,
        collection: &str,
        low: f64,
        high: f64,
    ) -> StoreResult<Vec<(Team, Option<f64>)>> {
        if low > high {
            return Ok(Vec::new());
        }
        decode_members(self.store.zrange_by_score(collection, low, high).await?)
    }
}

fn decode_members(members: Vec<ScoredMember>) -> StoreResult<Vec<(Team, Option<f64>)>> {
    members
        .into_iter()
        .map(|scored| Ok((serde_json::from_str(&scored.member)?, scored.score)))
        .collect()
}
