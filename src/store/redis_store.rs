use super::client::{KeyScan, ScoredMember, StoreClient};
use super::error::StoreResult;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

const SCAN_BATCH: usize = 100;

/// Store Client backed by a Redis server.
///
/// Wraps a `ConnectionManager`, which reconnects on its own and is cheap to clone
/// per call, so the store can be shared across every request handler.
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connects to `redis_url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Connected to Redis at {}", redis_url);
        Ok(Self { connection })
    }
}

#[async_trait]
impl StoreClient for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn scan_keys(&self, scan: &KeyScan) -> StoreResult<Vec<String>> {
        let mut conn = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor)
                .arg("MATCH")
                .arg(&scan.pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH);
            if let Some(kind) = scan.kind {
                cmd.arg("TYPE").arg(kind.as_type_name());
            }

            let (next, batch): (u64, Vec<String>) = cmd.query_async(&mut conn).await?;
            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once across iterations.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn multi_set(&self, entries: Vec<(String, String)>) -> StoreResult<bool> {
        if entries.is_empty() {
            return Ok(true);
        }
        let mut conn = self.connection.clone();
        let _: () = conn.mset(&entries).await?;
        Ok(true)
    }

    async fn flush_all(&self) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("FLUSHALL").query_async(&mut conn).await?;
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<bool> {
        let mut conn = self.connection.clone();
        let added: i64 = conn.zadd(key, member, score).await?;
        Ok(added > 0)
    }

    async fn zrank(&self, key: &str, member: &str) -> StoreResult<Option<u64>> {
        let mut conn = self.connection.clone();
        let rank: Option<u64> = conn.zrank(key, member).await?;
        Ok(rank)
    }

    async fn zscan(&self, key: &str) -> StoreResult<Vec<ScoredMember>> {
        let mut conn = self.connection.clone();
        let pairs: Vec<(String, f64)> = conn.zrange_withscores(key, 0, -1).await?;
        Ok(pairs
            .into_iter()
            .map(|(member, score)| ScoredMember::new(member, score))
            .collect())
    }

    async fn zrange_by_score(
        &self,
        key: &str,
        low: f64,
        high: f64,
    ) -> StoreResult<Vec<ScoredMember>> {
        if low > high {
            return Ok(Vec::new());
        }
        let mut conn = self.connection.clone();
        let pairs: Vec<(String, f64)> = conn.zrangebyscore_withscores(key, low, high).await?;
        Ok(pairs
            .into_iter()
            .map(|(member, score)| ScoredMember::new(member, score))
            .collect())
    }
}
