//! Store Client Contract
//!
//! The async surface the repositories consume. Two families of operations are
//! exposed: plain string values addressed by key, and sorted collections where
//! each member carries an `f64` score.

use super::error::StoreResult;

use async_trait::async_trait;

/// Kind of value stored under a key, used to narrow key scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    SortedSet,
}

impl ValueKind {
    /// Type name as reported by the store's `TYPE` command.
    pub fn as_type_name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::SortedSet => "zset",
        }
    }
}

/// Options for a key scan: a glob pattern and an optional value kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyScan {
    pub pattern: String,
    pub kind: Option<ValueKind>,
}

impl KeyScan {
    /// Every key holding a plain string value.
    pub fn strings() -> Self {
        Self {
            pattern: "*".to_string(),
            kind: Some(ValueKind::String),
        }
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = pattern.to_string();
        self
    }
}

/// A sorted collection member together with its score.
///
/// `score` is optional because some stores omit it on certain replies;
/// readers default a missing score to `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub member: String,
    pub score: Option<f64>,
}

impl ScoredMember {
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            member: member.into(),
            score: Some(score),
        }
    }
}

/// An already-connected asynchronous store client.
///
/// Implementations must be cheap to share behind an `Arc` and safe to call from
/// many tasks at once.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Reads a string value. A missing key is `Ok(None)`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Enumerates keys matching `scan`.
    async fn scan_keys(&self, scan: &KeyScan) -> StoreResult<Vec<String>>;

    /// Writes every pair in one atomic call.
    async fn multi_set(&self, entries: Vec<(String, String)>) -> StoreResult<bool>;

    /// Removes every key of every kind.
    async fn flush_all(&self) -> StoreResult<()>;

    /// Upserts `member` with `score`. Returns `true` if the member was new.
    async fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<bool>;

    /// 0-based ascending rank of `member`, or `None` if it is not in the collection.
    async fn zrank(&self, key: &str, member: &str) -> StoreResult<Option<u64>>;

    /// Every member with its score, ascending by score.
    async fn zscan(&self, key: &str) -> StoreResult<Vec<ScoredMember>>;

    /// Members whose score lies in `[low, high]`, ascending by score.
    async fn zrange_by_score(&self, key: &str, low: f64, high: f64)
    -> StoreResult<Vec<ScoredMember>>;
}
