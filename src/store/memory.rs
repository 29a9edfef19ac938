use super::client::{KeyScan, ScoredMember, StoreClient, ValueKind};
use super::error::{StoreError, StoreResult};

use async_trait::async_trait;
use dashmap::DashMap;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-process store holding string values and sorted collections.
///
/// One keyspace is shared by both kinds, as in Redis: writing a string over a
/// sorted collection replaces it, while `zadd` on a string key is rejected.
///
/// `multi_set` and `flush_all` hold the keyspace gate exclusively, so no other call
/// observes them half-applied. Every other call holds it shared.
///
/// Clones share the same contents.
#[derive(Clone)]
pub struct MemoryStore {
    keyspace: Arc<DashMap<String, Entry>>,
    gate: Arc<RwLock<()>>,
}

enum Entry {
    Value(String),
    Sorted(SortedSet),
}

impl Entry {
    fn kind(&self) -> ValueKind {
        match self {
            Entry::Value(_) => ValueKind::String,
            Entry::Sorted(_) => ValueKind::SortedSet,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            keyspace: Arc::new(DashMap::new()),
            gate: Arc::new(RwLock::new(())),
        }
    }

    pub fn set_local(&self, key: &str, value: &str) {
        let _gate = self.shared();
        self.keyspace
            .insert(key.to_string(), Entry::Value(value.to_string()));
    }

    pub fn remove_local(&self, key: &str) -> bool {
        let _gate = self.shared();
        self.keyspace.remove(key).is_some()
    }

    pub fn key_count(&self) -> usize {
        let _gate = self.shared();
        self.keyspace.len()
    }

    fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_sorted<T>(&self, key: &str, read: impl FnOnce(&SortedSet) -> T) -> Option<T> {
        let _gate = self.shared();
        match self.keyspace.get(key)?.value() {
            Entry::Sorted(set) => Some(read(set)),
            Entry::Value(_) => None,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let _gate = self.shared();
        Ok(self.keyspace.get(key).and_then(|entry| match entry.value() {
            Entry::Value(value) => Some(value.clone()),
            Entry::Sorted(_) => None,
        }))
    }

    async fn scan_keys(&self, scan: &KeyScan) -> StoreResult<Vec<String>> {
        let matcher = glob_to_regex(&scan.pattern)?;

        let keys: Vec<String> = {
            let _gate = self.shared();
            self.keyspace
                .iter()
                .filter(|entry| scan.kind.is_none_or(|kind| entry.value().kind() == kind))
                .filter(|entry| matcher.is_match(entry.key()))
                .map(|entry| entry.key().clone())
                .collect()
        };

        tracing::debug!(
            "SCAN: pattern '{}' kind {:?} matched {} keys",
            scan.pattern,
            scan.kind,
            keys.len()
        );
        Ok(keys)
    }

    async fn multi_set(&self, entries: Vec<(String, String)>) -> StoreResult<bool> {
        let _gate = self.exclusive();
        for (key, value) in entries {
            self.keyspace.insert(key, Entry::Value(value));
        }
        Ok(true)
    }

    async fn flush_all(&self) -> StoreResult<()> {
        {
            let _gate = self.exclusive();
            self.keyspace.clear();
        }
        tracing::debug!("FLUSHALL: store cleared");
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<bool> {
        if score.is_nan() {
            return Err(StoreError::Command("score is not a valid float".to_string()));
        }

        let _gate = self.shared();
        let mut entry = self
            .keyspace
            .entry(key.to_string())
            .or_insert_with(|| Entry::Sorted(SortedSet::default()));
        match entry.value_mut() {
            Entry::Sorted(set) => Ok(set.insert(member, score)),
            Entry::Value(_) => Err(StoreError::Command(format!(
                "WRONGTYPE key '{}' holds a string value",
                key
            ))),
        }
    }

    async fn zrank(&self, key: &str, member: &str) -> StoreResult<Option<u64>> {
        Ok(self.with_sorted(key, |set| set.rank(member)).flatten())
    }

    async fn zscan(&self, key: &str) -> StoreResult<Vec<ScoredMember>> {
        Ok(self
            .with_sorted(key, SortedSet::ascending)
            .unwrap_or_default())
    }

    async fn zrange_by_score(
        &self,
        key: &str,
        low: f64,
        high: f64,
    ) -> StoreResult<Vec<ScoredMember>> {
        Ok(self
            .with_sorted(key, |set| set.range_by_score(low, high))
            .unwrap_or_default())
    }
}

/// Members ordered by score, ties broken by member bytes.
#[derive(Debug, Default)]
struct SortedSet {
    scores: HashMap<String, f64>,
    order: BTreeSet<RankKey>,
}

impl SortedSet {
    fn insert(&mut self, member: &str, score: f64) -> bool {
        match self.scores.insert(member.to_string(), score) {
            Some(previous) => {
                self.order.remove(&RankKey::new(previous, member));
                self.order.insert(RankKey::new(score, member));
                false
            }
            None => {
                self.order.insert(RankKey::new(score, member));
                true
            }
        }
    }

    fn rank(&self, member: &str) -> Option<u64> {
        let score = *self.scores.get(member)?;
        Some(self.order.range(..RankKey::new(score, member)).count() as u64)
    }

    fn ascending(&self) -> Vec<ScoredMember> {
        self.order
            .iter()
            .map(|key| ScoredMember::new(key.member.clone(), key.score))
            .collect()
    }

    fn range_by_score(&self, low: f64, high: f64) -> Vec<ScoredMember> {
        if low.is_nan() || high.is_nan() || low > high {
            return Vec::new();
        }
        self.order
            .iter()
            .skip_while(|key| key.score < low)
            .take_while(|key| key.score <= high)
            .map(|key| ScoredMember::new(key.member.clone(), key.score))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct RankKey {
    score: f64,
    member: String,
}

impl RankKey {
    fn new(score: f64, member: &str) -> Self {
        Self {
            score,
            member: member.to_string(),
        }
    }
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.member.as_bytes().cmp(other.member.as_bytes()))
    }
}

/// Translates a store glob (`*`, `?`, `[...]`) into an anchored regex.
pub(crate) fn glob_to_regex(pattern: &str) -> StoreResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            '[' => {
                expr.push('[');
                if chars.peek() == Some(&'^') {
                    chars.next();
                    expr.push('^');
                }
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    if inner == '\\' || inner == '[' {
                        expr.push('\\');
                    }
                    expr.push(inner);
                }
                expr.push(']');
            }
            '\\' => {
                if let Some(escaped) = chars.next() {
                    expr.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|e| StoreError::Command(format!("invalid scan pattern: {}", e)))
}
