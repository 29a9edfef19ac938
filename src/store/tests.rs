//! Store Module Tests
//!
//! Validates the in-process store against the Store Client contract.
//!
//! ## Test Scopes
//! - **Values**: get / multi-set / scan / flush semantics.
//! - **Sorted collections**: upsert, rank, ordering, and range-by-score edge cases.
//! - **Redis**: the same contract against a live server, only when `REDIS_URL` is set.

#[cfg(test)]
mod tests {
    use crate::store::client::{KeyScan, StoreClient, ValueKind};
    use crate::store::memory::{MemoryStore, glob_to_regex};
    use crate::store::redis_store::RedisStore;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ============================================================
    // VALUE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let store = MemoryStore::new();

        let value = store.get("nope").await.unwrap();

        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_multi_set_then_get() {
        let store = MemoryStore::new();

        let ok = store
            .multi_set(pairs(&[("K-DEP-1", "one"), ("K-DEP-2", "two")]))
            .await
            .unwrap();

        assert!(ok);
        assert_eq!(store.get("K-DEP-1").await.unwrap().as_deref(), Some("one"));
        assert_eq!(store.get("K-DEP-2").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_scan_filters_by_kind() {
        let store = MemoryStore::new();
        store.set_local("K-DEP-1", "dep");
        store.zadd("K-TEAMS", "{\"id\":1}", 1.0).await.unwrap();

        let strings = store.scan_keys(&KeyScan::strings()).await.unwrap();
        assert_eq!(strings, vec!["K-DEP-1".to_string()]);

        let sets = store
            .scan_keys(&KeyScan {
                pattern: "*".to_string(),
                kind: Some(ValueKind::SortedSet),
            })
            .await
            .unwrap();
        assert_eq!(sets, vec!["K-TEAMS".to_string()]);

        let all = store
            .scan_keys(&KeyScan {
                pattern: "*".to_string(),
                kind: None,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_scan_filters_by_pattern() {
        let store = MemoryStore::new();
        store.set_local("K-DEP-1", "a");
        store.set_local("K-DEP-2", "b");
        store.set_local("OTHER", "c");

        let mut keys = store
            .scan_keys(&KeyScan::strings().with_pattern("K-DEP-*"))
            .await
            .unwrap();
        keys.sort();

        assert_eq!(keys, vec!["K-DEP-1".to_string(), "K-DEP-2".to_string()]);
    }

    #[test]
    fn test_glob_translation() {
        let re = glob_to_regex("K-?EP-[12]*").unwrap();
        assert!(re.is_match("K-DEP-1"));
        assert!(re.is_match("K-DEP-20"));
        assert!(!re.is_match("K-DEP-3"));
        assert!(!re.is_match("xK-DEP-1"));

        let literal = glob_to_regex("a.b").unwrap();
        assert!(literal.is_match("a.b"));
        assert!(!literal.is_match("axb"));

        let negated = glob_to_regex("h[^e]llo").unwrap();
        assert!(negated.is_match("hallo"));
        assert!(!negated.is_match("hello"));
    }

    #[tokio::test]
    async fn test_flush_all_clears_both_kinds() {
        let store = MemoryStore::new();
        store.set_local("K-DEP-1", "a");
        store.zadd("K-TEAMS", "m", 1.0).await.unwrap();
        assert_eq!(store.key_count(), 2);

        store.flush_all().await.unwrap();

        assert_eq!(store.key_count(), 0);
        assert!(store.get("K-DEP-1").await.unwrap().is_none());
        assert!(store.zscan("K-TEAMS").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_string_write_replaces_sorted_set() {
        let store = MemoryStore::new();
        store.zadd("shared", "m", 1.0).await.unwrap();

        store.multi_set(pairs(&[("shared", "v")])).await.unwrap();

        assert!(store.zscan("shared").await.unwrap().is_empty());
        assert_eq!(store.get("shared").await.unwrap().as_deref(), Some("v"));
    }

    // ============================================================
    // SORTED COLLECTION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_zadd_reports_new_versus_updated() {
        let store = MemoryStore::new();

        assert!(store.zadd("K-TEAMS", "a", 1.0).await.unwrap());
        assert!(!store.zadd("K-TEAMS", "a", 7.0).await.unwrap());

        let all = store.zscan("K-TEAMS").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score, Some(7.0));
    }

    #[tokio::test]
    async fn test_zadd_rejects_nan_and_wrong_type() {
        let store = MemoryStore::new();
        store.set_local("K-DEP-1", "dep");

        assert!(store.zadd("K-TEAMS", "a", f64::NAN).await.is_err());
        assert!(store.zadd("K-DEP-1", "a", 1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_zrank_is_ascending_and_zero_based() {
        let store = MemoryStore::new();
        store.zadd("K-TEAMS", "high", 5.0).await.unwrap();
        store.zadd("K-TEAMS", "low", 1.0).await.unwrap();
        store.zadd("K-TEAMS", "mid", 3.0).await.unwrap();

        assert_eq!(store.zrank("K-TEAMS", "low").await.unwrap(), Some(0));
        assert_eq!(store.zrank("K-TEAMS", "mid").await.unwrap(), Some(1));
        assert_eq!(store.zrank("K-TEAMS", "high").await.unwrap(), Some(2));
        assert_eq!(store.zrank("K-TEAMS", "absent").await.unwrap(), None);
        assert_eq!(store.zrank("NO-SUCH-SET", "low").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rank_follows_score_updates() {
        let store = MemoryStore::new();
        store.zadd("K-TEAMS", "a", 1.0).await.unwrap();
        store.zadd("K-TEAMS", "b", 2.0).await.unwrap();

        store.zadd("K-TEAMS", "a", 3.0).await.unwrap();

        assert_eq!(store.zrank("K-TEAMS", "b").await.unwrap(), Some(0));
        assert_eq!(store.zrank("K-TEAMS", "a").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_equal_scores_break_ties_by_member_bytes() {
        let store = MemoryStore::new();
        // Inserted out of lexicographic order on purpose.
        store.zadd("K-TEAMS", "charlie", 1.0).await.unwrap();
        store.zadd("K-TEAMS", "alpha", 1.0).await.unwrap();
        store.zadd("K-TEAMS", "bravo", 1.0).await.unwrap();

        let members: Vec<String> = store
            .zscan("K-TEAMS")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.member)
            .collect();

        assert_eq!(members, vec!["alpha", "bravo", "charlie"]);
        assert_eq!(store.zrank("K-TEAMS", "charlie").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_range_by_score_is_closed_interval() {
        let store = MemoryStore::new();
        for (member, score) in [("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)] {
            store.zadd("K-TEAMS", member, score).await.unwrap();
        }

        let ranged = store.zrange_by_score("K-TEAMS", 2.0, 3.0).await.unwrap();
        let members: Vec<&str> = ranged.iter().map(|m| m.member.as_str()).collect();

        assert_eq!(members, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_range_by_score_inverted_bounds_is_empty() {
        let store = MemoryStore::new();
        store.zadd("K-TEAMS", "a", 2.0).await.unwrap();

        let ranged = store.zrange_by_score("K-TEAMS", 3.0, 1.0).await.unwrap();

        assert!(ranged.is_empty());
    }

    #[tokio::test]
    async fn test_range_by_score_accepts_infinite_bounds() {
        let store = MemoryStore::new();
        store.zadd("K-TEAMS", "a", -10.0).await.unwrap();
        store.zadd("K-TEAMS", "b", 10.0).await.unwrap();

        let ranged = store
            .zrange_by_score("K-TEAMS", f64::NEG_INFINITY, f64::INFINITY)
            .await
            .unwrap();

        assert_eq!(ranged.len(), 2);
    }

    // ============================================================
    // ATOMICITY UNDER CONCURRENT READS
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_multi_set_is_never_seen_half_applied() {
        const KEYS: usize = 5000;
        let store = MemoryStore::new();
        let mut partial = Vec::new();

        for round in 0..50 {
            // ARRANGE
            store.flush_all().await.unwrap();
            let entries: Vec<(String, String)> = (0..KEYS)
                .map(|i| (format!("K-DEP-{}", i), "v".to_string()))
                .collect();

            // ACT: scan repeatedly while the bulk write runs on another worker.
            let writer = store.clone();
            let write = tokio::spawn(async move { writer.multi_set(entries).await });
            while !write.is_finished() {
                let seen = store.scan_keys(&KeyScan::strings()).await.unwrap().len();
                if seen != 0 && seen != KEYS {
                    partial.push((round, seen));
                }
                tokio::task::yield_now().await;
            }
            assert!(write.await.unwrap().unwrap());
        }

        // ASSERT
        assert!(partial.is_empty(), "partial views: {:?}", partial);
        assert_eq!(store.key_count(), KEYS);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_flush_all_is_never_seen_half_applied() {
        const KEYS: usize = 2000;
        let store = MemoryStore::new();
        let any_kind = KeyScan {
            pattern: "*".to_string(),
            kind: None,
        };

        for _ in 0..20 {
            let entries: Vec<(String, String)> = (0..KEYS)
                .map(|i| (format!("K-DEP-{}", i), "v".to_string()))
                .collect();
            store.multi_set(entries).await.unwrap();
            store.zadd("K-TEAMS", "m", 1.0).await.unwrap();

            let flusher = store.clone();
            let flush = tokio::spawn(async move { flusher.flush_all().await });
            while !flush.is_finished() {
                let seen = store.scan_keys(&any_kind).await.unwrap().len();
                assert!(seen == 0 || seen == KEYS + 1, "saw {} keys mid-flush", seen);
                tokio::task::yield_now().await;
            }
            flush.await.unwrap().unwrap();
            assert_eq!(store.key_count(), 0);
        }
    }

    // ============================================================
    // REDIS (requires a running server)
    // ============================================================

    fn redis_url() -> Option<String> {
        std::env::var("REDIS_URL").ok()
    }

    #[tokio::test]
    async fn test_redis_store_sorted_collection_contract() {
        let Some(url) = redis_url() else {
            eprintln!("Skipping Redis test: REDIS_URL not set");
            return;
        };
        let store = RedisStore::connect(&url).await.unwrap();
        let key = "company-store-test-zset";

        store.zadd(key, "b", 2.0).await.unwrap();
        store.zadd(key, "a", 1.0).await.unwrap();

        assert_eq!(store.zrank(key, "b").await.unwrap(), Some(1));
        assert_eq!(store.zrange_by_score(key, 1.5, 9.0).await.unwrap().len(), 1);
        assert!(store.zrange_by_score(key, 9.0, 1.0).await.unwrap().is_empty());
    }
}
