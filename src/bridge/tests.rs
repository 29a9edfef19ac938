//! Completion Bridge Tests
//!
//! ## Test Scopes
//! - **Termination**: empty streams, full drains, first-error exits.
//! - **State machine**: Armed -> Draining -> Completed | Failed, single deregistration.
//! - **Waiting modes**: async `wait`, `wait_blocking` from a plain thread, timeouts, cancellation.

#[cfg(test)]
mod tests {
    use crate::bridge::completion::CompletionBridge;
    use crate::bridge::types::{BridgeError, BridgeState, Completion};
    use crate::store::error::{StoreError, StoreResult};
    use futures::stream::{self, StreamExt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn boom() -> StoreError {
        StoreError::Command("boom".to_string())
    }

    // ============================================================
    // TERMINATION
    // ============================================================

    #[tokio::test]
    async fn test_empty_stream_completes() {
        let bridge = CompletionBridge::<StoreError>::arm("empty");

        let completion = bridge
            .subscribe(stream::empty::<StoreResult<u32>>(), |_| {})
            .wait()
            .await;

        assert!(completion.is_completed());
        assert_eq!(completion.observed(), 0);
        assert_eq!(completion.state(), BridgeState::Completed);
    }

    #[tokio::test]
    async fn test_every_element_reaches_on_next() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let items: Vec<StoreResult<u32>> = (1..=5).map(Ok).collect();
        let completion = CompletionBridge::arm("drain")
            .subscribe(stream::iter(items), move |value| {
                sink.lock().unwrap().push(value);
            })
            .wait()
            .await;

        assert_eq!(completion.into_result().unwrap(), 5);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_first_error_releases_waiter_without_draining_rest() {
        // ARRANGE: two good elements, a failure, then a tail that never ends.
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let head: Vec<StoreResult<u32>> = vec![Ok(1), Ok(2), Err(boom()), Ok(99)];
        let endless = stream::iter(head).chain(stream::pending());

        // ACT
        let completion = CompletionBridge::arm("failing")
            .subscribe(endless, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .wait()
            .await;

        // ASSERT: waiter released, element after the error never processed.
        assert_eq!(completion.state(), BridgeState::Failed);
        assert_eq!(completion.observed(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        match completion {
            Completion::Failed {
                error: BridgeError::Stream(StoreError::Command(msg)),
                ..
            } => assert_eq!(msg, "boom"),
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_as_first_element() {
        let completion = CompletionBridge::arm("fail-fast")
            .subscribe(stream::iter(vec![StoreResult::<u32>::Err(boom())]), |_| {})
            .wait()
            .await;

        assert_eq!(completion.observed(), 0);
        assert!(matches!(
            completion.into_result(),
            Err(BridgeError::Stream(StoreError::Command(_)))
        ));
    }

    // ============================================================
    // STATE MACHINE
    // ============================================================

    #[tokio::test]
    async fn test_armed_then_draining_then_cancelled() {
        let bridge = CompletionBridge::<StoreError>::arm("states");
        assert_eq!(bridge.state(), BridgeState::Armed);
        assert_eq!(bridge.participants(), 1);

        let (first_tx, first_rx) = tokio::sync::oneshot::channel::<()>();
        let mut first_tx = Some(first_tx);
        let source = stream::iter(vec![StoreResult::Ok(1u32)]).chain(stream::pending());

        let handle = bridge.subscribe(source, move |_| {
            if let Some(tx) = first_tx.take() {
                let _ = tx.send(());
            }
        });
        first_rx.await.unwrap();

        assert_eq!(handle.state(), BridgeState::Draining);
        assert_eq!(handle.participants(), 1);

        let canceller = handle.canceller();
        assert!(canceller.cancel());
        assert_eq!(handle.participants(), 0);

        let completion = handle.wait().await;
        assert_eq!(completion.observed(), 1);
        assert!(matches!(
            completion,
            Completion::Failed {
                error: BridgeError::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_deregisters_exactly_once() {
        let handle = CompletionBridge::<StoreError>::arm("once")
            .subscribe(stream::iter(vec![StoreResult::Ok(1u32)]), |_| {});
        let canceller = handle.canceller();

        let completion = handle.wait().await;

        assert!(completion.is_completed());
        // The terminal state is already recorded; a late cancel changes nothing.
        assert!(!canceller.cancel());
    }

    #[tokio::test]
    async fn test_panicking_callback_resolves_as_cancelled() {
        let completion = CompletionBridge::arm("panics")
            .subscribe(stream::iter(vec![StoreResult::Ok(1u32)]), |_| {
                panic!("callback exploded");
            })
            .wait()
            .await;

        assert!(matches!(
            completion.into_result(),
            Err(BridgeError::Cancelled)
        ));
    }

    // ============================================================
    // WAITING MODES
    // ============================================================

    #[tokio::test]
    async fn test_timeout_fails_a_stalled_stream() {
        let completion = CompletionBridge::<StoreError>::arm("stalled")
            .with_timeout(Some(Duration::from_millis(50)))
            .subscribe(stream::pending::<StoreResult<u32>>(), |_| {})
            .wait()
            .await;

        assert!(matches!(
            completion.into_result(),
            Err(BridgeError::TimedOut(limit)) if limit == Duration::from_millis(50)
        ));
    }

    #[tokio::test]
    async fn test_timeout_does_not_affect_fast_streams() {
        let completion = CompletionBridge::<StoreError>::arm("fast")
            .with_timeout(Some(Duration::from_secs(5)))
            .subscribe(stream::iter(vec![StoreResult::Ok(1u32), Ok(2)]), |_| {})
            .wait()
            .await;

        assert_eq!(completion.into_result().unwrap(), 2);
    }

    #[test]
    fn test_wait_blocking_from_plain_thread() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();

        let delayed = stream::iter(1..=3u32).then(|n| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            StoreResult::Ok(n)
        });

        let completion = CompletionBridge::<StoreError>::arm("blocking")
            .subscribe_on(runtime.handle(), delayed, |_| {})
            .wait_blocking();

        assert_eq!(completion.into_result().unwrap(), 3);
    }

    #[test]
    fn test_bridge_error_maps_onto_store_error() {
        let timed_out: StoreError = BridgeError::<StoreError>::TimedOut(Duration::from_secs(1)).into();
        assert!(matches!(timed_out, StoreError::Timeout));

        let cancelled: StoreError = BridgeError::<StoreError>::Cancelled.into();
        assert!(matches!(cancelled, StoreError::Cancelled));

        let inner: StoreError = BridgeError::Stream(boom()).into();
        assert!(matches!(inner, StoreError::Command(_)));
    }
}
