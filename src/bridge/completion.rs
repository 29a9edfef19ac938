//! Completion Bridge
//!
//! Runs an asynchronous stream to its end (or first failure) on the tokio runtime
//! and hands the caller one terminal signal, either awaited or waited on from a
//! plain thread.
//!
//! ## Lifecycle
//! 1. **Arm**: `CompletionBridge::arm` registers the single participant before any
//!    subscription exists, so an empty stream can never be missed.
//! 2. **Subscribe**: the stream is moved into a driver task that counts elements and
//!    forwards each one to the caller's `on_next` callback.
//! 3. **Deregister**: the driver resolves the bridge exactly once, on end-of-stream
//!    or on the first error. The rest of the stream is dropped, not awaited.
//! 4. **Wait**: `BridgeHandle::wait` / `wait_blocking` return the `Completion`.
//!
//! A bridge is consumed by `subscribe` and its handle by `wait`; there is no way to
//! re-arm it for a second stream.

use super::types::{BridgeError, BridgeState, Completion};

use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

/// Shared state between the driver, the waiter and any canceller.
struct Rendezvous<E> {
    label: String,
    state: AtomicU8,
    observed: AtomicUsize,
    participants: AtomicUsize,
    signal: Mutex<Option<oneshot::Sender<Completion<E>>>>,
}

impl<E> Rendezvous<E> {
    fn state(&self) -> BridgeState {
        BridgeState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn observe(&self) -> usize {
        let seen = self.observed.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.state.compare_exchange(
            BridgeState::Armed as u8,
            BridgeState::Draining as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        seen
    }

    /// Arrives and deregisters. Only the first caller delivers a completion;
    /// later calls return `false` and do nothing.
    fn resolve(&self, completion: impl FnOnce(usize) -> Completion<E>) -> bool {
        let mut slot = self.signal.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = slot.take() else {
            return false;
        };

        let completion = completion(self.observed.load(Ordering::SeqCst));
        self.state.store(completion.state() as u8, Ordering::SeqCst);
        self.participants.fetch_sub(1, Ordering::SeqCst);

        // The waiter may already be gone; the state above still records the outcome.
        let _ = sender.send(completion);
        true
    }

    fn settle(
        &self,
        received: Result<Completion<E>, oneshot::error::RecvError>,
    ) -> Completion<E> {
        received.unwrap_or_else(|_| Completion::Failed {
            observed: self.observed.load(Ordering::SeqCst),
            error: BridgeError::Cancelled,
        })
    }
}

/// Resolves the bridge as cancelled if the driver is dropped early
/// (aborted, panicked, or torn down with the runtime).
struct CancelOnDrop<E>(Arc<Rendezvous<E>>);

impl<E> Drop for CancelOnDrop<E> {
    fn drop(&mut self) {
        if self.0.resolve(|observed| Completion::Failed {
            observed,
            error: BridgeError::Cancelled,
        }) {
            tracing::warn!("{}: driver dropped before a terminal event", self.0.label);
        }
    }
}

/// An armed, not yet subscribed bridge.
pub struct CompletionBridge<E> {
    rendezvous: Arc<Rendezvous<E>>,
    receiver: oneshot::Receiver<Completion<E>>,
    timeout: Option<Duration>,
}

impl<E> CompletionBridge<E>
where
    E: Display + Send + 'static,
{
    /// Registers interest for one stream. `label` only appears in logs.
    pub fn arm(label: &str) -> Self {
        let (sender, receiver) = oneshot::channel();
        let rendezvous = Arc::new(Rendezvous {
            label: label.to_string(),
            state: AtomicU8::new(BridgeState::Armed as u8),
            observed: AtomicUsize::new(0),
            participants: AtomicUsize::new(1),
            signal: Mutex::new(Some(sender)),
        });

        Self {
            rendezvous,
            receiver,
            timeout: None,
        }
    }

    /// Bounds how long `wait` will block. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> BridgeState {
        self.rendezvous.state()
    }

    /// Number of participants that have not yet deregistered (1 or 0).
    pub fn participants(&self) -> usize {
        self.rendezvous.participants.load(Ordering::SeqCst)
    }

    /// Subscribes on the runtime of the calling context.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime; use `subscribe_on` there.
    pub fn subscribe<S, T, F>(self, stream: S, on_next: F) -> BridgeHandle<E>
    where
        S: Stream<Item = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let runtime = Handle::current();
        self.subscribe_on(&runtime, stream, on_next)
    }

    /// Moves `stream` into a driver task spawned on `runtime`.
    pub fn subscribe_on<S, T, F>(self, runtime: &Handle, stream: S, on_next: F) -> BridgeHandle<E>
    where
        S: Stream<Item = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        tracing::debug!("{}: subscribing", self.rendezvous.label);

        let driver = runtime.spawn(drive(self.rendezvous.clone(), stream, on_next));

        BridgeHandle {
            rendezvous: self.rendezvous,
            receiver: self.receiver,
            driver: Arc::new(driver.abort_handle()),
            runtime: runtime.clone(),
            timeout: self.timeout,
        }
    }
}

async fn drive<S, T, E, F>(rendezvous: Arc<Rendezvous<E>>, stream: S, mut on_next: F)
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    E: Display,
    F: FnMut(T),
{
    let _guard = CancelOnDrop(rendezvous.clone());
    let mut stream = std::pin::pin!(stream);

    while let Some(item) = stream.next().await {
        match item {
            Ok(value) => {
                let seen = rendezvous.observe();
                tracing::trace!("{}: element {} observed", rendezvous.label, seen);
                on_next(value);
            }
            Err(error) => {
                tracing::error!("{}: stream failed: {}", rendezvous.label, error);
                rendezvous.resolve(|observed| Completion::Failed {
                    observed,
                    error: BridgeError::Stream(error),
                });
                return;
            }
        }
    }

    rendezvous.resolve(|observed| Completion::Completed { observed });
    tracing::debug!("{}: completed", rendezvous.label);
}

/// A subscribed bridge; the only way to obtain its `Completion`.
pub struct BridgeHandle<E> {
    rendezvous: Arc<Rendezvous<E>>,
    receiver: oneshot::Receiver<Completion<E>>,
    driver: Arc<AbortHandle>,
    runtime: Handle,
    timeout: Option<Duration>,
}

impl<E> BridgeHandle<E>
where
    E: Display + Send + 'static,
{
    pub fn label(&self) -> &str {
        &self.rendezvous.label
    }

    pub fn state(&self) -> BridgeState {
        self.rendezvous.state()
    }

    pub fn participants(&self) -> usize {
        self.rendezvous.participants.load(Ordering::SeqCst)
    }

    /// A cloneable handle that can cancel the driver from elsewhere.
    pub fn canceller(&self) -> BridgeCanceller<E> {
        BridgeCanceller {
            rendezvous: self.rendezvous.clone(),
            driver: self.driver.clone(),
        }
    }

    /// Awaits the terminal signal.
    pub async fn wait(self) -> Completion<E> {
        let BridgeHandle {
            rendezvous,
            mut receiver,
            driver,
            timeout,
            ..
        } = self;

        if let Some(limit) = timeout {
            if let Ok(received) = tokio::time::timeout(limit, &mut receiver).await {
                return rendezvous.settle(received);
            }
            if rendezvous.resolve(|observed| Completion::Failed {
                observed,
                error: BridgeError::TimedOut(limit),
            }) {
                tracing::warn!("{}: gave up after {:?}", rendezvous.label, limit);
            }
            driver.abort();
        }

        let received = receiver.await;
        rendezvous.settle(received)
    }

    /// Blocks the current thread until the terminal signal arrives.
    ///
    /// Must be called from a thread that is not driving a runtime, and the runtime
    /// must be multi-threaded so the driver keeps running meanwhile.
    ///
    /// # Panics
    /// Panics when called from within an asynchronous context.
    pub fn wait_blocking(self) -> Completion<E> {
        let runtime = self.runtime.clone();
        runtime.block_on(self.wait())
    }
}

/// Cancels a running bridge. Cancelling a bridge that already reached a
/// terminal state has no effect.
pub struct BridgeCanceller<E> {
    rendezvous: Arc<Rendezvous<E>>,
    driver: Arc<AbortHandle>,
}

impl<E> Clone for BridgeCanceller<E> {
    fn clone(&self) -> Self {
        Self {
            rendezvous: self.rendezvous.clone(),
            driver: self.driver.clone(),
        }
    }
}

impl<E> BridgeCanceller<E> {
    /// Returns `true` if this call is what terminated the bridge.
    pub fn cancel(&self) -> bool {
        let cancelled = self.rendezvous.resolve(|observed| Completion::Failed {
            observed,
            error: BridgeError::Cancelled,
        });
        self.driver.abort();
        if cancelled {
            tracing::info!("{}: cancelled", self.rendezvous.label);
        }
        cancelled
    }
}
