use crate::store::error::StoreError;

use std::time::Duration;

/// Lifecycle of a single bridge.
///
/// `Armed` until the first element arrives, `Draining` while elements flow,
/// then exactly one of the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BridgeState {
    Armed = 0,
    Draining = 1,
    Completed = 2,
    Failed = 3,
}

impl BridgeState {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => BridgeState::Armed,
            1 => BridgeState::Draining,
            2 => BridgeState::Completed,
            _ => BridgeState::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BridgeState::Completed | BridgeState::Failed)
    }
}

/// Why a bridged stream did not complete.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError<E> {
    /// The stream itself yielded an error.
    #[error("stream failed: {0}")]
    Stream(E),

    /// The waiter gave up after the configured deadline.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The driver was cancelled, aborted, or dropped before a terminal event.
    #[error("cancelled before completion")]
    Cancelled,
}

impl From<BridgeError<StoreError>> for StoreError {
    fn from(err: BridgeError<StoreError>) -> Self {
        match err {
            BridgeError::Stream(inner) => inner,
            BridgeError::TimedOut(_) => StoreError::Timeout,
            BridgeError::Cancelled => StoreError::Cancelled,
        }
    }
}

/// The single terminal signal delivered to the waiter.
#[derive(Debug)]
pub enum Completion<E> {
    /// End of stream reached; `observed` elements were processed.
    Completed { observed: usize },
    /// The first failure; elements after it were not awaited.
    Failed {
        observed: usize,
        error: BridgeError<E>,
    },
}

impl<E> Completion<E> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Completion::Completed { .. })
    }

    pub fn observed(&self) -> usize {
        match self {
            Completion::Completed { observed } | Completion::Failed { observed, .. } => *observed,
        }
    }

    pub fn state(&self) -> BridgeState {
        match self {
            Completion::Completed { .. } => BridgeState::Completed,
            Completion::Failed { .. } => BridgeState::Failed,
        }
    }

    /// Number of observed elements on success, the failure otherwise.
    pub fn into_result(self) -> Result<usize, BridgeError<E>> {
        match self {
            Completion::Completed { observed } => Ok(observed),
            Completion::Failed { error, .. } => Err(error),
        }
    }
}
