//! Cooperative cancellation for pool waits and worker sleeps.
//!
//! A [`CancellationToken`] reaches a worker at each of its three suspension
//! points: the capacity wait in `add_tickets`, the emptiness wait in
//! `remove_tickets`, and the sleep between iterations. Cancelling never relies
//! on a timeout expiring:
//!
//! - Sleeps block on a zero-capacity channel whose only sender is dropped on
//!   cancel, so `recv_timeout` returns `Disconnected` immediately.
//! - Pool waits register the pool with the token before blocking; cancel then
//!   takes the pool lock and broadcasts on its condition variable.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use super::error::PoolError;
use super::ticket_pool::PoolCore;

/// One-shot cancellation signal shared between an owner and a blocked call.
///
/// Cloning yields another handle to the same signal.
///
/// ```
/// use std::time::Duration;
/// use ticket_pool::core::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(token.sleep(Duration::from_millis(1)).is_ok());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.sleep(Duration::from_secs(60)).is_err());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    wake_tx: Mutex<Option<Sender<()>>>,
    wake_rx: Receiver<()>,
    pools: Mutex<Vec<Weak<PoolCore>>>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                wake_tx: Mutex::new(Some(wake_tx)),
                wake_rx,
                pools: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Request cancellation and wake every wait or sleep using this token.
    ///
    /// Idempotent. Must not be called while holding a pool's internal lock,
    /// which only the pool itself can do.
    pub fn cancel(&self) {
        if !self.mark_cancelled() {
            return;
        }

        let pools: Vec<Weak<PoolCore>> = self.inner.pools.lock().drain(..).collect();
        for pool in pools.iter().filter_map(Weak::upgrade) {
            pool.interrupt();
        }
    }

    /// Set the flag and wake sleepers, leaving registered pools untouched.
    ///
    /// The caller becomes responsible for interrupting any pool the token
    /// may be waiting on. Returns `false` if the token was already cancelled.
    pub(crate) fn mark_cancelled(&self) -> bool {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.inner.wake_tx.lock().take();
        true
    }

    /// Whether `cancel` has been called on any clone of this token.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Cancelled`] if the token is cancelled before or
    /// during the sleep.
    pub fn sleep(&self, duration: Duration) -> Result<(), PoolError> {
        if self.is_cancelled() {
            return Err(PoolError::Cancelled);
        }
        match self.inner.wake_rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(PoolError::Cancelled),
        }
    }

    /// Make `cancel` wake waiters blocked on `pool`.
    ///
    /// Called before the caller re-checks `is_cancelled` under the pool lock,
    /// which closes the window between the check and the wait.
    pub(crate) fn register(&self, pool: &Arc<PoolCore>) {
        let mut pools = self.inner.pools.lock();
        if self.is_cancelled() {
            return;
        }
        pools.retain(|p| p.strong_count() > 0);
        if !pools.iter().any(|p| std::ptr::eq(p.as_ptr(), Arc::as_ptr(pool))) {
            pools.push(Arc::downgrade(pool));
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
