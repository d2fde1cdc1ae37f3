//! Vendor and customer workers.
//!
//! Each worker runs on a dedicated OS thread named after its role
//! (`Vendor 1`, `Customer 3`, ...) so the pool's events can say who acted.
//! Workers loop until their [`CancellationToken`] fires; cancellation is
//! observed while blocked in the pool and while sleeping between iterations.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::cancel::CancellationToken;
use super::error::PoolError;
use super::ticket_pool::{PoolCore, TicketPool};

/// Which side of the pool a worker is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerRole {
    /// Produces tickets.
    Vendor,
    /// Consumes tickets.
    Customer,
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vendor => f.write_str("Vendor"),
            Self::Customer => f.write_str("Customer"),
        }
    }
}

/// Shared loop: one pool operation, then one cancellable sleep.
///
/// Returns the number of tickets moved before the loop ended.
fn run_loop<F>(role: WorkerRole, interval: Duration, cancel: &CancellationToken, mut step: F) -> usize
where
    F: FnMut(&CancellationToken) -> Result<usize, PoolError>,
{
    let mut moved = 0;
    while !cancel.is_cancelled() {
        match step(cancel) {
            Ok(n) => moved += n,
            Err(PoolError::Cancelled) => break,
            Err(e) => {
                error!(role = %role, error = %e, "worker stopping after pool error");
                break;
            }
        }
        if cancel.sleep(interval).is_err() {
            break;
        }
    }
    moved
}

/// Adds one ticket per iteration, then waits `release_interval`.
pub struct Vendor {
    pool: Arc<PoolCore>,
    release_interval: Duration,
}

impl Vendor {
    /// Create a vendor bound to `pool`.
    #[must_use]
    pub fn new(pool: &TicketPool, release_interval: Duration) -> Self {
        Self::from_core(pool.core(), release_interval)
    }

    pub(crate) const fn from_core(pool: Arc<PoolCore>, release_interval: Duration) -> Self {
        Self {
            pool,
            release_interval,
        }
    }

    /// Run on the current thread until `cancel` fires.
    ///
    /// Returns how many tickets this vendor added.
    pub fn run(&self, cancel: &CancellationToken) -> usize {
        run_loop(WorkerRole::Vendor, self.release_interval, cancel, |token| {
            self.pool.add_tickets(1, token).map(|added| added.len())
        })
    }
}

/// Removes one ticket per iteration, then waits `retrieval_interval`.
pub struct Customer {
    pool: Arc<PoolCore>,
    retrieval_interval: Duration,
}

impl Customer {
    /// Create a customer bound to `pool`.
    #[must_use]
    pub fn new(pool: &TicketPool, retrieval_interval: Duration) -> Self {
        Self::from_core(pool.core(), retrieval_interval)
    }

    pub(crate) const fn from_core(pool: Arc<PoolCore>, retrieval_interval: Duration) -> Self {
        Self {
            pool,
            retrieval_interval,
        }
    }

    /// Run on the current thread until `cancel` fires.
    ///
    /// Returns how many tickets this customer removed.
    pub fn run(&self, cancel: &CancellationToken) -> usize {
        run_loop(WorkerRole::Customer, self.retrieval_interval, cancel, |token| {
            self.pool.remove_tickets(1, token).map(|removed| removed.len())
        })
    }
}

/// Sends the worker id on drop, so a panicking worker still acknowledges.
struct ExitAck {
    id: usize,
    tx: Sender<usize>,
}

impl Drop for ExitAck {
    fn drop(&mut self) {
        let _ = self.tx.send(self.id);
    }
}

/// Handle to a spawned worker thread, owned by the pool.
pub struct WorkerHandle {
    id: usize,
    name: String,
    role: WorkerRole,
    token: CancellationToken,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Index of the worker within its start cycle.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Thread name, e.g. `Vendor 2`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vendor or customer.
    #[must_use]
    pub const fn role(&self) -> WorkerRole {
        self.role
    }

    /// Request cancellation of this worker only.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Flag the worker as cancelled without interrupting its pool wait.
    pub(crate) fn mark_cancelled(&self) {
        self.token.mark_cancelled();
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub(crate) fn join(self) -> thread::Result<()> {
        self.thread.join()
    }
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Spawn a named worker thread bound to `core`.
pub(crate) fn spawn_worker(
    id: usize,
    role: WorkerRole,
    ordinal: usize,
    core: Arc<PoolCore>,
    interval: Duration,
    exits: Sender<usize>,
) -> io::Result<WorkerHandle> {
    let name = format!("{role} {ordinal}");
    let token = CancellationToken::new();
    let worker_token = token.clone();

    let thread = thread::Builder::new().name(name.clone()).spawn(move || {
        let _ack = ExitAck { id, tx: exits };
        debug!(worker_id = id, role = %role, "worker thread started");

        let moved = match role {
            WorkerRole::Vendor => Vendor::from_core(core, interval).run(&worker_token),
            WorkerRole::Customer => Customer::from_core(core, interval).run(&worker_token),
        };

        debug!(worker_id = id, role = %role, moved, "worker thread exiting");
    })?;

    Ok(WorkerHandle {
        id,
        name,
        role,
        token,
        thread,
    })
}
