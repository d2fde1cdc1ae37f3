//! Bounded ticket pool with guarded waits and worker lifecycle control.
//!
//! All ticket state lives behind a single `parking_lot::Mutex` paired with one
//! `parking_lot::Condvar`. Every state change broadcasts on that condition
//! variable and every waiter re-checks its predicate after waking, so a vendor
//! waiting for headroom and a customer waiting for stock never act on stale
//! state.
//!
//! Events are delivered under the same lock so their order matches ticket
//! sequence order. Waiters are woken before the sink runs, so a panicking
//! sink cannot strand them.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::cancel::CancellationToken;
use super::error::PoolError;
use super::events::{EventSink, TicketEvent, TracingSink};
use super::ticket::Ticket;
use super::worker::{spawn_worker, WorkerHandle, WorkerRole};

/// Default time `stop` waits for workers to acknowledge cancellation.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

/// How `remove_tickets` treats a request larger than the current stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Block only while empty, then take up to the requested count.
    #[default]
    Partial,
    /// Block until the full requested count is available.
    WaitForFull,
}

/// Construction parameters for a [`TicketPool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolLimits {
    /// Tickets present when the pool is created.
    pub initial_count: usize,
    /// Maximum tickets resident at once.
    pub capacity: usize,
    /// Removal policy for requests larger than the stock.
    pub removal_policy: RemovalPolicy,
    /// How long `stop` waits for workers to exit.
    pub stop_grace: Duration,
}

impl PoolLimits {
    /// Limits with the default policy and grace period.
    #[must_use]
    pub const fn new(initial_count: usize, capacity: usize) -> Self {
        Self {
            initial_count,
            capacity,
            removal_policy: RemovalPolicy::Partial,
            stop_grace: DEFAULT_STOP_GRACE,
        }
    }

    /// Check the construction invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfiguration`] for a zero capacity or an
    /// initial count above capacity.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.capacity == 0 {
            return Err(PoolError::InvalidConfiguration(
                "capacity must be greater than 0".into(),
            ));
        }
        if self.initial_count > self.capacity {
            return Err(PoolError::InvalidConfiguration(format!(
                "initial count {} exceeds capacity {}",
                self.initial_count, self.capacity
            )));
        }
        Ok(())
    }
}

/// State guarded by the pool lock.
struct PoolState {
    buffer: VecDeque<Ticket>,
    next_sequence: u64,
}

/// Shared core of the pool, held by the pool and by each worker.
pub(crate) struct PoolCore {
    capacity: usize,
    removal_policy: RemovalPolicy,
    state: Mutex<PoolState>,
    /// Broadcast after every state change and on cancellation.
    changed: Condvar,
    /// Set under the state lock by `start`; cleared by `stop` without it.
    running: AtomicBool,
    sink: Arc<dyn EventSink>,
}

fn actor_name() -> String {
    thread::current().name().unwrap_or("unnamed").to_string()
}

impl PoolCore {
    pub(crate) fn add_tickets(
        self: &Arc<Self>,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Ticket>, PoolError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if count > self.capacity {
            return Err(PoolError::ExceedsCapacity {
                requested: count,
                capacity: self.capacity,
            });
        }
        cancel.register(self);

        let mut state = self.state.lock();
        let mut announced = false;
        loop {
            if cancel.is_cancelled() {
                return Err(PoolError::Cancelled);
            }
            if state.buffer.len() + count <= self.capacity {
                break;
            }
            if !announced {
                self.sink.emit(&TicketEvent::CapacityReached {
                    actor: actor_name(),
                    requested: count,
                    capacity: self.capacity,
                });
                announced = true;
            }
            self.changed.wait(&mut state);
        }

        let first = state.next_sequence;
        state.next_sequence += count as u64;
        let tickets: Vec<Ticket> = (first..state.next_sequence).map(Ticket::new).collect();
        state.buffer.extend(tickets.iter().copied());
        self.changed.notify_all();

        self.sink.emit(&TicketEvent::TicketsAdded {
            actor: actor_name(),
            tickets: tickets.clone(),
            total: state.buffer.len(),
        });
        Ok(tickets)
    }

    pub(crate) fn remove_tickets(
        self: &Arc<Self>,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Ticket>, PoolError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if self.removal_policy == RemovalPolicy::WaitForFull && count > self.capacity {
            return Err(PoolError::ExceedsCapacity {
                requested: count,
                capacity: self.capacity,
            });
        }
        cancel.register(self);

        let mut state = self.state.lock();
        let mut announced = false;
        loop {
            if cancel.is_cancelled() {
                return Err(PoolError::Cancelled);
            }
            let ready = match self.removal_policy {
                RemovalPolicy::Partial => !state.buffer.is_empty(),
                RemovalPolicy::WaitForFull => state.buffer.len() >= count,
            };
            if ready {
                break;
            }
            if !announced {
                self.sink.emit(&TicketEvent::NoTickets {
                    actor: actor_name(),
                });
                announced = true;
            }
            self.changed.wait(&mut state);
        }

        let take = count.min(state.buffer.len());
        let tickets: Vec<Ticket> = state.buffer.drain(..take).collect();
        self.changed.notify_all();

        self.sink.emit(&TicketEvent::TicketsRemoved {
            actor: actor_name(),
            tickets: tickets.clone(),
            total: state.buffer.len(),
        });
        Ok(tickets)
    }

    pub(crate) fn ticket_count(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// Wake every waiter so it re-checks its cancellation token.
    pub(crate) fn interrupt(&self) {
        let _state = self.state.lock();
        self.changed.notify_all();
    }

    /// Like [`PoolCore::interrupt`], but gives up at `deadline` if another
    /// thread holds the lock. Returns whether the waiters were woken.
    ///
    /// A holder that eventually finishes an add or remove broadcasts on its
    /// own, so waiters still observe their cancelled tokens.
    fn interrupt_until(&self, deadline: Instant) -> bool {
        self.state.try_lock_until(deadline).is_some_and(|_state| {
            self.changed.notify_all();
            true
        })
    }
}

/// Workers of the current start/stop cycle.
struct Run {
    id: Uuid,
    workers: Vec<WorkerHandle>,
    exits: Receiver<usize>,
}

/// Bounded, thread-safe pool of tickets shared by vendor and customer workers.
///
/// ```
/// use ticket_pool::core::{CancellationToken, TicketPool};
///
/// let pool = TicketPool::new(2, 5)?;
/// let token = CancellationToken::new();
///
/// let added = pool.add_tickets(3, &token)?;
/// assert_eq!(added.first().map(|t| t.sequence()), Some(3));
///
/// let removed = pool.remove_tickets(10, &token)?;
/// assert_eq!(removed.len(), 5);
/// assert_eq!(pool.ticket_count(), 0);
/// # Ok::<(), ticket_pool::core::PoolError>(())
/// ```
pub struct TicketPool {
    core: Arc<PoolCore>,
    stop_grace: Duration,
    /// Serializes `start` and `stop`; holds the workers of the active cycle.
    lifecycle: Mutex<Option<Run>>,
}

impl TicketPool {
    /// Create a pool with `initial_count` tickets numbered `1..=initial_count`.
    ///
    /// Events go to [`TracingSink`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfiguration`] if `capacity` is zero or
    /// `initial_count` exceeds it.
    pub fn new(initial_count: usize, capacity: usize) -> Result<Self, PoolError> {
        Self::with_sink(initial_count, capacity, Arc::new(TracingSink))
    }

    /// Create a pool that reports events to `sink`.
    ///
    /// # Errors
    ///
    /// See [`TicketPool::new`].
    pub fn with_sink(
        initial_count: usize,
        capacity: usize,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, PoolError> {
        Self::from_limits(PoolLimits::new(initial_count, capacity), sink)
    }

    /// Create a pool from full construction parameters.
    ///
    /// # Errors
    ///
    /// See [`TicketPool::new`].
    pub fn from_limits(limits: PoolLimits, sink: Arc<dyn EventSink>) -> Result<Self, PoolError> {
        limits.validate()?;

        let mut buffer = VecDeque::with_capacity(limits.capacity.min(4096));
        buffer.extend((1..=limits.initial_count as u64).map(Ticket::new));

        debug!(
            initial_count = limits.initial_count,
            capacity = limits.capacity,
            policy = ?limits.removal_policy,
            "ticket pool created"
        );

        Ok(Self {
            core: Arc::new(PoolCore {
                capacity: limits.capacity,
                removal_policy: limits.removal_policy,
                state: Mutex::new(PoolState {
                    buffer,
                    next_sequence: limits.initial_count as u64 + 1,
                }),
                changed: Condvar::new(),
                running: AtomicBool::new(false),
                sink,
            }),
            stop_grace: limits.stop_grace,
            lifecycle: Mutex::new(None),
        })
    }

    /// Append `count` tickets, blocking while they would not fit.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Cancelled`] if `cancel` fires before the tickets fit;
    ///   the pool is left untouched.
    /// - [`PoolError::ExceedsCapacity`] if `count` is larger than capacity.
    pub fn add_tickets(
        &self,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Ticket>, PoolError> {
        self.core.add_tickets(count, cancel)
    }

    /// Remove up to `count` tickets from the front, blocking while empty.
    ///
    /// Under [`RemovalPolicy::Partial`] fewer than `count` tickets may be
    /// returned; under [`RemovalPolicy::WaitForFull`] the call waits for all
    /// of them.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Cancelled`] if `cancel` fires while waiting; the pool
    ///   is left untouched.
    /// - [`PoolError::ExceedsCapacity`] under `WaitForFull` when `count`
    ///   could never be satisfied.
    pub fn remove_tickets(
        &self,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Ticket>, PoolError> {
        self.core.remove_tickets(count, cancel)
    }

    /// Number of tickets currently in the pool.
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.core.ticket_count()
    }

    /// Whether vendor and customer workers are currently active.
    ///
    /// Never blocks.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.core.running.load(Ordering::SeqCst)
    }

    /// Maximum number of tickets the pool can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.core.capacity
    }

    /// Configured removal policy.
    #[must_use]
    pub fn removal_policy(&self) -> RemovalPolicy {
        self.core.removal_policy
    }

    /// Identifier of the active start/stop cycle, if running.
    #[must_use]
    pub fn run_id(&self) -> Option<Uuid> {
        self.lifecycle.lock().as_ref().map(|run| run.id)
    }

    /// Names of the workers spawned by the active cycle.
    #[must_use]
    pub fn worker_names(&self) -> Vec<String> {
        self.lifecycle
            .lock()
            .as_ref()
            .map(|run| run.workers.iter().map(|w| w.name().to_string()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn core(&self) -> Arc<PoolCore> {
        Arc::clone(&self.core)
    }

    /// Spawn `num_vendors` vendors and `num_customers` customers.
    ///
    /// The running flag flips to `true` under the pool lock only after every
    /// worker thread exists, so no observer sees a running pool without its
    /// workers.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidConfiguration`] if both counts are zero.
    /// - [`PoolError::AlreadyRunning`] if a cycle is active; nothing changes.
    /// - [`PoolError::Spawn`] if a thread cannot be created; workers spawned
    ///   so far are cancelled and the pool stays stopped.
    pub fn start(
        &self,
        num_vendors: usize,
        num_customers: usize,
        vendor_interval: Duration,
        customer_interval: Duration,
    ) -> Result<(), PoolError> {
        self.start_with(
            num_vendors,
            num_customers,
            vendor_interval,
            customer_interval,
            spawn_worker,
        )
    }

    fn start_with<F>(
        &self,
        num_vendors: usize,
        num_customers: usize,
        vendor_interval: Duration,
        customer_interval: Duration,
        mut spawn: F,
    ) -> Result<(), PoolError>
    where
        F: FnMut(
            usize,
            WorkerRole,
            usize,
            Arc<PoolCore>,
            Duration,
            Sender<usize>,
        ) -> io::Result<WorkerHandle>,
    {
        if num_vendors + num_customers == 0 {
            return Err(PoolError::InvalidConfiguration(
                "at least one vendor or customer is required".into(),
            ));
        }
        let mut lifecycle = self.lifecycle.lock();
        if self.is_running() {
            return Err(PoolError::AlreadyRunning);
        }
        let state = self.core.state.lock();

        let run_id = Uuid::new_v4();
        let (exit_tx, exits) = unbounded();
        let plan = (1..=num_vendors)
            .map(|n| (WorkerRole::Vendor, n, vendor_interval))
            .chain((1..=num_customers).map(|n| (WorkerRole::Customer, n, customer_interval)));

        let mut workers = Vec::with_capacity(num_vendors + num_customers);
        for (id, (role, ordinal, interval)) in plan.enumerate() {
            match spawn(id, role, ordinal, self.core(), interval, exit_tx.clone()) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    // Flag before unlocking so no spawned worker touches the pool.
                    for worker in &workers {
                        worker.mark_cancelled();
                    }
                    drop(state);
                    error!(run_id = %run_id, error = %e, "failed to spawn worker, rolling back");
                    let run = Run { id: run_id, workers, exits };
                    if let Err(leak) = self.shut_down(run) {
                        error!(error = %leak, "rollback after spawn failure leaked workers");
                    }
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        self.core.running.store(true, Ordering::SeqCst);
        self.core.sink.emit(&TicketEvent::Started {
            run_id,
            vendors: num_vendors,
            customers: num_customers,
        });
        drop(state);

        info!(
            run_id = %run_id,
            vendors = num_vendors,
            customers = num_customers,
            vendor_interval_ms = vendor_interval.as_millis(),
            customer_interval_ms = customer_interval.as_millis(),
            "ticketing system started"
        );
        *lifecycle = Some(Run {
            id: run_id,
            workers,
            exits,
        });
        Ok(())
    }

    /// Cancel every worker and wait for them to exit.
    ///
    /// Tickets are kept; a later `start` resumes from the current count.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotRunning`] if no cycle is active; nothing changes.
    /// - [`PoolError::WorkerLeak`] if some worker did not exit within the
    ///   grace period. The pool is still marked stopped.
    pub fn stop(&self) -> Result<(), PoolError> {
        let mut lifecycle = self.lifecycle.lock();
        if !self.is_running() {
            return Err(PoolError::NotRunning);
        }
        let Some(run) = lifecycle.take() else {
            return Err(PoolError::NotRunning);
        };
        let run_id = run.id;
        let worker_count = run.workers.len();

        let outcome = self.shut_down(run);

        // Not under the pool lock: a leaked worker may still hold it.
        self.core.running.store(false, Ordering::SeqCst);
        self.core.sink.emit(&TicketEvent::Stopped {
            run_id,
            workers: worker_count,
        });

        info!(run_id = %run_id, workers = worker_count, "ticketing system stopped");
        outcome
    }

    /// Cancel the workers of `run` and join those that acknowledge in time.
    ///
    /// The whole call, including waking blocked workers, is bounded by the
    /// stop grace period.
    fn shut_down(&self, run: Run) -> Result<(), PoolError> {
        let Run { id, workers, exits } = run;
        let deadline = Instant::now() + self.stop_grace;
        for worker in &workers {
            worker.mark_cancelled();
        }
        if !self.core.interrupt_until(deadline) {
            warn!(run_id = %id, "pool lock held past the stop grace period");
        }

        let mut pending: HashMap<usize, WorkerHandle> =
            workers.into_iter().map(|w| (w.id(), w)).collect();
        while !pending.is_empty() {
            let Ok(worker_id) = exits.recv_deadline(deadline) else {
                break;
            };
            if let Some(worker) = pending.remove(&worker_id) {
                let name = worker.name().to_string();
                if worker.join().is_err() {
                    warn!(run_id = %id, worker = %name, "worker panicked before stopping");
                } else {
                    debug!(worker = %name, "worker joined");
                }
            }
        }

        if pending.is_empty() {
            return Ok(());
        }
        let mut leaked: Vec<String> = pending.values().map(|w| w.name().to_string()).collect();
        leaked.sort();
        error!(
            run_id = %id,
            grace_ms = self.stop_grace.as_millis(),
            workers = ?leaked,
            "workers ignored cancellation"
        );
        Err(PoolError::WorkerLeak {
            workers: leaked,
            grace: self.stop_grace,
        })
    }
}

impl Drop for TicketPool {
    fn drop(&mut self) {
        // Signal but don't join; explicit stop() is required for a graceful exit.
        if let Some(run) = self.lifecycle.get_mut().take() {
            for worker in &run.workers {
                worker.mark_cancelled();
            }
            self.core.interrupt_until(Instant::now() + self.stop_grace);
            debug!(run_id = %run.id, "ticket pool dropped while running, workers detached");
        }
    }
}

impl fmt::Debug for TicketPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.core.state.lock();
        f.debug_struct("TicketPool")
            .field("capacity", &self.core.capacity)
            .field("tickets", &state.buffer.len())
            .field("next_sequence", &state.next_sequence)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
