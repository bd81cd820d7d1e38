//! Fixed-size thread pool with deadline-based shutdown.
//!
//! [`WorkerPool`] spawns a fixed number of named worker threads that pull
//! tasks from a shared [`crossbeam_channel`] queue. Shutdown is a two-step
//! affair:
//!
//! 1. [`shutdown`](WorkerPool::shutdown) closes the queue: no new tasks are
//!    accepted, already queued tasks still run.
//! 2. [`shutdown_and_wait`](WorkerPool::shutdown_and_wait) additionally blocks
//!    until every submitted task has finished or the deadline elapses.
//!
//! Tasks still running at the deadline are abandoned: they are neither killed
//! nor joined, and the call returns [`Termination::TimedOut`]. This is not an
//! error. Tasks that want to stop earlier should watch a
//! [`CancellationToken`](crate::cancel::CancellationToken).
//!
//! # Examples
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use biblioteca::pool::{Termination, WorkerPool};
//!
//! let pool = WorkerPool::new(4).unwrap();
//! let done = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..10 {
//!     let done = Arc::clone(&done);
//!     pool.submit(move || {
//!         done.fetch_add(1, Ordering::Relaxed);
//!     })
//!     .unwrap();
//! }
//!
//! let termination = pool.shutdown_and_wait(Duration::from_secs(10));
//! assert_eq!(termination, Termination::Completed);
//! assert_eq!(done.load(Ordering::Relaxed), 10);
//! ```

use crate::observers::panic_message;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Error type for pool construction and submission.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A pool needs at least one worker.
    #[error("worker pool capacity must be at least 1")]
    ZeroCapacity,

    /// The operating system refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),

    /// The pool no longer accepts tasks.
    #[error("worker pool is shut down")]
    ShutDown,
}

/// How [`WorkerPool::shutdown_and_wait`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every submitted task finished before the deadline.
    Completed,
    /// The deadline elapsed with `abandoned` tasks still queued or running.
    TimedOut {
        /// Tasks that were no longer awaited.
        abandoned: usize,
    },
}

impl Termination {
    /// Returns `true` if every task finished.
    pub fn is_completed(&self) -> bool {
        matches!(self, Termination::Completed)
    }

    /// Number of tasks left behind at the deadline.
    pub fn abandoned(&self) -> usize {
        match self {
            Termination::Completed => 0,
            Termination::TimedOut { abandoned } => *abandoned,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Completed => write!(f, "all tasks completed"),
            Termination::TimedOut { abandoned } => {
                write!(f, "deadline elapsed, {} task(s) abandoned", abandoned)
            }
        }
    }
}

/// Count of submitted but unfinished tasks.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    drained: Condvar,
}

impl Pending {
    fn begin(&self) {
        *self.count.lock() += 1;
    }

    fn finish(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.drained.notify_all();
        }
    }
}

/// A fixed set of worker threads executing submitted tasks.
///
/// Capacity should cover every long-lived task: a task that never returns
/// occupies its worker forever, and tasks queued behind a full pool wait for
/// a free worker.
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Task>>>,
    pending: Arc<Pending>,
    capacity: usize,
}

impl WorkerPool {
    /// Spawns `capacity` worker threads named `pool-worker-<n>`.
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }

        let (sender, receiver) = crossbeam_channel::unbounded::<Task>();
        let pending = Arc::new(Pending::default());

        for n in 0..capacity {
            let receiver = receiver.clone();
            let pending = Arc::clone(&pending);
            // Dropping the handle detaches the worker; it exits once the queue closes.
            thread::Builder::new()
                .name(format!("pool-worker-{}", n))
                .spawn(move || run_worker(receiver, pending))?;
        }

        tracing::debug!(capacity, "worker pool started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            pending,
            capacity,
        })
    }

    /// Number of worker threads.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks submitted but not yet finished, queued ones included.
    pub fn pending(&self) -> usize {
        *self.pending.count.lock()
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Queues a task for execution on the next free worker.
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.lock();
        let sender = sender.as_ref().ok_or(PoolError::ShutDown)?;

        self.pending.begin();
        if sender.send(Box::new(task)).is_err() {
            self.pending.finish();
            return Err(PoolError::ShutDown);
        }
        Ok(())
    }

    /// Stops accepting new tasks. Queued tasks still run.
    pub fn shutdown(&self) {
        if self.sender.lock().take().is_some() {
            tracing::debug!(pending = self.pending(), "worker pool shutting down");
        }
    }

    /// Shuts the pool down and waits up to `deadline` for every submitted
    /// task to finish.
    ///
    /// Returns [`Termination::TimedOut`] if tasks are still running when the
    /// deadline elapses. Those tasks keep running detached. A `deadline` too
    /// large to be represented as an [`Instant`] waits without a bound.
    pub fn shutdown_and_wait(&self, deadline: Duration) -> Termination {
        self.shutdown();

        let until = Instant::now().checked_add(deadline);
        let mut count = self.pending.count.lock();
        while *count > 0 {
            match until {
                Some(until) => {
                    if self.pending.drained.wait_until(&mut count, until).timed_out() {
                        break;
                    }
                }
                None => self.pending.drained.wait(&mut count),
            }
        }

        let termination = match *count {
            0 => Termination::Completed,
            abandoned => Termination::TimedOut { abandoned },
        };
        drop(count);

        match termination {
            Termination::Completed => tracing::debug!("worker pool drained"),
            Termination::TimedOut { abandoned } => {
                tracing::info!(
                    abandoned,
                    ?deadline,
                    "worker pool deadline elapsed, abandoning tasks"
                )
            }
        }
        termination
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.capacity)
            .field("pending", &self.pending())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

fn run_worker(receiver: Receiver<Task>, pending: Arc<Pending>) {
    for task in receiver.iter() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            let current = thread::current();
            tracing::error!(
                worker = current.name().unwrap_or("pool-worker"),
                panic = %panic_message(payload.as_ref()),
                "task panicked"
            );
        }
        pending.finish();
    }
}
