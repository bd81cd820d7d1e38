//! Wires one collection, a worker pool and the reader/writer tasks together.
//!
//! [`Library::run`] reproduces the demo scenario: readers are submitted
//! first, then one writer per book (`Book 0`, `Book 1`, ...), the pool is shut
//! down and the caller waits up to [`LibraryConfig::deadline`]. Readers never
//! finish on their own, so a run with at least one reader always ends with
//! [`Termination::TimedOut`]. That is the expected outcome, not a failure.
//! Once the deadline has passed the shared token is cancelled so abandoned
//! readers wind down on their own time.

use crate::book::Book;
use crate::cancel::CancellationToken;
use crate::collection::SharedCollection;
use crate::pool::{PoolError, Termination, WorkerPool};
use crate::workers::{Reader, Writer};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Error type for a library run. Only startup faults are errors.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The configuration cannot describe a run.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The worker pool could not be built or fed.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Sizes and timings of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Number of reader tasks.
    pub readers: usize,
    /// Number of writer tasks, one book each.
    pub writers: usize,
    /// Pause between two polls of a reader.
    pub read_interval: Duration,
    /// Pause of a writer after its addition.
    pub write_pause: Duration,
    /// How long to wait for the pool to drain.
    pub deadline: Duration,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            readers: 100,
            writers: 10,
            read_interval: Duration::from_millis(100),
            write_pause: Duration::from_millis(500),
            deadline: Duration::from_secs(60 * 60),
        }
    }
}

impl LibraryConfig {
    /// One worker per task, so no task waits behind a never-ending reader.
    pub fn pool_capacity(&self) -> usize {
        self.readers + self.writers
    }

    /// Rejects configurations with nothing to run.
    pub fn validate(&self) -> Result<(), LibraryError> {
        if self.pool_capacity() == 0 {
            return Err(LibraryError::Config(
                "at least one reader or writer is required".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of [`Library::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// How the pool wait ended.
    pub termination: Termination,
    /// Contents of the collection when the wait returned.
    pub items: Vec<Book>,
}

/// The demo scenario: many readers and writers over one shared collection.
#[derive(Debug)]
pub struct Library {
    config: LibraryConfig,
    collection: Arc<SharedCollection<Book>>,
    token: CancellationToken,
}

impl Library {
    /// Validates `config` and creates an empty collection.
    pub fn new(config: LibraryConfig) -> Result<Self, LibraryError> {
        config.validate()?;
        Ok(Self {
            config,
            collection: Arc::new(SharedCollection::new()),
            token: CancellationToken::new(),
        })
    }

    /// Builds and runs the default scenario.
    pub fn run(config: LibraryConfig) -> Result<RunReport, LibraryError> {
        Self::new(config)?.start()
    }

    /// The collection shared by every task.
    pub fn collection(&self) -> &Arc<SharedCollection<Book>> {
        &self.collection
    }

    /// Token shared by every task of this run.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Submits every task, then waits for the pool to drain or the deadline.
    ///
    /// A run is single-use: its token stays cancelled once the deadline has
    /// passed, so `start` consumes the library. Keep a clone of
    /// [`collection`](Self::collection) or [`token`](Self::token) beforehand
    /// to inspect them afterwards.
    pub fn start(self) -> Result<RunReport, LibraryError> {
        let config = &self.config;
        let pool = WorkerPool::new(config.pool_capacity())?;

        tracing::info!(
            readers = config.readers,
            writers = config.writers,
            capacity = pool.capacity(),
            "starting library run"
        );

        for i in 0..config.readers {
            let reader = Reader::new(
                format!("reader-{}", i),
                Arc::clone(&self.collection),
                config.read_interval,
                self.token.clone(),
            );
            pool.submit(move || {
                reader.run();
            })?;
        }

        for i in 0..config.writers {
            let writer = Writer::new(
                format!("writer-{}", i),
                Arc::clone(&self.collection),
                Book::new(format!("Book {}", i)),
                config.write_pause,
                self.token.clone(),
            );
            pool.submit(move || {
                writer.run();
            })?;
        }

        let termination = pool.shutdown_and_wait(config.deadline);
        let items = self.collection.snapshot();

        if !termination.is_completed() {
            self.token.cancel();
        }

        tracing::info!(%termination, items = items.len(), "library run finished");
        Ok(RunReport { termination, items })
    }
}
