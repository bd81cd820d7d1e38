//! # Biblioteca - A Thread-Safe Observable Collection
//!
//! A small Rust library showing how to share a mutable, ordered collection
//! between many threads while broadcasting every change to interested
//! observers, without torn reads, lost updates or missed notifications.
//!
//! ## The Problem
//!
//! A collection mutated by several writers and iterated by many readers needs
//! two things at once: readers must never see a half-applied mutation, and
//! observers must see each mutation exactly once, in the order it happened.
//! Notifying from outside the lock makes the second guarantee racy;
//! iterating a live view from outside the lock breaks the first.
//!
//! ## The Solution: One Lock, Copy-Out Reads
//!
//! [`SharedCollection`](collection::SharedCollection) puts its items and its
//! observer set behind a single mutex:
//!
//! 1. **Serialized mutations**: `add` and `remove` run inside the critical
//!    section, so mutations are totally ordered.
//! 2. **Notify while locked**: the broadcast happens before the lock is
//!    released, so observers see events in exactly the mutation order.
//! 3. **Copy-out snapshots**: `snapshot` clones the sequence under the lock
//!    and hands back a detached `Vec`, safe to iterate at leisure.
//!
//! The price is throughput: everything funnels through one lock, and a slow
//! observer stalls every reader and writer. At demo scale this is the right
//! trade-off.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`collection`] | `SharedCollection` and `ChangeEvent` |
//! | [`observers`] | `Observer` capability and `ObserverRegistry` |
//! | [`pool`] | Fixed-size `WorkerPool` with deadline-based shutdown |
//! | [`cancel`] | `CancellationToken` with interruptible pauses |
//! | [`workers`] | `Reader` and `Writer` task bodies |
//! | [`orchestrator`] | `Library`: the 100 readers / 10 writers scenario |
//! | [`book`] | The `Book` item |
//! | `snapshot` | Serializable snapshots (feature `serde`) |
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use biblioteca::book::Book;
//! use biblioteca::collection::{ChangeEvent, SharedCollection};
//! use biblioteca::observers::Result;
//!
//! let library: SharedCollection<Book> = SharedCollection::new();
//!
//! library.subscribe(Arc::new(|event: &ChangeEvent<Book>| -> Result<()> {
//!     println!("{}", event.description());
//!     Ok(())
//! }));
//!
//! library.add(Book::new("Book 0"));
//! let books = library.snapshot();
//! assert_eq!(books.len(), 1);
//! ```
//!
//! ## Running the Scenario
//!
//! ```rust,no_run
//! use biblioteca::orchestrator::{Library, LibraryConfig};
//!
//! // 100 readers, 10 writers, waits up to one hour.
//! let report = Library::run(LibraryConfig::default()).unwrap();
//! println!("{} ({} books)", report.termination, report.items.len());
//! ```
//!
//! ## Logging
//!
//! Every reader poll, writer addition and observer notification is emitted
//! through [`tracing`] at `INFO`. Install a subscriber (the `library` demo
//! uses `tracing-subscriber`) to see them.

pub mod book;
pub mod cancel;
pub mod collection;
pub mod observers;
pub mod orchestrator;
pub mod pool;
pub mod workers;

#[cfg(feature = "serde")]
pub mod snapshot;
