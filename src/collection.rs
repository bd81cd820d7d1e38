//! Thread-safe ordered collection with synchronous change notification.
//!
//! [`SharedCollection`] keeps its items and its [`ObserverRegistry`] behind a
//! single [`parking_lot::Mutex`]. Every operation that touches the sequence,
//! including [`snapshot`](SharedCollection::snapshot), runs inside that one
//! critical section:
//!
//! ```text
//!   Writer A ──add──┐
//!   Writer B ──add──┤      ┌──────────── Mutex ─────────────┐
//!   Reader 1 ─snap──┼────► │ items: [Book 0, Book 1, ...]   │
//!   Reader 2 ─snap──┘      │ observers: [inbox 1, inbox 2]  │
//!                          └────────────────────────────────┘
//!                                         │
//!                                         ▼
//!                        broadcast(Added/Removed) while locked
//! ```
//!
//! # Guarantees
//!
//! - Mutations are totally ordered; no two mutations interleave.
//! - A snapshot is a copy of the sequence at one instant between two
//!   mutations, never a partially applied one.
//! - Each mutation is broadcast exactly once to every observer registered at
//!   that moment, in registration order, before the mutating call returns.
//!
//! # Caveats
//!
//! Observers run while the lock is held. A slow observer stalls every other
//! reader and writer, and an observer that calls back into the same
//! collection deadlocks, since the lock is not reentrant.

mod event;

pub use event::{ChangeEvent, ChangeKind};

use crate::observers::{BroadcastReport, Observer, ObserverRegistry, SubscriptionId};
use parking_lot::Mutex;
use std::fmt::{self, Debug};
use std::sync::Arc;

struct Inner<T> {
    items: Vec<T>,
    observers: ObserverRegistry<T>,
}

impl<T> Inner<T> {
    fn notify(&self, event: ChangeEvent<T>) -> BroadcastReport {
        let report = self.observers.broadcast(&event);
        tracing::trace!(
            kind = %event.kind(),
            len = self.items.len(),
            delivered = report.delivered,
            failed = report.failed,
            "mutation broadcast"
        );
        report
    }
}

/// An ordered, observable container safe to share across threads.
///
/// Share it between workers with an [`Arc`]. Items are appended in insertion
/// order and removed by structural equality.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use biblioteca::book::Book;
/// use biblioteca::collection::{ChangeEvent, SharedCollection};
/// use biblioteca::observers::Result;
///
/// let library: SharedCollection<Book> = SharedCollection::new();
/// library.subscribe(Arc::new(|event: &ChangeEvent<Book>| -> Result<()> {
///     println!("notified: {}", event);
///     Ok(())
/// }));
///
/// library.add(Book::new("Book 0"));
/// library.add(Book::new("Book 1"));
/// assert!(library.remove(Book::new("Book 0")));
///
/// assert_eq!(library.snapshot(), vec![Book::new("Book 1")]);
/// ```
///
/// Multi-threaded usage:
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use biblioteca::collection::SharedCollection;
///
/// let shared = Arc::new(SharedCollection::new());
/// let mut handles = vec![];
///
/// for i in 0..4 {
///     let c = Arc::clone(&shared);
///     handles.push(thread::spawn(move || {
///         for j in 0..100 {
///             c.add(i * 100 + j);
///         }
///     }));
/// }
///
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(shared.len(), 400);
/// ```
pub struct SharedCollection<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> SharedCollection<T> {
    /// Creates an empty collection with no observers.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                observers: ObserverRegistry::new(),
            }),
        }
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Returns `true` if the collection holds no items.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Registers an observer for every subsequent mutation.
    ///
    /// Subscribing the same observer twice is allowed and doubles its
    /// notifications.
    pub fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> SubscriptionId {
        self.inner.lock().observers.subscribe(observer)
    }

    /// Drops a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.lock().observers.unsubscribe(id)
    }

    /// Number of active subscriptions.
    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }
}

impl<T: Clone> SharedCollection<T> {
    /// Appends `item` and notifies observers with [`ChangeEvent::Added`].
    ///
    /// The lock is held across both the insertion and the broadcast, so
    /// every observer has seen the event by the time this returns.
    pub fn add(&self, item: T) -> BroadcastReport {
        let mut inner = self.inner.lock();
        inner.items.push(item.clone());
        inner.notify(ChangeEvent::Added(item))
    }

    /// Returns a copy of the current contents, in insertion order.
    ///
    /// The returned vector is detached: later mutations do not affect it.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.lock().items.clone()
    }
}

impl<T: PartialEq> SharedCollection<T> {
    /// Removes the first item equal to `item` and notifies observers with
    /// [`ChangeEvent::Removed`].
    ///
    /// Removing an item that is not present leaves the contents unchanged
    /// but is still broadcast. Returns whether an item was removed.
    pub fn remove(&self, item: T) -> bool {
        let mut inner = self.inner.lock();
        let removed = match inner.items.iter().position(|it| *it == item) {
            Some(pos) => {
                inner.items.remove(pos);
                true
            }
            None => false,
        };
        inner.notify(ChangeEvent::Removed(item));
        removed
    }

    /// Returns `true` if an item equal to `item` is present.
    pub fn contains(&self, item: &T) -> bool {
        self.inner.lock().items.contains(item)
    }
}

impl<T> Default for SharedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for SharedCollection<T> {
    /// Formats the items and the subscription ids under the lock.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SharedCollection")
            .field("items", &inner.items)
            .field("observers", &inner.observers)
            .finish()
    }
}
