//! Observer registry for collection change notifications.
//!
//! An [`Observer`] is a capability that receives [`ChangeEvent`]s. Observers
//! are registered against an [`ObserverRegistry`], which the owning
//! [`SharedCollection`](crate::collection::SharedCollection) drives on every
//! mutation.
//!
//! # Delivery Semantics
//!
//! - Observers are invoked synchronously on the mutating thread, in
//!   registration order. There is no notification thread.
//! - A slow observer delays the mutation that triggered it.
//! - An observer that returns an error or panics is logged and skipped; the
//!   remaining observers are still notified.
//! - Registering the same observer twice yields two subscriptions and two
//!   notifications per event.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use biblioteca::collection::ChangeEvent;
//! use biblioteca::observers::{ObserverRegistry, Result};
//!
//! let mut registry = ObserverRegistry::<u32>::new();
//! let id = registry.subscribe(Arc::new(|event: &ChangeEvent<u32>| -> Result<()> {
//!     println!("got {}", event);
//!     Ok(())
//! }));
//!
//! let report = registry.broadcast(&ChangeEvent::Added(1));
//! assert_eq!(report.delivered, 1);
//! assert!(registry.unsubscribe(id));
//! ```

mod error;

pub use error::{ObserverError, Result};
pub(crate) use error::panic_message;

use crate::collection::ChangeEvent;
use std::fmt::{self, Debug, Display};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Receives change events from a shared collection.
///
/// Implementations run while the collection's lock is held, so they must not
/// call back into the same collection.
///
/// Closures of the form `Fn(&ChangeEvent<T>) -> Result<()>` implement this
/// trait directly.
pub trait Observer<T>: Send + Sync {
    /// Handles one change event.
    fn receive(&self, event: &ChangeEvent<T>) -> Result<()>;
}

impl<T, F> Observer<T> for F
where
    F: Fn(&ChangeEvent<T>) -> Result<()> + Send + Sync,
{
    fn receive(&self, event: &ChangeEvent<T>) -> Result<()> {
        self(event)
    }
}

/// Handle returned by [`ObserverRegistry::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of a single broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Observers that handled the event successfully.
    pub delivered: usize,
    /// Observers that returned an error or panicked.
    pub failed: usize,
}

/// Ordered set of observers registered against one collection.
///
/// The registry itself is not synchronized: the owning collection keeps it
/// behind the same lock as its items.
pub struct ObserverRegistry<T> {
    observers: Vec<(SubscriptionId, Arc<dyn Observer<T>>)>,
    next_id: u64,
}

impl<T> ObserverRegistry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers an observer at the end of the notification order.
    ///
    /// Registering an observer that is already present is allowed and
    /// produces duplicate notifications.
    pub fn subscribe(&mut self, observer: Arc<dyn Observer<T>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes a subscription. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.observers.iter().position(|(sid, _)| *sid == id) {
            Some(pos) => {
                self.observers.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of active subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if nobody is subscribed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Delivers `event` to every observer in registration order.
    ///
    /// Failures are logged and counted; they never stop the broadcast.
    pub fn broadcast(&self, event: &ChangeEvent<T>) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for (id, observer) in &self.observers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| observer.receive(event)))
                .unwrap_or_else(|payload| Err(ObserverError::from_panic(payload.as_ref())));

            match outcome {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        subscription = %id,
                        kind = %event.kind(),
                        error = %err,
                        "observer failed, continuing broadcast"
                    );
                }
            }
        }

        report
    }
}

impl<T> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for ObserverRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|(id, _)| id))
            .finish()
    }
}
