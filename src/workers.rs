//! Reader and writer task bodies.
//!
//! Both kinds of worker share one [`SharedCollection`] and one
//! [`CancellationToken`]:
//!
//! - A [`Reader`] polls the collection forever, logging a snapshot and
//!   pausing between polls. It also subscribes a [`ReaderInbox`] so it is
//!   pushed every change as it happens. Polling keeps a heartbeat even when
//!   nothing changes; the inbox gives immediate visibility when something
//!   does.
//! - A [`Writer`] adds its single pre-built item, logs it, pauses once to
//!   settle and returns.
//!
//! Pauses go through [`CancellationToken::pause`]: an interrupted pause is
//! logged and ends the task early, without affecting any other task.

use crate::cancel::{CancellationToken, Pause};
use crate::collection::{ChangeEvent, SharedCollection};
use crate::observers::{self, Observer, SubscriptionId};
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Renders items the way a list prints: `[a, b, c]`.
struct Listing<'a, T>(&'a [T]);

impl<T: Display> Display for Listing<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }
}

/// Observer owned by a [`Reader`]: logs and counts every pushed event.
///
/// Runs on the mutating thread, so the log line carries that thread's name
/// alongside the reader's.
#[derive(Debug)]
pub struct ReaderInbox {
    reader: String,
    received: AtomicUsize,
}

impl ReaderInbox {
    /// Creates an inbox for the reader named `reader`.
    pub fn new(reader: impl Into<String>) -> Self {
        Self {
            reader: reader.into(),
            received: AtomicUsize::new(0),
        }
    }

    /// Number of events received so far.
    pub fn received(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }
}

impl<T: Display> Observer<T> for ReaderInbox {
    fn receive(&self, event: &ChangeEvent<T>) -> observers::Result<()> {
        self.received.fetch_add(1, Ordering::Relaxed);
        let current = thread::current();
        tracing::info!(
            thread = current.name().unwrap_or("unnamed"),
            "{} notified: {}",
            self.reader,
            event
        );
        Ok(())
    }
}

/// An always-on tailing reader.
///
/// Dropping the reader removes its inbox subscription.
pub struct Reader<T> {
    name: String,
    collection: Arc<SharedCollection<T>>,
    interval: Duration,
    token: CancellationToken,
    inbox: Arc<ReaderInbox>,
    subscription: SubscriptionId,
}

impl<T> Reader<T>
where
    T: Clone + Display + 'static,
{
    /// Creates a reader and subscribes its inbox to `collection`.
    pub fn new(
        name: impl Into<String>,
        collection: Arc<SharedCollection<T>>,
        interval: Duration,
        token: CancellationToken,
    ) -> Self {
        let name = name.into();
        let inbox = Arc::new(ReaderInbox::new(name.clone()));
        let subscription = collection.subscribe(inbox.clone());

        Self {
            name,
            collection,
            interval,
            token,
            inbox,
            subscription,
        }
    }

    /// Takes and logs one snapshot.
    pub fn poll_once(&self) -> Vec<T> {
        let snapshot = self.collection.snapshot();
        tracing::info!("{} is reading: {}", self.name, Listing(&snapshot));
        snapshot
    }

    /// Polls until the token is cancelled. Returns the number of polls.
    ///
    /// Without cancellation this never returns.
    pub fn run(&self) -> usize {
        let mut polls = 0;
        while !self.token.is_cancelled() {
            self.poll_once();
            polls += 1;

            if self.token.pause(self.interval) == Pause::Interrupted {
                tracing::info!(polls, "{} interrupted, stopping", self.name);
                break;
            }
        }
        polls
    }
}

impl<T> Reader<T> {
    /// The reader's identity, used in every log line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The inbox subscription held by this reader.
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Number of change events pushed to this reader so far.
    pub fn notifications(&self) -> usize {
        self.inbox.received()
    }
}

impl<T> Drop for Reader<T> {
    fn drop(&mut self) {
        self.collection.unsubscribe(self.subscription);
    }
}

/// A one-shot writer holding the item it will add.
pub struct Writer<T> {
    name: String,
    collection: Arc<SharedCollection<T>>,
    item: T,
    settle: Duration,
    token: CancellationToken,
}

impl<T> Writer<T>
where
    T: Clone + Display,
{
    /// Creates a writer that will add `item` and then pause for `settle`.
    pub fn new(
        name: impl Into<String>,
        collection: Arc<SharedCollection<T>>,
        item: T,
        settle: Duration,
        token: CancellationToken,
    ) -> Self {
        Self {
            name: name.into(),
            collection,
            item,
            settle,
            token,
        }
    }

    /// The writer's identity, used in every log line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds the item, logs it and settles. Consumes the writer.
    ///
    /// Returns how the settle pause ended.
    pub fn run(self) -> Pause {
        self.collection.add(self.item.clone());
        tracing::info!("{} added: {}", self.name, self.item);

        let pause = self.token.pause(self.settle);
        if pause == Pause::Interrupted {
            tracing::info!("{} interrupted while settling", self.name);
        }
        pause
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use std::time::Instant;

    #[test]
    fn test_listing() {
        let books = [Book::new("a"), Book::new("b")];
        assert_eq!(
            Listing(&books).to_string(),
            "[Book{title='a'}, Book{title='b'}]"
        );
        assert_eq!(Listing::<Book>(&[]).to_string(), "[]");
    }

    #[test]
    fn test_reader_subscribes_and_unsubscribes_on_drop() {
        let collection = Arc::new(SharedCollection::<Book>::new());
        let reader = Reader::new(
            "reader-0",
            Arc::clone(&collection),
            Duration::from_millis(10),
            CancellationToken::new(),
        );
        assert_eq!(reader.name(), "reader-0");
        assert_eq!(collection.observer_count(), 1);

        collection.add(Book::new("Book 0"));
        collection.remove(Book::new("missing"));
        assert_eq!(reader.notifications(), 2);

        drop(reader);
        assert_eq!(collection.observer_count(), 0);
    }

    #[test]
    fn test_reader_poll_once_returns_snapshot() {
        let collection = Arc::new(SharedCollection::new());
        collection.add(Book::new("Book 0"));
        let reader = Reader::new(
            "reader-0",
            Arc::clone(&collection),
            Duration::from_millis(10),
            CancellationToken::new(),
        );
        assert_eq!(reader.poll_once(), vec![Book::new("Book 0")]);
    }

    #[test]
    fn test_reader_runs_until_cancelled() {
        let collection = Arc::new(SharedCollection::<Book>::new());
        let token = CancellationToken::new();
        let reader = Reader::new(
            "reader-0",
            Arc::clone(&collection),
            Duration::from_millis(5),
            token.clone(),
        );

        let handle = thread::spawn(move || reader.run());
        thread::sleep(Duration::from_millis(50));
        token.cancel();

        let polls = handle.join().unwrap();
        assert!(polls >= 1);
        assert_eq!(collection.observer_count(), 0);
    }

    #[test]
    fn test_reader_cancelled_before_start_never_polls() {
        let collection = Arc::new(SharedCollection::<Book>::new());
        let token = CancellationToken::new();
        token.cancel();
        let reader = Reader::new("reader-0", collection, Duration::from_secs(60), token);
        assert_eq!(reader.run(), 0);
    }

    #[test]
    fn test_writer_adds_and_settles() {
        let collection = Arc::new(SharedCollection::new());
        let writer = Writer::new(
            "writer-0",
            Arc::clone(&collection),
            Book::new("Book 0"),
            Duration::from_millis(10),
            CancellationToken::new(),
        );
        assert_eq!(writer.name(), "writer-0");

        let start = Instant::now();
        assert_eq!(writer.run(), Pause::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert_eq!(collection.snapshot(), vec![Book::new("Book 0")]);
    }

    #[test]
    fn test_interrupted_writer_still_adds() {
        let collection = Arc::new(SharedCollection::new());
        let token = CancellationToken::new();
        token.cancel();
        let writer = Writer::new(
            "writer-0",
            Arc::clone(&collection),
            Book::new("Book 0"),
            Duration::from_secs(60),
            token,
        );

        assert_eq!(writer.run(), Pause::Interrupted);
        assert!(collection.contains(&Book::new("Book 0")));
    }

    #[test]
    fn test_writer_pushes_to_reader_inbox() {
        let collection = Arc::new(SharedCollection::new());
        let token = CancellationToken::new();
        let reader = Reader::new(
            "reader-0",
            Arc::clone(&collection),
            Duration::from_millis(10),
            token.clone(),
        );
        Writer::new(
            "writer-0",
            Arc::clone(&collection),
            Book::new("X"),
            Duration::ZERO,
            token,
        )
        .run();
        assert_eq!(reader.notifications(), 1);
    }
}
