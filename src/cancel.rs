//! Cooperative cancellation for worker tasks.
//!
//! A [`CancellationToken`] is shared by every task of a run. Tasks call
//! [`pause`](CancellationToken::pause) instead of sleeping, so a cancel wakes
//! them immediately and they can wind down on their own.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a [`CancellationToken::pause`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// The full duration elapsed.
    Elapsed,
    /// The token was cancelled before the duration elapsed.
    Interrupted,
}

#[derive(Debug, Default)]
struct State {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// Shared, cloneable cancellation flag with interruptible pauses.
///
/// # Examples
///
/// ```rust
/// use std::thread;
/// use std::time::Duration;
/// use biblioteca::cancel::{CancellationToken, Pause};
///
/// let token = CancellationToken::new();
/// let sleeper = token.clone();
///
/// let handle = thread::spawn(move || sleeper.pause(Duration::from_secs(60)));
/// token.cancel();
///
/// assert_eq!(handle.join().unwrap(), Pause::Interrupted);
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<State>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every task currently paused on it.
    ///
    /// Cancelling twice is harmless.
    pub fn cancel(&self) {
        let mut cancelled = self.state.cancelled.lock();
        *cancelled = true;
        self.state.wakeup.notify_all();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.state.cancelled.lock()
    }

    /// Blocks the calling thread for `duration`, or until the token is
    /// cancelled, whichever comes first.
    ///
    /// Returns [`Pause::Interrupted`] immediately if the token is already
    /// cancelled. A `duration` too large to be represented as an [`Instant`]
    /// waits for the cancel alone.
    pub fn pause(&self, duration: Duration) -> Pause {
        let deadline = Instant::now().checked_add(duration);
        let mut cancelled = self.state.cancelled.lock();
        while !*cancelled {
            match deadline {
                Some(deadline) => {
                    if self.state.wakeup.wait_until(&mut cancelled, deadline).timed_out() {
                        return if *cancelled {
                            Pause::Interrupted
                        } else {
                            Pause::Elapsed
                        };
                    }
                }
                None => self.state.wakeup.wait(&mut cancelled),
            }
        }
        Pause::Interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_pause_elapses() {
        let token = CancellationToken::new();
        let start = Instant::now();
        assert_eq!(token.pause(Duration::from_millis(20)), Pause::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_pause_after_cancel_returns_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        let start = Instant::now();
        assert_eq!(token.pause(Duration::from_secs(30)), Pause::Interrupted);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_unbounded_pause_after_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(token.pause(Duration::MAX), Pause::Interrupted);
    }

    #[test]
    fn test_unbounded_pause_woken_by_cancel() {
        let token = CancellationToken::new();
        let sleeper = token.clone();
        let handle = thread::spawn(move || sleeper.pause(Duration::from_secs(u64::MAX)));

        thread::sleep(Duration::from_millis(20));
        token.cancel();
        assert_eq!(handle.join().unwrap(), Pause::Interrupted);
    }

    #[test]
    fn test_cancel_wakes_every_paused_thread() {
        let token = CancellationToken::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let token = token.clone();
                thread::spawn(move || token.pause(Duration::from_secs(60)))
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        token.cancel();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Pause::Interrupted);
        }
    }
}
