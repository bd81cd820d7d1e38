//! Error type returned by observers.
//!
//! An observer that cannot process an event returns an [`ObserverError`].
//! The registry logs it and moves on to the next observer, so a failing
//! observer never changes the outcome of the mutation that triggered it.
//!
//! # Example
//!
//! ```rust
//! use biblioteca::observers::{ObserverError, Result};
//!
//! fn reject_everything() -> Result<()> {
//!     Err(ObserverError::Rejected("inbox closed".into()))
//! }
//!
//! assert!(reject_everything().is_err());
//! ```

use thiserror::Error;

/// Error produced while delivering an event to one observer.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// The observer refused or failed to handle the event.
    #[error("observer rejected event: {0}")]
    Rejected(String),

    /// The observer panicked while handling the event.
    #[error("observer panicked: {0}")]
    Panicked(String),
}

impl ObserverError {
    /// Builds a [`ObserverError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        ObserverError::Panicked(panic_message(payload))
    }
}

/// Extracts the message of a panic payload, if it carries one.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Result type for observer callbacks.
pub type Result<T> = std::result::Result<T, ObserverError>;
