//! Serializable snapshots of a shared collection.
//!
//! This module provides [`CollectionSnapshot`], a serde-friendly capture of
//! a [`SharedCollection`] at one instant, suitable for exporting to JSON or
//! any other serde format.
//!
//! # Feature Flag
//!
//! This module requires the `serde` feature; the JSON helpers additionally
//! need `json`:
//!
//! ```toml
//! [dependencies]
//! biblioteca = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use biblioteca::book::Book;
//! use biblioteca::collection::SharedCollection;
//! use biblioteca::snapshot::CollectionSnapshot;
//!
//! let library = SharedCollection::new();
//! library.add(Book::new("Book 0"));
//!
//! let snapshot = CollectionSnapshot::capture(&library);
//! println!("{}", snapshot.to_json().unwrap());
//! // {"len":1,"items":[{"title":"Book 0"}]}
//! ```

use crate::collection::SharedCollection;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A point-in-time copy of a collection's contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionSnapshot<T> {
    /// Optional capture time in milliseconds since Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp_ms: Option<u64>,
    /// Number of items.
    pub len: usize,
    /// The items, in insertion order.
    pub items: Vec<T>,
}

impl<T> CollectionSnapshot<T> {
    /// Wraps already captured items.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            timestamp_ms: None,
            len: items.len(),
            items,
        }
    }

    /// Wraps already captured items with a timestamp.
    pub fn with_timestamp(items: Vec<T>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            ..Self::new(items)
        }
    }
}

impl<T: Clone> CollectionSnapshot<T> {
    /// Captures the current contents of `collection`.
    pub fn capture(collection: &SharedCollection<T>) -> Self {
        Self::new(collection.snapshot())
    }

    /// Captures the current contents of `collection`, stamped with the wall
    /// clock.
    pub fn capture_now(collection: &SharedCollection<T>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self::with_timestamp(collection.snapshot(), timestamp_ms)
    }
}

#[cfg(feature = "json")]
impl<T: Serialize> CollectionSnapshot<T> {
    /// Serializes the snapshot as compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serializes the snapshot as indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use crate::collection::ChangeEvent;

    #[test]
    fn test_capture() {
        let collection = SharedCollection::new();
        collection.add(Book::new("a"));
        collection.add(Book::new("b"));

        let snapshot = CollectionSnapshot::capture(&collection);
        assert_eq!(snapshot.len, 2);
        assert_eq!(snapshot.items, vec![Book::new("a"), Book::new("b")]);
        assert!(snapshot.timestamp_ms.is_none());
    }

    #[test]
    fn test_capture_now_has_timestamp() {
        let collection = SharedCollection::<Book>::new();
        let snapshot = CollectionSnapshot::capture_now(&collection);
        assert!(snapshot.timestamp_ms.unwrap() > 0);
        assert_eq!(snapshot.len, 0);
    }

    #[test]
    fn test_serialize_snapshot() {
        let snapshot = CollectionSnapshot::new(vec![Book::new("Book 0")]);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"len":1,"items":[{"title":"Book 0"}]}"#);
    }

    #[test]
    fn test_deserialize_snapshot_with_timestamp() {
        let json = r#"{"timestamp_ms":1234567890,"len":1,"items":[{"title":"Book 9"}]}"#;
        let snapshot: CollectionSnapshot<Book> = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.timestamp_ms, Some(1234567890));
        assert_eq!(snapshot.items, vec![Book::new("Book 9")]);
    }

    #[test]
    fn test_serialize_event() {
        let event = ChangeEvent::Added(Book::new("x"));
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"Added":{"title":"x"}}"#);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_to_json_pretty() {
        let snapshot = CollectionSnapshot::with_timestamp(vec![Book::new("a")], 7);
        let pretty = snapshot.to_json_pretty().unwrap();
        assert!(pretty.contains("\n"));
        assert!(pretty.contains("\"timestamp_ms\": 7"));
        assert_eq!(
            snapshot.to_json().unwrap(),
            r#"{"timestamp_ms":7,"len":1,"items":[{"title":"a"}]}"#
        );
    }
}
