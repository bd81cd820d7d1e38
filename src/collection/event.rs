//! Change events broadcast by a [`SharedCollection`](super::SharedCollection).

use std::fmt::{self, Display};

/// The kind of mutation that produced a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeKind {
    /// An item was appended.
    Added,
    /// An item was removed (or a removal of a non-member was requested).
    Removed,
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "Added"),
            ChangeKind::Removed => write!(f, "Removed"),
        }
    }
}

/// A mutation of a shared collection, as seen by its observers.
///
/// Events are ephemeral: the collection builds one per mutation, hands it to
/// every observer by reference and drops it.
///
/// # Examples
///
/// ```rust
/// use biblioteca::book::Book;
/// use biblioteca::collection::{ChangeEvent, ChangeKind};
///
/// let event = ChangeEvent::Added(Book::new("Book 3"));
/// assert_eq!(event.kind(), ChangeKind::Added);
/// assert_eq!(event.item().title(), "Book 3");
/// assert_eq!(event.description(), "Added: Book{title='Book 3'}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeEvent<T> {
    /// The item was appended at the end of the collection.
    Added(T),
    /// The first equal occurrence of the item was removed, if any.
    Removed(T),
}

impl<T> ChangeEvent<T> {
    /// Returns the item this event refers to.
    #[inline]
    pub fn item(&self) -> &T {
        match self {
            ChangeEvent::Added(item) | ChangeEvent::Removed(item) => item,
        }
    }

    /// Returns the kind of mutation.
    #[inline]
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::Added(_) => ChangeKind::Added,
            ChangeEvent::Removed(_) => ChangeKind::Removed,
        }
    }

    /// Consumes the event, returning the item.
    pub fn into_item(self) -> T {
        match self {
            ChangeEvent::Added(item) | ChangeEvent::Removed(item) => item,
        }
    }
}

impl<T: Display> ChangeEvent<T> {
    /// Human-readable description, e.g. `Added: Book{title='Book 0'}`.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl<T: Display> Display for ChangeEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.item())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_description() {
        let event = ChangeEvent::Removed("x");
        assert_eq!(event.kind(), ChangeKind::Removed);
        assert_eq!(event.description(), "Removed: x");
    }

    #[test]
    fn test_into_item() {
        assert_eq!(ChangeEvent::Added(7).into_item(), 7);
    }
}
