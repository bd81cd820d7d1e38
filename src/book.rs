//! The item stored by the demo library.

use std::fmt::{self, Display};

/// An immutable item with a display label.
///
/// Books have no identity beyond their title: two books with the same title
/// are equal, which is what [`SharedCollection::remove`] matches on.
///
/// [`SharedCollection::remove`]: crate::collection::SharedCollection::remove
///
/// # Examples
///
/// ```rust
/// use biblioteca::book::Book;
///
/// let book = Book::new("Book 0");
/// assert_eq!(book.title(), "Book 0");
/// assert_eq!(book.to_string(), "Book{title='Book 0'}");
/// assert_eq!(book, Book::new("Book 0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Book {
    title: String,
}

impl Book {
    /// Creates a new book with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Returns the title of this book.
    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Book{{title='{}'}}", self.title)
    }
}
