//! Pagination domain types

use std::fmt;

/// Opaque pagination token returned by the remote collection
///
/// A cursor is not `Clone`: it is moved into the request for the
/// next page and cannot be handed out again once that page is fetched.
#[derive(Debug, PartialEq, Eq)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a cursor-paginated collection
#[derive(Debug)]
pub struct Page<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Cursor for the following page, `None` once the collection is exhausted
    pub next: Option<PageCursor>,
}

impl<T> Page<T> {
    /// Creates the final page of a collection
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Creates a page that is followed by another
    pub fn with_next(items: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            items,
            next: Some(PageCursor::new(cursor)),
        }
    }
}
