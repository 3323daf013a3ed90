//! Ordered, owned string sequences.
//!
//! [`StringList`] is the uniform container for argv, search paths and option
//! lists. Order is significant and duplicates are allowed.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An ordered list of owned strings.
///
/// Cloning deep-copies every element, so a list assigned into a
/// configuration is independent of its source.
///
/// # Examples
///
/// ```
/// use ember_init::StringList;
///
/// let mut list = StringList::from_raw(&["b"]);
/// list.append("c");
/// list.insert(0, "a").unwrap();
/// assert_eq!(list.as_slice(), ["a", "b", "c"]);
///
/// assert!(list.insert(10, "z").is_err());
/// assert_eq!(list.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringList {
    items: Vec<String>,
}

impl StringList {
    /// Create an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a list by copying every item of a raw array.
    #[must_use]
    pub fn from_raw<S: AsRef<str>>(items: &[S]) -> Self {
        Self {
            items: items.iter().map(|s| s.as_ref().to_owned()).collect(),
        }
    }

    /// Append an item at the end.
    pub fn append(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Append an item only if an equal item is not already present.
    ///
    /// Returns whether the item was added.
    pub fn append_unique(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if self.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Insert an item before `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index > len`; the list is left
    /// unchanged.
    pub fn insert(&mut self, index: usize, item: impl Into<String>) -> Result<()> {
        if index > self.items.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.insert(index, item.into());
        Ok(())
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an equal item is present.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|s| s == item)
    }

    /// The item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    /// Iterate over the items in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Borrow the items as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Consume the list, returning the items.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl From<Vec<String>> for StringList {
    fn from(items: Vec<String>) -> Self {
        Self { items }
    }
}

impl<S: Into<String>> FromIterator<S> for StringList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StringList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
