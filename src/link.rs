//! A module for working with link keys.

/// The unordered pair of vertices a link joins.
///
/// The pair is stored with the fixed ordering every direction comparison relies on: the lower
/// id is `low`, the higher one is `high`. Links are undirected keys, despite their
/// transactions carrying a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey<T> {
    low: T,
    high: T,
}

impl<T: Ord> LinkKey<T> {
    /// Creates a new key from two vertices in either order.
    ///
    /// # Examples
    ///
    /// ```
    /// use plexus::link::LinkKey;
    ///
    /// let key = LinkKey::new(7, 3);
    /// assert_eq!(key, LinkKey::new(3, 7));
    /// assert_eq!(key.low(), &3);
    /// ```
    pub fn new(a: T, b: T) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

impl<T> LinkKey<T> {
    /// Returns the vertex with the lower id.
    pub fn low(&self) -> &T {
        &self.low
    }

    /// Returns the vertex with the higher id.
    pub fn high(&self) -> &T {
        &self.high
    }

    /// A link whose endpoints coincide.
    pub fn is_loop(&self) -> bool
    where
        T: PartialEq,
    {
        self.low == self.high
    }
}
