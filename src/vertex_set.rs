//! Sets of vertex positions.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use roaring::RoaringBitmap;

/// A set of vertex positions.
///
/// Equality and hashing go by the set's members, so two vertices of the same component hold
/// equal sets and a set can key the per-component aggregates built during a pass.
#[derive(Clone, Default, PartialEq)]
pub struct VertexSet(RoaringBitmap);

impl VertexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a position, returning whether it was absent.
    pub fn insert(&mut self, position: usize) -> bool {
        self.0.insert(position as u32)
    }

    pub fn remove(&mut self, position: usize) -> bool {
        self.0.remove(position as u32)
    }

    pub fn contains(&self, position: usize) -> bool {
        self.0.contains(position as u32)
    }

    pub fn len(&self) -> usize {
        self.0.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of positions present in both sets.
    pub fn intersection_len(&self, other: &VertexSet) -> usize {
        self.0.intersection_len(&other.0) as usize
    }

    /// Iterates the positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().map(|position| position as usize)
    }
}

impl Eq for VertexSet {}

impl Hash for VertexSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for position in &self.0 {
            position.hash(state);
        }
    }
}

impl FromIterator<usize> for VertexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().map(|position| position as u32).collect())
    }
}

impl fmt::Debug for VertexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{hash_map::DefaultHasher, HashSet};

    use super::*;

    #[test]
    fn insert_and_remove() {
        let mut set = VertexSet::new();
        assert!(set.is_empty());

        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.contains(3));
        assert_eq!(set.len(), 1);

        assert!(set.remove(3));
        assert!(!set.contains(3));
    }

    #[test]
    fn intersection_len() {
        let a: VertexSet = [0, 1, 2, 5].into_iter().collect();
        let b: VertexSet = [1, 5, 7].into_iter().collect();

        assert_eq!(a.intersection_len(&b), 2);
        assert_eq!(b.intersection_len(&a), 2);
        assert_eq!(a.intersection_len(&VertexSet::new()), 0);
    }

    #[test]
    fn equal_sets_hash_equally() {
        let a: VertexSet = [4, 1, 9].into_iter().collect();
        let b: VertexSet = [9, 4, 1].into_iter().collect();

        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        a.hash(&mut h1);
        b.hash(&mut h2);

        assert_eq!(a, b);
        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn usable_as_grouping_key() {
        let sets: HashSet<VertexSet> = [
            [0, 1].into_iter().collect(),
            [1, 0].into_iter().collect(),
            [2].into_iter().collect(),
        ]
        .into_iter()
        .collect();

        assert_eq!(sets.len(), 2);
    }
}
