use std::{collections::BTreeSet, hash::Hash};

/// Hash set used for bookkeeping of visited states and outputs.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Hash map used for numbering classes and nodes.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Two-way lookup between state or input indices and their labels.
pub type Bijection<L, R> = bimap::BiHashMap<L, R>;

/// The equivalence classes of states found by the minimization. Each class is a sorted set
/// of state indices and the classes are listed in the order of their smallest member, so
/// the class containing the initial state comes first.
#[derive(Debug, Clone)]
pub struct Partition<I: Hash + Eq>(Vec<BTreeSet<I>>);

impl<I: Hash + Eq> std::ops::Deref for Partition<I> {
    type Target = Vec<BTreeSet<I>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, I: Hash + Eq> IntoIterator for &'a Partition<I> {
    type Item = &'a BTreeSet<I>;
    type IntoIter = std::slice::Iter<'a, BTreeSet<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I: Hash + Eq> PartialEq for Partition<I> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|o| other.contains(o))
    }
}
impl<I: Hash + Eq> Eq for Partition<I> {}

impl<I: Hash + Eq + Ord + Copy> Partition<I> {
    /// The number of classes.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Collects `classes` into a partition, keeping the order of the classes. Members
    /// are sorted within each class.
    pub fn new<X: IntoIterator<Item = I>, Y: IntoIterator<Item = X>>(classes: Y) -> Self {
        Self(
            classes
                .into_iter()
                .map(|class| class.into_iter().collect::<BTreeSet<_>>())
                .collect(),
        )
    }

    /// Returns the position of the class that contains `element`, if any.
    pub fn class_of(&self, element: I) -> Option<usize> {
        self.0.iter().position(|class| class.contains(&element))
    }

    /// Returns true if `left` and `right` lie in the same class.
    pub fn related(&self, left: I, right: I) -> bool {
        match (self.class_of(left), self.class_of(right)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        }
    }
}

impl<I: Hash + Eq + Ord> From<Vec<BTreeSet<I>>> for Partition<I> {
    fn from(value: Vec<BTreeSet<I>>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Partition;

    #[test]
    fn partition_equality_ignores_class_order() {
        let left = Partition::new([vec![0, 2], vec![1]]);
        let right = Partition::new([vec![1], vec![2, 0]]);
        assert_eq!(left, right);
        assert!(left.related(0, 2));
        assert!(!left.related(0, 1));
        assert_eq!(left.class_of(1), Some(1));
        assert_eq!(left.size(), 2);
    }
}
