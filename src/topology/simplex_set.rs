//! `SimplexSet`: a sorted collection of vertices, edges and triangles with
//! set algebra.
//!
//! Each dimension lives in its own `BTreeSet`, so iteration follows the
//! canonical simplex order and results are reproducible run to run.
//! `union`, `intersection` and `difference` work dimension by dimension as
//! ordered merges of the sorted inputs.

use std::collections::BTreeSet;
use std::collections::btree_set;

use itertools::{EitherOrBoth, Itertools};

use crate::topology::simplex::{Simplex0, Simplex1, Simplex2};

/// Sorted multi-dimension simplex collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimplexSet {
    s0: BTreeSet<Simplex0>,
    s1: BTreeSet<Simplex1>,
    s2: BTreeSet<Simplex2>,
}

/// Anything that can be added to or removed from a [`SimplexSet`].
pub trait SetMember: Copy {
    fn insert_into(self, set: &mut SimplexSet) -> bool;
    fn remove_from(self, set: &mut SimplexSet) -> bool;
    fn is_member_of(&self, set: &SimplexSet) -> bool;
}

impl SetMember for Simplex0 {
    fn insert_into(self, set: &mut SimplexSet) -> bool {
        set.s0.insert(self)
    }
    fn remove_from(self, set: &mut SimplexSet) -> bool {
        set.s0.remove(&self)
    }
    fn is_member_of(&self, set: &SimplexSet) -> bool {
        set.s0.contains(self)
    }
}

impl SetMember for Simplex1 {
    fn insert_into(self, set: &mut SimplexSet) -> bool {
        set.s1.insert(self)
    }
    fn remove_from(self, set: &mut SimplexSet) -> bool {
        set.s1.remove(&self)
    }
    fn is_member_of(&self, set: &SimplexSet) -> bool {
        set.s1.contains(self)
    }
}

impl SetMember for Simplex2 {
    fn insert_into(self, set: &mut SimplexSet) -> bool {
        set.s2.insert(self)
    }
    fn remove_from(self, set: &mut SimplexSet) -> bool {
        set.s2.remove(&self)
    }
    fn is_member_of(&self, set: &SimplexSet) -> bool {
        set.s2.contains(self)
    }
}

impl SimplexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a simplex; returns `false` if an equal one was already present.
    ///
    /// An equal simplex keeps the orientation it was first inserted with.
    pub fn insert<S: SetMember>(&mut self, s: S) -> bool {
        s.insert_into(self)
    }

    pub fn remove<S: SetMember>(&mut self, s: S) -> bool {
        s.remove_from(self)
    }

    pub fn contains<S: SetMember>(&self, s: &S) -> bool {
        s.is_member_of(self)
    }

    /// Inserts every simplex of `other`.
    pub fn insert_all(&mut self, other: &SimplexSet) {
        self.s0.extend(other.s0.iter().copied());
        self.s1.extend(other.s1.iter().copied());
        self.s2.extend(other.s2.iter().copied());
    }

    /// Removes every simplex of `other`.
    pub fn remove_all(&mut self, other: &SimplexSet) {
        for s in &other.s0 {
            self.s0.remove(s);
        }
        for s in &other.s1 {
            self.s1.remove(s);
        }
        for s in &other.s2 {
            self.s2.remove(s);
        }
    }

    pub fn clear(&mut self) {
        self.s0.clear();
        self.s1.clear();
        self.s2.clear();
    }

    /// Number of simplices of dimension `dim` (0 for any other dimension).
    pub fn size(&self, dim: u8) -> usize {
        match dim {
            0 => self.s0.len(),
            1 => self.s1.len(),
            2 => self.s2.len(),
            _ => 0,
        }
    }

    /// Total number of simplices across all dimensions.
    pub fn len(&self) -> usize {
        self.s0.len() + self.s1.len() + self.s2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s0.is_empty() && self.s1.is_empty() && self.s2.is_empty()
    }

    pub fn vertices(&self) -> btree_set::Iter<'_, Simplex0> {
        self.s0.iter()
    }

    pub fn edges(&self) -> btree_set::Iter<'_, Simplex1> {
        self.s1.iter()
    }

    pub fn triangles(&self) -> btree_set::Iter<'_, Simplex2> {
        self.s2.iter()
    }

    /// First vertex in canonical order.
    pub fn first_vertex(&self) -> Option<Simplex0> {
        self.s0.first().copied()
    }

    pub fn first_edge(&self) -> Option<Simplex1> {
        self.s1.first().copied()
    }

    pub fn first_triangle(&self) -> Option<Simplex2> {
        self.s2.first().copied()
    }

    /// The two vertices of a set holding exactly two, in canonical order.
    pub fn vertex_pair(&self) -> Option<(Simplex0, Simplex0)> {
        if self.s0.len() != 2 {
            return None;
        }
        self.s0.iter().copied().collect_tuple()
    }

    /// The two triangles of a set holding exactly two, in canonical order.
    pub fn triangle_pair(&self) -> Option<(Simplex2, Simplex2)> {
        if self.s2.len() != 2 {
            return None;
        }
        self.s2.iter().copied().collect_tuple()
    }

    /// Keeps only simplices of dimension `dim`.
    pub fn of_dimension(&self, dim: u8) -> SimplexSet {
        let mut out = SimplexSet::new();
        match dim {
            0 => out.s0 = self.s0.clone(),
            1 => out.s1 = self.s1.clone(),
            2 => out.s2 = self.s2.clone(),
            _ => {}
        }
        out
    }
}

impl From<Simplex0> for SimplexSet {
    fn from(s: Simplex0) -> Self {
        let mut out = SimplexSet::new();
        out.insert(s);
        out
    }
}

impl From<Simplex1> for SimplexSet {
    fn from(s: Simplex1) -> Self {
        let mut out = SimplexSet::new();
        out.insert(s);
        out
    }
}

impl From<Simplex2> for SimplexSet {
    fn from(s: Simplex2) -> Self {
        let mut out = SimplexSet::new();
        out.insert(s);
        out
    }
}

impl<S: SetMember> Extend<S> for SimplexSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for s in iter {
            self.insert(s);
        }
    }
}

impl<S: SetMember> FromIterator<S> for SimplexSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut out = SimplexSet::new();
        out.extend(iter);
        out
    }
}

// -----------------------------------------------------------------------------
// Ordered-merge set algebra
// -----------------------------------------------------------------------------

enum MergeKind {
    Union,
    Intersection,
    Difference,
}

fn merge<T: Ord + Copy>(a: &BTreeSet<T>, b: &BTreeSet<T>, kind: &MergeKind) -> BTreeSet<T> {
    a.iter()
        .merge_join_by(b.iter(), |x, y| x.cmp(y))
        .filter_map(|step| match (kind, step) {
            (MergeKind::Union, EitherOrBoth::Both(x, _))
            | (MergeKind::Union, EitherOrBoth::Left(x))
            | (MergeKind::Union, EitherOrBoth::Right(x)) => Some(*x),
            (MergeKind::Intersection, EitherOrBoth::Both(x, _)) => Some(*x),
            (MergeKind::Difference, EitherOrBoth::Left(x)) => Some(*x),
            _ => None,
        })
        .collect()
}

fn merge_sets(a: &SimplexSet, b: &SimplexSet, kind: MergeKind) -> SimplexSet {
    SimplexSet {
        s0: merge(&a.s0, &b.s0, &kind),
        s1: merge(&a.s1, &b.s1, &kind),
        s2: merge(&a.s2, &b.s2, &kind),
    }
}

/// `A ∪ B`. Where both sets hold an equal simplex, `A`'s orientation wins.
pub fn union(a: &SimplexSet, b: &SimplexSet) -> SimplexSet {
    merge_sets(a, b, MergeKind::Union)
}

/// `A ∩ B`, keeping `A`'s orientation.
pub fn intersection(a: &SimplexSet, b: &SimplexSet) -> SimplexSet {
    merge_sets(a, b, MergeKind::Intersection)
}

/// `A \ B`.
pub fn difference(a: &SimplexSet, b: &SimplexSet) -> SimplexSet {
    merge_sets(a, b, MergeKind::Difference)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (SimplexSet, SimplexSet) {
        let mut a = SimplexSet::new();
        a.insert(Simplex0::new(1));
        a.insert(Simplex0::new(2));
        a.insert(Simplex1::new(1, 2));
        a.insert(Simplex2::new(1, 2, 3));
        let mut b = SimplexSet::new();
        b.insert(Simplex0::new(2));
        b.insert(Simplex0::new(3));
        b.insert(Simplex1::new(2, 1));
        b.insert(Simplex2::new(2, 3, 4));
        (a, b)
    }

    #[test]
    fn algebra_per_dimension() {
        let (a, b) = sample();
        let u = union(&a, &b);
        assert_eq!((u.size(0), u.size(1), u.size(2)), (3, 1, 2));
        let i = intersection(&a, &b);
        assert_eq!((i.size(0), i.size(1), i.size(2)), (1, 1, 0));
        let d = difference(&a, &b);
        assert_eq!((d.size(0), d.size(1), d.size(2)), (1, 0, 1));
        assert!(d.contains(&Simplex0::new(1)));
    }

    #[test]
    fn pairs_and_dimension_views() {
        let (a, _) = sample();
        assert_eq!(
            a.vertex_pair(),
            Some((Simplex0::new(1), Simplex0::new(2)))
        );
        assert_eq!(a.triangle_pair(), None);
        let only_edges = a.of_dimension(1);
        assert_eq!(only_edges.len(), 1);
        assert_eq!(a.of_dimension(7).len(), 0);
    }

    #[test]
    fn insert_remove_all() {
        let (mut a, b) = sample();
        a.insert_all(&b);
        assert_eq!(a, union(&sample().0, &b));
        a.remove_all(&b);
        assert_eq!(a, difference(&sample().0, &b));
    }
}
