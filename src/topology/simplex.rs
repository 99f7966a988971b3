//! `Simplex0`, `Simplex1`, `Simplex2`: value identifiers for vertices, edges
//! and triangles.
//!
//! A simplex stores the vertex indices in the order it was built with, so a
//! triangle keeps its orientation. Equality, ordering and hashing of edges
//! and triangles are defined on the *sorted* index tuple, so `(a, b)` and
//! `(b, a)` name the same edge and every permutation of `(a, b, c)` names the
//! same triangle. Sorted containers therefore iterate in a canonical,
//! reproducible order.
//!
//! [`UNASSIGNED`] is the sentinel for "no vertex". A simplex that contains it
//! is null and is never inserted into a mesh.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Raw vertex index.
pub type Index = u64;

/// Sentinel index meaning "unset".
pub const UNASSIGNED: Index = u64::MAX;

/// Common surface of the three simplex kinds.
pub trait Simplex: Copy + Ord + fmt::Debug {
    /// Topological dimension (0, 1 or 2).
    const DIMENSION: u8;

    /// True when any index is the [`UNASSIGNED`] sentinel.
    fn is_null(&self) -> bool;
}

// -----------------------------------------------------------------------------
// Simplex0
// -----------------------------------------------------------------------------

/// A vertex.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[repr(transparent)]
pub struct Simplex0(Index);

impl Simplex0 {
    /// The null vertex.
    pub const NULL: Simplex0 = Simplex0(UNASSIGNED);

    #[inline]
    pub const fn new(idx: Index) -> Self {
        Simplex0(idx)
    }

    #[inline]
    pub const fn idx(self) -> Index {
        self.0
    }

    /// Index as a `usize`, for addressing per-vertex vectors.
    #[inline]
    pub const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl Default for Simplex0 {
    fn default() -> Self {
        Simplex0::NULL
    }
}

impl Simplex for Simplex0 {
    const DIMENSION: u8 = 0;

    fn is_null(&self) -> bool {
        self.0 == UNASSIGNED
    }
}

impl fmt::Debug for Simplex0 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Simplex0(null)")
        } else {
            f.debug_tuple("Simplex0").field(&self.0).finish()
        }
    }
}

impl fmt::Display for Simplex0 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Index> for Simplex0 {
    fn from(idx: Index) -> Self {
        Simplex0(idx)
    }
}

// -----------------------------------------------------------------------------
// Simplex1
// -----------------------------------------------------------------------------

/// An edge. Compared on its sorted endpoint pair.
#[derive(Copy, Clone, serde::Serialize, serde::Deserialize)]
pub struct Simplex1 {
    idx: [Index; 2],
}

impl Simplex1 {
    #[inline]
    pub const fn new(a: Index, b: Index) -> Self {
        Simplex1 { idx: [a, b] }
    }

    #[inline]
    pub const fn from_vertices(a: Simplex0, b: Simplex0) -> Self {
        Simplex1 { idx: [a.0, b.0] }
    }

    /// Endpoints in construction order.
    #[inline]
    pub fn vertices(&self) -> [Simplex0; 2] {
        [Simplex0(self.idx[0]), Simplex0(self.idx[1])]
    }

    #[inline]
    pub fn v0(&self) -> Simplex0 {
        Simplex0(self.idx[0])
    }

    #[inline]
    pub fn v1(&self) -> Simplex0 {
        Simplex0(self.idx[1])
    }

    /// Canonical (ascending) index pair.
    #[inline]
    pub fn sorted(&self) -> [Index; 2] {
        let [a, b] = self.idx;
        if a <= b { [a, b] } else { [b, a] }
    }

    pub fn contains(&self, v: Simplex0) -> bool {
        self.idx[0] == v.0 || self.idx[1] == v.0
    }

    /// The endpoint that is not `v`, if `v` is an endpoint.
    pub fn other(&self, v: Simplex0) -> Option<Simplex0> {
        if self.idx[0] == v.0 {
            Some(Simplex0(self.idx[1]))
        } else if self.idx[1] == v.0 {
            Some(Simplex0(self.idx[0]))
        } else {
            None
        }
    }
}

impl Simplex for Simplex1 {
    const DIMENSION: u8 = 1;

    fn is_null(&self) -> bool {
        self.idx.contains(&UNASSIGNED)
    }
}

impl PartialEq for Simplex1 {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for Simplex1 {}

impl PartialOrd for Simplex1 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Simplex1 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sorted().cmp(&other.sorted())
    }
}

impl Hash for Simplex1 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl fmt::Debug for Simplex1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Simplex1({}, {})", self.idx[0], self.idx[1])
    }
}

// -----------------------------------------------------------------------------
// Simplex2
// -----------------------------------------------------------------------------

/// A triangle. Keeps its vertex order (orientation) but compares on the
/// sorted index triple.
#[derive(Copy, Clone, serde::Serialize, serde::Deserialize)]
pub struct Simplex2 {
    idx: [Index; 3],
}

impl Simplex2 {
    #[inline]
    pub const fn new(a: Index, b: Index, c: Index) -> Self {
        Simplex2 { idx: [a, b, c] }
    }

    #[inline]
    pub const fn from_vertices(a: Simplex0, b: Simplex0, c: Simplex0) -> Self {
        Simplex2 {
            idx: [a.0, b.0, c.0],
        }
    }

    /// Vertices in stored (oriented) order.
    #[inline]
    pub fn vertices(&self) -> [Simplex0; 3] {
        [
            Simplex0(self.idx[0]),
            Simplex0(self.idx[1]),
            Simplex0(self.idx[2]),
        ]
    }

    /// Canonical (ascending) index triple.
    pub fn sorted(&self) -> [Index; 3] {
        let mut s = self.idx;
        s.sort_unstable();
        s
    }

    /// The three edges, `(v0,v1)`, `(v1,v2)`, `(v2,v0)`.
    pub fn edges(&self) -> [Simplex1; 3] {
        let [a, b, c] = self.idx;
        [Simplex1::new(a, b), Simplex1::new(b, c), Simplex1::new(c, a)]
    }

    /// Position of `v` in the stored order.
    pub fn local_index(&self, v: Simplex0) -> Option<usize> {
        self.idx.iter().position(|&i| i == v.0)
    }

    pub fn contains(&self, v: Simplex0) -> bool {
        self.local_index(v).is_some()
    }

    /// Vertex not on `edge`, if `edge` is one of this triangle's edges.
    pub fn opposite_vertex(&self, edge: &Simplex1) -> Option<Simplex0> {
        let [a, b] = edge.vertices();
        if !self.contains(a) || !self.contains(b) || a == b {
            return None;
        }
        self.vertices().into_iter().find(|&v| v != a && v != b)
    }

    /// Edge not touching `v`, if `v` is a vertex of this triangle.
    pub fn opposite_edge(&self, v: Simplex0) -> Option<Simplex1> {
        let i = self.local_index(v)?;
        Some(Simplex1::new(self.idx[(i + 1) % 3], self.idx[(i + 2) % 3]))
    }

    /// Same triangle with the first two vertices swapped.
    pub fn flipped(&self) -> Self {
        let [a, b, c] = self.idx;
        Simplex2 { idx: [b, a, c] }
    }

    /// Copy of this triangle with `from` replaced by `to`, orientation kept.
    pub fn substitute(&self, from: Simplex0, to: Simplex0) -> Self {
        let mut idx = self.idx;
        for i in idx.iter_mut() {
            if *i == from.0 {
                *i = to.0;
            }
        }
        Simplex2 { idx }
    }

    /// True if any two vertex indices coincide.
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.idx;
        a == b || b == c || a == c
    }
}

impl Simplex for Simplex2 {
    const DIMENSION: u8 = 2;

    fn is_null(&self) -> bool {
        self.idx.contains(&UNASSIGNED)
    }
}

impl PartialEq for Simplex2 {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for Simplex2 {}

impl PartialOrd for Simplex2 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Simplex2 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sorted().cmp(&other.sorted())
    }
}

impl Hash for Simplex2 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl fmt::Debug for Simplex2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Simplex2({}, {}, {})",
            self.idx[0], self.idx[1], self.idx[2]
        )
    }
}
