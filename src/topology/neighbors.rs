//! Vertex → incident-element lookup.
//!
//! [`Neighbors`] flattens `(vertex, element)` pairs into one sorted vector
//! plus an offset table, so the elements around vertex `v` are
//! `pairs[offset[v]..offset[v + 1]]`. Isolated vertices get empty ranges.
//! The index is read-only and must be rebuilt after the mesh changes.

use itertools::Itertools;

/// Sorted vertex/element incidence with per-vertex offsets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    pairs: Vec<(usize, usize)>,
    offset: Vec<usize>,
}

impl Neighbors {
    /// Incidence of `n_vertices` vertices in the triangles `triangles` (local indices).
    pub fn from_triangles(triangles: &[[usize; 3]], n_vertices: usize) -> Self {
        Self::from_elements(triangles.iter().map(|t| t.as_slice()), n_vertices)
    }

    /// Incidence of `n_vertices` vertices in the edges `edges` (local indices).
    pub fn from_edges(edges: &[[usize; 2]], n_vertices: usize) -> Self {
        Self::from_elements(edges.iter().map(|e| e.as_slice()), n_vertices)
    }

    fn from_elements<'a, I>(elements: I, n_vertices: usize) -> Self
    where
        I: Iterator<Item = &'a [usize]>,
    {
        let pairs: Vec<(usize, usize)> = elements
            .enumerate()
            .flat_map(|(idx, verts)| verts.iter().map(move |&v| (v, idx)))
            .sorted_unstable()
            .collect();

        // offset[v] = first pair whose vertex is >= v
        let mut offset = Vec::with_capacity(n_vertices + 1);
        let mut cursor = 0usize;
        for v in 0..=n_vertices {
            while cursor < pairs.len() && pairs[cursor].0 < v {
                cursor += 1;
            }
            offset.push(cursor);
        }
        if let Some(last) = offset.last_mut() {
            *last = pairs.len();
        }
        Neighbors { pairs, offset }
    }

    pub fn vertex_count(&self) -> usize {
        self.offset.len().saturating_sub(1)
    }

    /// Element indices incident to vertex `v` in ascending order.
    pub fn of(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        let range = match (self.offset.get(v), self.offset.get(v + 1)) {
            (Some(&start), Some(&end)) => start..end,
            _ => 0..0,
        };
        self.pairs[range].iter().map(|&(_, element)| element)
    }

    /// Number of elements touching `v`.
    pub fn degree(&self, v: usize) -> usize {
        match (self.offset.get(v), self.offset.get(v + 1)) {
            (Some(&start), Some(&end)) => end - start,
            _ => 0,
        }
    }

    /// The raw sorted `(vertex, element)` pairs.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // five triangles over six vertices, vertex 5 only in the last one
    const T: [[usize; 3]; 5] = [[0, 1, 2], [0, 2, 3], [3, 2, 4], [2, 1, 4], [1, 5, 4]];

    #[test]
    fn triangle_neighbors() {
        let n = Neighbors::from_triangles(&T, 6);
        assert_eq!(n.of(0).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(n.of(1).collect::<Vec<_>>(), vec![0, 3, 4]);
        assert_eq!(n.of(2).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(n.of(5).collect::<Vec<_>>(), vec![4]);
        assert_eq!(n.offsets().len(), 7);
    }

    #[test]
    fn edge_neighbors_with_isolated_vertices() {
        let n = Neighbors::from_edges(&[[0, 2], [2, 4]], 6);
        assert_eq!(n.of(0).collect::<Vec<_>>(), vec![0]);
        assert_eq!(n.degree(1), 0);
        assert_eq!(n.of(2).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(n.degree(3), 0);
        assert_eq!(n.degree(5), 0);
        assert_eq!(n.degree(17), 0);
    }
}
