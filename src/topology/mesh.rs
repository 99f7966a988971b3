//! The mesh interface and its concrete adjacency implementation.
//!
//! [`InterfaceMesh`] is the topological contract every operation is written
//! against. Implementors provide a handful of primitive adjacency lookups
//! and mutators; closure, star, link and the boundary/interface/manifold
//! classification are provided on top of them.
//!
//! [`TriangleMesh`] stores vertices in an index-addressed arena, triangles
//! in an ordered map keyed by canonical identity (the stored key keeps its
//! orientation) and edges implicitly: an edge exists exactly while some
//! triangle references it.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::parameters::Parameters;
use crate::geometry::primitives::{Vec2, is_ccw};
use crate::mesh_error::RemeshError;
use crate::topology::simplex::{Index, Simplex, Simplex0, Simplex1, Simplex2};
use crate::topology::simplex_set::SimplexSet;

/// Look-up table from a new simplex to the old simplex it was derived from.
pub type ParentLut<S> = BTreeMap<S, S>;

/// Topological query and edit contract of a labelled 2D triangle mesh.
pub trait InterfaceMesh {
    // --- primitives -------------------------------------------------------

    fn is_valid_vertex(&self, v: Simplex0) -> bool;
    fn is_valid_edge(&self, e: &Simplex1) -> bool;
    fn is_valid_triangle(&self, t: &Simplex2) -> bool;

    /// Edges incident to `v`.
    fn vertex_edges<'a>(&'a self, v: Simplex0) -> Box<dyn Iterator<Item = Simplex1> + 'a>;

    /// Triangles incident to `e`, each in its stored orientation.
    fn edge_faces(&self, e: &Simplex1) -> &[Simplex2];

    /// The stored (oriented) copy of `t`.
    fn oriented(&self, t: &Simplex2) -> Option<Simplex2>;

    /// Phase label of `t`, `None` if `t` is not in the mesh.
    fn label(&self, t: &Simplex2) -> Option<u32>;

    fn set_label(&mut self, t: &Simplex2, label: u32) -> Result<(), RemeshError>;

    fn is_submesh_boundary_vertex(&self, v: Simplex0) -> bool;

    fn set_submesh_boundary(&mut self, v: Simplex0, flag: bool) -> Result<(), RemeshError>;

    /// Every vertex, edge and triangle currently in the mesh.
    fn get_all_simplices(&self) -> SimplexSet;

    /// Allocates a fresh isolated vertex.
    fn insert_vertex(&mut self) -> Simplex0;

    /// Inserts `t` with the orientation given and the phase `label`.
    fn insert_triangle(&mut self, t: Simplex2, label: u32) -> Result<Simplex2, RemeshError>;

    /// Removes `t`; edges left without faces disappear with it.
    fn remove_triangle(&mut self, t: &Simplex2) -> bool;

    /// Removes `v` together with every triangle that uses it.
    fn remove_vertex(&mut self, v: Simplex0) -> bool;

    /// Removes every simplex.
    fn clear(&mut self);

    // --- faces ------------------------------------------------------------

    /// Endpoints of `e`.
    fn boundary_edge(&self, e: &Simplex1) -> SimplexSet {
        e.vertices().into_iter().collect()
    }

    /// The three edges of `t`.
    fn boundary_triangle(&self, t: &Simplex2) -> SimplexSet {
        t.edges().into_iter().collect()
    }

    /// Edges and vertices of `t`.
    fn full_boundary_triangle(&self, t: &Simplex2) -> SimplexSet {
        let mut out = self.boundary_triangle(t);
        out.extend(t.vertices());
        out
    }

    // --- closure, star, link ---------------------------------------------

    fn closure_edge(&self, e: &Simplex1) -> SimplexSet {
        let mut out = self.boundary_edge(e);
        out.insert(*e);
        out
    }

    fn closure_triangle(&self, t: &Simplex2) -> SimplexSet {
        let t = self.oriented(t).unwrap_or(*t);
        let mut out = self.full_boundary_triangle(&t);
        out.insert(t);
        out
    }

    /// Smallest subcomplex containing `set`.
    fn closure(&self, set: &SimplexSet) -> SimplexSet {
        let mut out = SimplexSet::new();
        out.extend(set.vertices().copied());
        for e in set.edges() {
            out.insert_all(&self.closure_edge(e));
        }
        for t in set.triangles() {
            out.insert_all(&self.closure_triangle(t));
        }
        out
    }

    /// `v` with its incident edges and triangles.
    fn star_vertex(&self, v: Simplex0) -> SimplexSet {
        let mut out = SimplexSet::from(v);
        for e in self.vertex_edges(v) {
            out.insert(e);
            out.extend(self.edge_faces(&e).iter().copied());
        }
        out
    }

    /// `e` with its incident triangles.
    fn star_edge(&self, e: &Simplex1) -> SimplexSet {
        let mut out = SimplexSet::from(*e);
        out.extend(self.edge_faces(e).iter().copied());
        out
    }

    fn star_triangle(&self, t: &Simplex2) -> SimplexSet {
        SimplexSet::from(self.oriented(t).unwrap_or(*t))
    }

    /// Union of the stars of every member of `set`.
    fn star(&self, set: &SimplexSet) -> SimplexSet {
        let mut out = SimplexSet::new();
        for v in set.vertices() {
            out.insert_all(&self.star_vertex(*v));
        }
        for e in set.edges() {
            out.insert_all(&self.star_edge(e));
        }
        for t in set.triangles() {
            out.insert_all(&self.star_triangle(t));
        }
        out
    }

    /// `closure(star(v)) \ star(closure(v))`: the ring of simplices around `v`.
    fn link(&self, v: Simplex0) -> SimplexSet {
        let outer = self.closure(&self.star_vertex(v));
        let inner = self.star_vertex(v);
        crate::topology::simplex_set::difference(&outer, &inner)
    }

    /// All triangles labelled `label`.
    fn get_simplices(&self, label: u32) -> SimplexSet {
        self.get_all_simplices()
            .triangles()
            .filter(|t| self.label(t) == Some(label))
            .copied()
            .collect()
    }

    // --- classification ---------------------------------------------------

    /// An edge with one face that is not a cut made by domain decomposition.
    fn is_boundary_edge(&self, e: &Simplex1) -> bool {
        self.edge_faces(e).len() == 1 && !self.is_submesh_boundary_edge(e)
    }

    fn is_boundary_vertex(&self, v: Simplex0) -> bool {
        self.vertex_edges(v).any(|e| self.is_boundary_edge(&e))
    }

    /// An edge whose two faces carry different labels.
    fn is_interface_edge(&self, e: &Simplex1) -> bool {
        match self.edge_faces(e) {
            [a, b] => self.label(a) != self.label(b),
            _ => false,
        }
    }

    fn is_interface_vertex(&self, v: Simplex0) -> bool {
        self.vertex_edges(v).any(|e| self.is_interface_edge(&e))
    }

    /// True if any vertex or edge of `set` is on the interface.
    fn is_interface_set(&self, set: &SimplexSet) -> bool {
        set.vertices().any(|v| self.is_interface_vertex(*v))
            || set.edges().any(|e| self.is_interface_edge(e))
    }

    /// A one-sided edge whose endpoints are both frozen submesh vertices.
    fn is_submesh_boundary_edge(&self, e: &Simplex1) -> bool {
        if self.edge_faces(e).len() == 2 {
            return false;
        }
        self.is_submesh_boundary_vertex(e.v0()) && self.is_submesh_boundary_vertex(e.v1())
    }

    fn is_submesh_boundary_set(&self, set: &SimplexSet) -> bool {
        set.vertices().any(|v| self.is_submesh_boundary_vertex(*v))
            || set.edges().any(|e| self.is_submesh_boundary_edge(e))
    }

    /// Edge with one or two faces.
    fn is_manifold_edge(&self, e: &Simplex1) -> bool {
        matches!(self.edge_faces(e).len(), 1 | 2)
    }

    /// A vertex whose neighbourhood is a disc or a half-disc.
    fn is_manifold_vertex(&self, v: Simplex0) -> bool {
        let mut n_edges = 0usize;
        let mut n_boundary = 0usize;
        for e in self.vertex_edges(v) {
            n_edges += 1;
            if !self.is_manifold_edge(&e) {
                return false;
            }
            if self.is_boundary_edge(&e) || self.is_submesh_boundary_edge(&e) {
                n_boundary += 1;
            }
        }
        n_edges >= 2 && (n_boundary == 0 || n_boundary == 2)
    }

    /// A triangle with at least two one-sided edges.
    fn is_ear(&self, t: &Simplex2) -> bool {
        t.edges()
            .iter()
            .filter(|e| self.edge_faces(e).len() < 2)
            .count()
            >= 2
    }

    // --- editing ----------------------------------------------------------

    /// Swaps `old` for `new`, leaving the mesh untouched on error.
    ///
    /// Each new triangle takes the label of its parent in `parent_lut`, or
    /// the ambient label when it has none, and is stored counter-clockwise
    /// with respect to `position`. Old triangles are removed before old
    /// vertices; new vertices must already have been allocated. The new
    /// triangles are checked against the mesh minus `old` before anything
    /// is removed.
    fn replace<F>(
        &mut self,
        old: &SimplexSet,
        new: &SimplexSet,
        parent_lut: &ParentLut<Simplex2>,
        parameters: &Parameters,
        position: F,
    ) -> Result<(), RemeshError>
    where
        F: Fn(Simplex0) -> Vec2,
        Self: Sized,
    {
        let labelled: Vec<(Simplex2, u32)> = new
            .triangles()
            .map(|t| {
                let label = parent_lut
                    .get(t)
                    .and_then(|parent| self.label(parent))
                    .unwrap_or(parameters.ambient_label);
                (orient_ccw(*t, &position), label)
            })
            .collect();
        self.check_replacement(old, &labelled)?;

        for t in old.triangles() {
            self.remove_triangle(t);
        }
        for v in old.vertices() {
            self.remove_vertex(*v);
        }
        for (t, label) in labelled {
            self.insert_triangle(t, label)?;
        }
        Ok(())
    }

    /// Fails if inserting `new` after removing `old` would be rejected.
    fn check_replacement(
        &self,
        old: &SimplexSet,
        new: &[(Simplex2, u32)],
    ) -> Result<(), RemeshError> {
        let mut removed: BTreeSet<Simplex2> = old.triangles().copied().collect();
        for v in old.vertices() {
            removed.extend(self.star_vertex(*v).triangles().copied());
        }
        let mut added: BTreeSet<Simplex2> = BTreeSet::new();
        let mut edge_faces: BTreeMap<Simplex1, usize> = BTreeMap::new();
        for (t, _) in new {
            if t.is_null() || t.is_degenerate() || !added.insert(*t) {
                return Err(RemeshError::InvalidTriangle(*t));
            }
            if self.is_valid_triangle(t) && !removed.contains(t) {
                return Err(RemeshError::InvalidTriangle(*t));
            }
            if let Some(v) = t
                .vertices()
                .into_iter()
                .find(|v| !self.is_valid_vertex(*v) || old.contains(v))
            {
                return Err(RemeshError::UnknownVertex(v));
            }
            for e in t.edges() {
                let count = edge_faces.entry(e).or_insert_with(|| {
                    self.edge_faces(&e)
                        .iter()
                        .filter(|f| !removed.contains(*f))
                        .count()
                });
                *count += 1;
                if *count > 2 {
                    return Err(RemeshError::InvalidTriangle(*t));
                }
            }
        }
        Ok(())
    }
}

/// `t` reordered so that its vertices turn counter-clockwise.
pub fn orient_ccw<F: Fn(Simplex0) -> Vec2>(t: Simplex2, position: F) -> Simplex2 {
    let [a, b, c] = t.vertices();
    if is_ccw(position(a), position(b), position(c)) {
        t
    } else {
        t.flipped()
    }
}

// -----------------------------------------------------------------------------
// TriangleMesh
// -----------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
struct VertexEntry {
    alive: bool,
    submesh_boundary: bool,
    edges: BTreeSet<Simplex1>,
}

/// Adjacency-based labelled triangle mesh.
#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    vertices: Vec<VertexEntry>,
    edges: BTreeMap<Simplex1, Vec<Simplex2>>,
    triangles: BTreeMap<Simplex2, u32>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh of `n_vertices` vertices from oriented triangles and their labels.
    pub fn from_triangles(
        n_vertices: usize,
        triangles: &[[Index; 3]],
        labels: &[u32],
    ) -> Result<Self, RemeshError> {
        if triangles.len() != labels.len() {
            return Err(RemeshError::SizeMismatch {
                what: "triangle labels",
                expected: triangles.len(),
                found: labels.len(),
            });
        }
        let mut mesh = TriangleMesh::new();
        for _ in 0..n_vertices {
            mesh.insert_vertex();
        }
        for (&[a, b, c], &label) in triangles.iter().zip(labels) {
            mesh.insert_triangle(Simplex2::new(a, b, c), label)?;
        }
        Ok(mesh)
    }

    /// Size of the vertex arena, dead slots included.
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.alive).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Live vertices in index order.
    pub fn vertices(&self) -> impl Iterator<Item = Simplex0> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.alive)
            .map(|(i, _)| Simplex0::new(i as Index))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Simplex1> + '_ {
        self.edges.keys()
    }

    /// Triangles in canonical order with their labels.
    pub fn triangles(&self) -> impl Iterator<Item = (&Simplex2, u32)> + '_ {
        self.triangles.iter().map(|(t, l)| (t, *l))
    }

    fn entry(&self, v: Simplex0) -> Option<&VertexEntry> {
        if v.is_null() {
            return None;
        }
        self.vertices.get(v.slot()).filter(|e| e.alive)
    }

    fn entry_mut(&mut self, v: Simplex0) -> Option<&mut VertexEntry> {
        if v.is_null() {
            return None;
        }
        self.vertices.get_mut(v.slot()).filter(|e| e.alive)
    }
}

impl InterfaceMesh for TriangleMesh {
    fn is_valid_vertex(&self, v: Simplex0) -> bool {
        self.entry(v).is_some()
    }

    fn is_valid_edge(&self, e: &Simplex1) -> bool {
        self.edges.contains_key(e)
    }

    fn is_valid_triangle(&self, t: &Simplex2) -> bool {
        self.triangles.contains_key(t)
    }

    fn vertex_edges<'a>(&'a self, v: Simplex0) -> Box<dyn Iterator<Item = Simplex1> + 'a> {
        match self.entry(v) {
            Some(entry) => Box::new(entry.edges.iter().copied()),
            None => Box::new(std::iter::empty()),
        }
    }

    fn edge_faces(&self, e: &Simplex1) -> &[Simplex2] {
        self.edges.get(e).map(Vec::as_slice).unwrap_or(&[])
    }

    fn oriented(&self, t: &Simplex2) -> Option<Simplex2> {
        self.triangles.get_key_value(t).map(|(k, _)| *k)
    }

    fn label(&self, t: &Simplex2) -> Option<u32> {
        self.triangles.get(t).copied()
    }

    fn set_label(&mut self, t: &Simplex2, label: u32) -> Result<(), RemeshError> {
        match self.triangles.get_mut(t) {
            Some(slot) => {
                *slot = label;
                Ok(())
            }
            None => Err(RemeshError::InvalidTriangle(*t)),
        }
    }

    fn is_submesh_boundary_vertex(&self, v: Simplex0) -> bool {
        self.entry(v).is_some_and(|e| e.submesh_boundary)
    }

    fn set_submesh_boundary(&mut self, v: Simplex0, flag: bool) -> Result<(), RemeshError> {
        let entry = self.entry_mut(v).ok_or(RemeshError::UnknownVertex(v))?;
        entry.submesh_boundary = flag;
        Ok(())
    }

    fn get_all_simplices(&self) -> SimplexSet {
        let mut out: SimplexSet = self.vertices().collect();
        out.extend(self.edges.keys().copied());
        out.extend(self.triangles.keys().copied());
        out
    }

    fn insert_vertex(&mut self) -> Simplex0 {
        let v = Simplex0::new(self.vertices.len() as Index);
        self.vertices.push(VertexEntry {
            alive: true,
            ..VertexEntry::default()
        });
        v
    }

    fn insert_triangle(&mut self, t: Simplex2, label: u32) -> Result<Simplex2, RemeshError> {
        if t.is_null() || t.is_degenerate() || self.triangles.contains_key(&t) {
            return Err(RemeshError::InvalidTriangle(t));
        }
        if let Some(v) = t.vertices().into_iter().find(|v| !self.is_valid_vertex(*v)) {
            return Err(RemeshError::UnknownVertex(v));
        }
        if t.edges().iter().any(|e| self.edge_faces(e).len() >= 2) {
            return Err(RemeshError::InvalidTriangle(t));
        }
        for e in t.edges() {
            let faces = self.edges.entry(e).or_default();
            faces.push(t);
            if faces.len() == 1 {
                for v in e.vertices() {
                    if let Some(entry) = self.entry_mut(v) {
                        entry.edges.insert(e);
                    }
                }
            }
        }
        self.triangles.insert(t, label);
        Ok(t)
    }

    fn remove_triangle(&mut self, t: &Simplex2) -> bool {
        let Some((stored, _)) = self.triangles.remove_entry(t) else {
            return false;
        };
        for e in stored.edges() {
            let now_empty = match self.edges.get_mut(&e) {
                Some(faces) => {
                    faces.retain(|f| f != &stored);
                    faces.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.edges.remove(&e);
                for v in e.vertices() {
                    if let Some(entry) = self.entry_mut(v) {
                        entry.edges.remove(&e);
                    }
                }
            }
        }
        true
    }

    fn remove_vertex(&mut self, v: Simplex0) -> bool {
        if !self.is_valid_vertex(v) {
            return false;
        }
        let incident: Vec<Simplex2> = self.star_vertex(v).triangles().copied().collect();
        for t in &incident {
            self.remove_triangle(t);
        }
        if let Some(entry) = self.entry_mut(v) {
            *entry = VertexEntry::default();
        }
        true
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.triangles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit square split along (0,2): lower triangle labelled 1, upper labelled 2.
    fn square() -> TriangleMesh {
        TriangleMesh::from_triangles(4, &[[0, 1, 2], [0, 2, 3]], &[1, 2]).unwrap()
    }

    fn v(i: Index) -> Simplex0 {
        Simplex0::new(i)
    }

    #[test]
    fn counts_and_all_simplices() {
        let m = square();
        assert_eq!((m.vertex_count(), m.edge_count(), m.triangle_count()), (4, 5, 2));
        let all = m.get_all_simplices();
        assert_eq!((all.size(0), all.size(1), all.size(2)), (4, 5, 2));
    }

    #[test]
    fn classification() {
        let m = square();
        let diag = Simplex1::new(2, 0);
        assert!(m.is_interface_edge(&diag));
        assert!(!m.is_boundary_edge(&diag));
        assert!(m.is_boundary_edge(&Simplex1::new(0, 1)));
        assert!(m.is_interface_vertex(v(0)));
        assert!(!m.is_interface_vertex(v(1)));
        assert!(m.is_boundary_vertex(v(1)));
        assert!(m.is_manifold_vertex(v(0)));
        assert!(m.is_manifold_vertex(v(1)));
        assert!(m.is_ear(&Simplex2::new(0, 1, 2)));
    }

    #[test]
    fn star_closure_link() {
        let m = square();
        let star = m.star_vertex(v(0));
        assert_eq!((star.size(0), star.size(1), star.size(2)), (1, 3, 2));
        let link = m.link(v(0));
        assert_eq!(link.size(0), 3);
        assert!(link.contains(&Simplex1::new(1, 2)));
        assert!(link.contains(&Simplex1::new(2, 3)));
        assert_eq!(link.size(2), 0);
        let closure = m.closure_triangle(&Simplex2::new(2, 1, 0));
        assert_eq!(closure.len(), 7);
        // the stored orientation is returned
        assert_eq!(closure.first_triangle().unwrap().vertices()[0], v(0));
    }

    #[test]
    fn submesh_boundary_edges_are_not_boundary() {
        let mut m = square();
        m.set_submesh_boundary(v(0), true).unwrap();
        m.set_submesh_boundary(v(1), true).unwrap();
        let e = Simplex1::new(0, 1);
        assert!(m.is_submesh_boundary_edge(&e));
        assert!(!m.is_boundary_edge(&e));
        assert!(!m.is_submesh_boundary_edge(&Simplex1::new(0, 2)));
    }

    #[test]
    fn removing_triangle_drops_orphan_edges() {
        let mut m = square();
        assert!(m.remove_triangle(&Simplex2::new(3, 2, 0)));
        assert_eq!(m.edge_count(), 3);
        assert!(m.is_boundary_edge(&Simplex1::new(0, 2)));
        assert!(!m.is_valid_edge(&Simplex1::new(2, 3)));
        assert_eq!(m.vertex_edges(v(3)).count(), 0);
    }

    #[test]
    fn replace_derives_labels_and_orientation() {
        let mut m = square();
        let coords = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.5, 0.5),
        ];
        let c = m.insert_vertex();
        let old_t = Simplex2::new(0, 1, 2);
        let mut old = SimplexSet::from(old_t);
        old.insert(Simplex1::new(0, 2));
        let mut new = SimplexSet::new();
        // deliberately clockwise
        let t0 = Simplex2::new(0, c.idx(), 1);
        let t1 = Simplex2::new(1, 2, c.idx());
        new.insert(t0);
        new.insert(t1);
        let mut lut = ParentLut::new();
        lut.insert(t0, old_t);
        let mut params = Parameters::default();
        params.ambient_label = 7;

        m.replace(&old, &new, &lut, &params, |s| coords[s.slot()]).unwrap();
        assert_eq!(m.label(&t0), Some(1));
        assert_eq!(m.label(&t1), Some(7));
        let stored = m.oriented(&t0).unwrap();
        let [a, b, cc] = stored.vertices();
        assert!(is_ccw(coords[a.slot()], coords[b.slot()], coords[cc.slot()]));
    }

    #[test]
    fn failed_replace_leaves_mesh_untouched() {
        let mut m = square();
        let coords = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let before: Vec<(Simplex2, u32)> = m.triangles().map(|(t, l)| (*t, l)).collect();
        let old = SimplexSet::from(Simplex2::new(0, 1, 2));
        // (0,2,3) is already present and not being removed
        let new: SimplexSet = [Simplex2::new(0, 1, 3), Simplex2::new(0, 2, 3)]
            .into_iter()
            .collect();

        let err = m
            .replace(&old, &new, &ParentLut::new(), &Parameters::default(), |s| {
                coords[s.slot()]
            })
            .unwrap_err();
        assert!(matches!(err, RemeshError::InvalidTriangle(_)));
        let after: Vec<(Simplex2, u32)> = m.triangles().map(|(t, l)| (*t, l)).collect();
        assert_eq!(after, before);
        assert_eq!(m.edge_count(), 5);
        assert!(m.is_valid_triangle(&Simplex2::new(0, 1, 2)));
        assert!(!m.is_valid_triangle(&Simplex2::new(0, 1, 3)));
    }

    #[test]
    fn replace_rejects_new_triangle_on_removed_vertex() {
        let mut m = square();
        let coords = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let old = SimplexSet::from(v(1));
        let new = SimplexSet::from(Simplex2::new(0, 1, 2));
        let err = m
            .replace(&old, &new, &ParentLut::new(), &Parameters::default(), |s| {
                coords[s.slot()]
            })
            .unwrap_err();
        assert_eq!(err, RemeshError::UnknownVertex(v(1)));
        assert_eq!(m.triangle_count(), 2);
        assert!(m.is_valid_vertex(v(1)));
    }

    #[test]
    fn manifold_edges_have_one_or_two_faces() {
        let mut m = square();
        assert!(m.is_manifold_edge(&Simplex1::new(0, 2)));
        assert!(m.is_manifold_edge(&Simplex1::new(0, 1)));
        let extra = m.insert_vertex();
        assert!(!m.is_manifold_edge(&Simplex1::new(0, extra.idx())));
    }

    #[test]
    fn rejects_third_face_on_edge() {
        let mut m = square();
        let extra = m.insert_vertex();
        let err = m.insert_triangle(Simplex2::new(0, 2, extra.idx()), 3).unwrap_err();
        assert_eq!(err, RemeshError::InvalidTriangle(Simplex2::new(0, 2, extra.idx())));
    }
}
