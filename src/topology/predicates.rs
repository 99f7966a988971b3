//! Composable simplex predicates and `filter`.
//!
//! A [`Predicate`] is a small expression tree evaluated against a mesh.
//! Leaves query the mesh (`IsInterface`, `InPhase(3)`, ...) and the
//! `&`, `|` and `!` operators combine them:
//!
//! ```rust
//! use grit_remesh::topology::predicates::Predicate;
//! let eligible = Predicate::IsDimension(1) & !Predicate::IsInterface;
//! # let _ = eligible;
//! ```
//!
//! Every leaf returns `false` for a simplex that is no longer in the mesh,
//! so a filter over a set that an earlier operation has partly invalidated
//! is safe.

use std::ops::{BitAnd, BitOr, Not};

use crate::topology::mesh::InterfaceMesh;
use crate::topology::simplex::{Simplex0, Simplex1, Simplex2};
use crate::topology::simplex_set::SimplexSet;

/// Boolean expression over a single simplex.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    IsDimension(u8),
    /// The simplex touches a triangle carrying this label.
    InPhase(u32),
    IsBoundary,
    IsInterface,
    IsSubmeshBoundary,
    IsManifold,
    IsValid,
    Bool(bool),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

/// Dispatch of predicate leaves to the mesh query of the right dimension.
pub trait Classify: Copy {
    const DIMENSION: u8;
    fn valid_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool;
    fn in_phase<M: InterfaceMesh + ?Sized>(&self, mesh: &M, label: u32) -> bool;
    fn boundary_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool;
    fn interface_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool;
    fn submesh_boundary_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool;
    fn manifold_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool;
}

impl Classify for Simplex0 {
    const DIMENSION: u8 = 0;
    fn valid_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_valid_vertex(*self)
    }
    fn in_phase<M: InterfaceMesh + ?Sized>(&self, mesh: &M, label: u32) -> bool {
        mesh.star_vertex(*self)
            .triangles()
            .any(|t| mesh.label(t) == Some(label))
    }
    fn boundary_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_boundary_vertex(*self)
    }
    fn interface_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_interface_vertex(*self)
    }
    fn submesh_boundary_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_submesh_boundary_vertex(*self)
    }
    fn manifold_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_manifold_vertex(*self)
    }
}

impl Classify for Simplex1 {
    const DIMENSION: u8 = 1;
    fn valid_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_valid_edge(self)
    }
    fn in_phase<M: InterfaceMesh + ?Sized>(&self, mesh: &M, label: u32) -> bool {
        mesh.edge_faces(self)
            .iter()
            .any(|t| mesh.label(t) == Some(label))
    }
    fn boundary_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_boundary_edge(self)
    }
    fn interface_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_interface_edge(self)
    }
    fn submesh_boundary_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_submesh_boundary_edge(self)
    }
    fn manifold_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_manifold_edge(self)
    }
}

impl Classify for Simplex2 {
    const DIMENSION: u8 = 2;
    fn valid_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_valid_triangle(self)
    }
    fn in_phase<M: InterfaceMesh + ?Sized>(&self, mesh: &M, label: u32) -> bool {
        mesh.label(self) == Some(label)
    }
    fn boundary_in<M: InterfaceMesh + ?Sized>(&self, _mesh: &M) -> bool {
        false
    }
    fn interface_in<M: InterfaceMesh + ?Sized>(&self, _mesh: &M) -> bool {
        false
    }
    fn submesh_boundary_in<M: InterfaceMesh + ?Sized>(&self, _mesh: &M) -> bool {
        false
    }
    fn manifold_in<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        mesh.is_valid_triangle(self)
    }
}

impl Predicate {
    /// Vertices or edges.
    pub fn vertices_or_edges() -> Predicate {
        Predicate::IsDimension(0) | Predicate::IsDimension(1)
    }

    /// Evaluates the predicate for `s`.
    pub fn eval<M, S>(&self, mesh: &M, s: &S) -> bool
    where
        M: InterfaceMesh + ?Sized,
        S: Classify,
    {
        match self {
            Predicate::IsDimension(d) => *d == S::DIMENSION,
            Predicate::Bool(b) => *b,
            Predicate::And(a, b) => a.eval(mesh, s) && b.eval(mesh, s),
            Predicate::Or(a, b) => a.eval(mesh, s) || b.eval(mesh, s),
            Predicate::Not(a) => !a.eval(mesh, s),
            Predicate::IsValid => s.valid_in(mesh),
            leaf => {
                if !s.valid_in(mesh) {
                    return false;
                }
                match leaf {
                    Predicate::InPhase(label) => s.in_phase(mesh, *label),
                    Predicate::IsBoundary => s.boundary_in(mesh),
                    Predicate::IsInterface => s.interface_in(mesh),
                    Predicate::IsSubmeshBoundary => s.submesh_boundary_in(mesh),
                    Predicate::IsManifold => s.manifold_in(mesh),
                    _ => unreachable!("composite predicates are handled above"),
                }
            }
        }
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;
    fn bitand(self, rhs: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Predicate {
    type Output = Predicate;
    fn bitor(self, rhs: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Predicate {
    type Output = Predicate;
    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

/// Keeps the simplices of `set` that satisfy `predicate`.
pub fn filter<M: InterfaceMesh + ?Sized>(
    set: &SimplexSet,
    mesh: &M,
    predicate: &Predicate,
) -> SimplexSet {
    let mut out = SimplexSet::new();
    out.extend(set.vertices().filter(|s| predicate.eval(mesh, *s)).copied());
    out.extend(set.edges().filter(|s| predicate.eval(mesh, *s)).copied());
    out.extend(set.triangles().filter(|s| predicate.eval(mesh, *s)).copied());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mesh::TriangleMesh;

    fn square() -> TriangleMesh {
        TriangleMesh::from_triangles(4, &[[0, 1, 2], [0, 2, 3]], &[1, 2]).unwrap()
    }

    #[test]
    fn combinators() {
        let m = square();
        let all = m.get_all_simplices();
        let interface_edges = filter(&all, &m, &(Predicate::IsDimension(1) & Predicate::IsInterface));
        assert_eq!(interface_edges.len(), 1);
        assert!(interface_edges.contains(&Simplex1::new(0, 2)));

        let bulk_edges = filter(&all, &m, &(Predicate::IsDimension(1) & !Predicate::IsInterface));
        assert_eq!(bulk_edges.size(1), 4);

        let phase_two = filter(&all, &m, &(Predicate::IsDimension(2) & Predicate::InPhase(2)));
        assert_eq!(phase_two.size(2), 1);

        let either = filter(&all, &m, &(Predicate::IsDimension(0) | Predicate::IsDimension(2)));
        assert_eq!(either.len(), 6);
    }

    #[test]
    fn in_phase_for_lower_dimensions() {
        let m = square();
        assert!(Predicate::InPhase(2).eval(&m, &Simplex0::new(3)));
        assert!(!Predicate::InPhase(2).eval(&m, &Simplex0::new(1)));
        assert!(Predicate::InPhase(1).eval(&m, &Simplex1::new(0, 2)));
    }

    #[test]
    fn invalidated_simplices_fail_every_leaf() {
        let mut m = square();
        let gone = Simplex1::new(2, 3);
        m.remove_triangle(&Simplex2::new(0, 2, 3));
        assert!(!Predicate::IsBoundary.eval(&m, &gone));
        assert!(!Predicate::InPhase(2).eval(&m, &gone));
        assert!(!Predicate::IsValid.eval(&m, &gone));
        assert!((!Predicate::IsValid).eval(&m, &gone));
    }
}
