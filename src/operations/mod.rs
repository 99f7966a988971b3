//! The operation framework: quality measures, mesh operations, attribute
//! assignments and the [`Batch`](batch::Batch) scheduling primitive tying
//! them together.
//!
//! Each of the three roles is a tagged variant dispatched over the simplex
//! dimension it works on. Simplices of any dimension travel through the
//! framework as [`AnySimplex`].

pub mod assignment;
pub mod batch;
pub mod mesh_ops;
pub mod quality;

pub use assignment::{AttributeAssignment, LabelSets};
pub use batch::{Batch, do_operations};
pub use mesh_ops::{MeshOperation, OperationKind, Plan, find_collapsable_vertices};
pub use quality::{MeasureKind, QualityMeasure, Thresholds};

use crate::topology::mesh::InterfaceMesh;
use crate::topology::predicates::Predicate;
use crate::topology::simplex::{Simplex0, Simplex1, Simplex2};
use crate::topology::simplex_set::SimplexSet;

/// A vertex, edge or triangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnySimplex {
    Vertex(Simplex0),
    Edge(Simplex1),
    Triangle(Simplex2),
}

impl AnySimplex {
    pub fn dimension(&self) -> u8 {
        match self {
            AnySimplex::Vertex(_) => 0,
            AnySimplex::Edge(_) => 1,
            AnySimplex::Triangle(_) => 2,
        }
    }

    pub fn is_valid<M: InterfaceMesh + ?Sized>(&self, mesh: &M) -> bool {
        match self {
            AnySimplex::Vertex(v) => mesh.is_valid_vertex(*v),
            AnySimplex::Edge(e) => mesh.is_valid_edge(e),
            AnySimplex::Triangle(t) => mesh.is_valid_triangle(t),
        }
    }

    /// Evaluates `predicate` for the wrapped simplex.
    pub fn satisfies<M: InterfaceMesh + ?Sized>(&self, mesh: &M, predicate: &Predicate) -> bool {
        match self {
            AnySimplex::Vertex(v) => predicate.eval(mesh, v),
            AnySimplex::Edge(e) => predicate.eval(mesh, e),
            AnySimplex::Triangle(t) => predicate.eval(mesh, t),
        }
    }

    /// The simplices of dimension `dim` in `set`, in canonical order.
    pub fn collect(set: &SimplexSet, dim: u8) -> Vec<AnySimplex> {
        match dim {
            0 => set.vertices().map(|v| AnySimplex::Vertex(*v)).collect(),
            1 => set.edges().map(|e| AnySimplex::Edge(*e)).collect(),
            2 => set.triangles().map(|t| AnySimplex::Triangle(*t)).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Simplex0> for AnySimplex {
    fn from(v: Simplex0) -> Self {
        AnySimplex::Vertex(v)
    }
}

impl From<Simplex1> for AnySimplex {
    fn from(e: Simplex1) -> Self {
        AnySimplex::Edge(e)
    }
}

impl From<Simplex2> for AnySimplex {
    fn from(t: Simplex2) -> Self {
        AnySimplex::Triangle(t)
    }
}
