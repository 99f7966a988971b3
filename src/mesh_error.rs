//! RemeshError: unified error type for the remeshing engine.
//!
//! Configuration mistakes and invalid input meshes surface here. Local
//! geometric failures (an operation that would invert a triangle) are not
//! errors; operations report them by declining to apply.

use thiserror::Error;

use crate::topology::simplex::{Simplex0, Simplex1, Simplex2};

/// Unified error type for grit-remesh operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RemeshError {
    /// `create_attribute` was called twice for the same name and dimension.
    #[error("attribute `{name}` already exists for dimension {dimension}")]
    DuplicateAttribute { name: String, dimension: u8 },
    /// A named attribute was read or written before being created.
    #[error("attribute `{name}` does not exist for dimension {dimension}")]
    MissingAttribute { name: String, dimension: u8 },
    /// A vertex attribute was addressed through a label the vertex does not carry.
    #[error("label {label} is not assigned to vertex {vertex}")]
    MissingLabel { vertex: Simplex0, label: u32 },
    /// An edge attribute has no value stored for the edge.
    #[error("attribute `{name}` has no value for edge {simplex:?}")]
    MissingEdgeValue { name: String, simplex: Simplex1 },
    /// A face attribute has no value stored for the triangle.
    #[error("attribute `{name}` has no value for triangle {simplex:?}")]
    MissingFaceValue { name: String, simplex: Simplex2 },
    /// Bulk transfer where the number of values does not match the number of simplices.
    #[error("size mismatch for `{what}`: expected {expected}, got {found}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// Simplex dimension outside `0..=2`.
    #[error("invalid simplex dimension {0}")]
    InvalidDimension(u8),
    /// A phase view carrying zero or several labels was used where exactly one is required.
    #[error("phase carries {0} labels, expected exactly one")]
    AmbiguousPhase(usize),
    /// Parameter table failed validation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// Triangle referencing a vertex that is not in the mesh.
    #[error("triangle references unknown vertex {0}")]
    UnknownVertex(Simplex0),
    /// Triangle with repeated or unassigned vertex indices.
    #[error("degenerate triangle {0:?}")]
    InvalidTriangle(Simplex2),
    /// Input mesh is not a 2-manifold.
    #[error("input mesh is not a manifold")]
    NonManifoldInput,
    /// Input mesh contains ear triangles while `no_ears` is enabled.
    #[error("input mesh has ears")]
    InputHasEars,
    /// Input mesh contains collapsed or inverted triangles.
    #[error("input mesh contains collapsed or inverted triangles")]
    InvertedInput,
    /// Input mesh boundary is not a single closed loop.
    #[error("input mesh contains holes")]
    InputHasHoles,
    /// Input mesh has several vertices closer than the configured threshold.
    #[error("input mesh contains multiple vertices with the same coordinates")]
    CoincidentVertices,
    /// Operation requires at least one triangle.
    #[error("mesh does not contain any triangles")]
    EmptyMesh,
    /// Slab decomposition would produce a slab with no triangles.
    #[error("cannot split {triangles} triangles into {subdomains} subdomains")]
    EmptySubdomain { triangles: usize, subdomains: usize },
}
