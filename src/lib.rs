#![cfg_attr(docsrs, feature(doc_cfg))]
//! # grit-remesh
//!
//! grit-remesh is a label-aware adaptive remeshing engine for 2D triangle
//! meshes that track several material phases sharing a common interface.
//! Each triangle carries a phase label; vertices carry one value per
//! adjacent phase for every named attribute, so fields stay discontinuous
//! across the interface while the mesh is refined, coarsened, flipped,
//! smoothed and moved.
//!
//! ## Features
//! - Canonical simplex identifiers and sorted `SimplexSet` algebra
//! - A label-multiplexed attribute store with target positions
//! - Quality measures, mesh operations and attribute assignments tied
//!   together by `Batch`
//! - A fixed remeshing pipeline with CFL-limited vertex motion
//! - Slab domain decomposition with one rayon task per subdomain
//!
//! ## Usage
//!
//! ```no_run
//! use grit_remesh::prelude::*;
//!
//! let mut parameters = Parameters::default();
//! parameters.add_label_pair(1, 1);
//! parameters
//!     .set_max_iterations("scheduler", 0, 1)
//!     .set_max_iterations("refinement", 1, 2)
//!     .set_lower_threshold("refinement", 1, 0.5)
//!     .set_upper_threshold("refinement", 1, f64::MAX);
//!
//! let points = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
//! let mut engine = Engine2D::init_with_mesh(&points, &[[0, 1, 2]], &[1], &parameters)?;
//! engine.update(&parameters)?;
//! # Ok::<(), RemeshError>(())
//! ```
//!
//! ## Determinism
//!
//! Every collection that drives iteration order is sorted on the canonical
//! simplex order, so a run is reproducible for a given input and parameter
//! set. Tests that need noise use fixed `SmallRng` seeds.

pub mod algs;
pub mod data;
pub mod engine;
pub mod geometry;
pub mod mesh_error;
pub mod operations;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::{
        Algorithm, CountMonitor, DefaultAlgorithm, DomainManager, EmptyAlgorithm, Monitor,
        MoveMonitor, Scheduler, SlabDecomposition, Subdomain,
    };
    pub use crate::data::{Attributes, OperationSettings, Parameters};
    pub use crate::engine::Engine2D;
    pub use crate::geometry::Vec2;
    pub use crate::mesh_error::RemeshError;
    pub use crate::operations::{
        AnySimplex, AttributeAssignment, Batch, MeasureKind, MeshOperation, OperationKind,
        QualityMeasure,
    };
    pub use crate::topology::{
        InterfaceMesh, Neighbors, Phase, Predicate, Simplex0, Simplex1, Simplex2, SimplexSet,
        TriangleMesh, filter,
    };
}
