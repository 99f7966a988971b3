//! The fixed remeshing pipeline run on every (sub)mesh.
//!
//! 1. refine non-interface and interface edges, split non-manifold
//!    interface vertices;
//! 2. alternate mesh improvement with CFL-limited motion until the
//!    [`MoveMonitor`] is satisfied;
//! 3. merge thin phases and coarsen;
//! 4. a final mesh improvement.
//!
//! Mesh improvement is Delaunay flipping, then bulk Laplacian smoothing,
//! then interface smoothing.

use log::info;

use crate::algs::monitor::{Monitor, MoveMonitor};
use crate::data::attributes::Attributes;
use crate::data::parameters::Parameters;
use crate::mesh_error::RemeshError;
use crate::operations::{AttributeAssignment, Batch, MeasureKind, OperationKind};
use crate::topology::mesh::TriangleMesh;
use crate::topology::predicates::Predicate;

/// Anything the scheduler can run on one subdomain.
pub trait Algorithm: Send + Sync {
    /// Runs on `mesh` for the given phase labels and returns the number of
    /// operations applied.
    fn run(
        &self,
        mesh: &mut TriangleMesh,
        attrs: &mut Attributes,
        parameters: &Parameters,
        labels: &[u32],
    ) -> Result<usize, RemeshError>;
}

/// Does nothing; handy for exercising decomposition alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyAlgorithm;

impl Algorithm for EmptyAlgorithm {
    fn run(
        &self,
        _mesh: &mut TriangleMesh,
        _attrs: &mut Attributes,
        _parameters: &Parameters,
        _labels: &[u32],
    ) -> Result<usize, RemeshError> {
        Ok(0)
    }
}

#[derive(Clone, Debug)]
pub struct DefaultAlgorithm {
    refinement: Batch,
    interface_refinement: Batch,
    vertex_split: Batch,
    motion: Batch,
    merge: Batch,
    smoothing: Batch,
    merge_edge_collapse: Batch,
    coarsening: Batch,
    interface_coarsening: Batch,
    ear_removal: Batch,
    optimization: Batch,
    interface_smoothing: Batch,
}

impl Default for DefaultAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultAlgorithm {
    pub fn new() -> Self {
        use AttributeAssignment as A;
        use MeasureKind as Q;
        use OperationKind as Op;

        let bulk = || !Predicate::IsInterface;
        let interface = || Predicate::IsInterface;
        let any = || Predicate::Bool(true);

        DefaultAlgorithm {
            refinement: Batch::new("refinement", bulk(), Q::EdgeLength, Op::EdgeSplit, A::EdgeSplit),
            interface_refinement: Batch::new(
                "interface_refinement",
                interface(),
                Q::EdgeLength,
                Op::EdgeSplit,
                A::EdgeSplit,
            ),
            vertex_split: Batch::new(
                "vertex_split",
                interface(),
                Q::VertexSplit,
                Op::VertexSplit,
                A::VertexSplit,
            ),
            motion: Batch::new("move", any(), Q::AlwaysBad, Op::Move, A::Empty),
            merge: Batch::new("merge", any(), Q::Merge, Op::Merge, A::Merge),
            smoothing: Batch::new(
                "smoothing",
                bulk(),
                Q::AlwaysBad,
                Op::LaplacianSmoothing,
                A::Empty,
            ),
            // shares the "merge" settings
            merge_edge_collapse: Batch::new(
                "merge",
                any(),
                Q::MergeEdgeCollapse,
                Op::EdgeCollapse,
                A::EdgeCollapse,
            ),
            coarsening: Batch::new(
                "coarsening",
                bulk(),
                Q::EdgeLength,
                Op::InterfacePreservingEdgeCollapse,
                A::Copy,
            ),
            interface_coarsening: Batch::new(
                "interface_coarsening",
                interface(),
                Q::EdgeLength,
                Op::InterfacePreservingEdgeCollapse,
                A::Copy,
            ),
            ear_removal: Batch::new("ear_removal", bulk(), Q::NoEars, Op::EdgeSplit, A::EdgeSplit),
            optimization: Batch::new("optimization", bulk(), Q::Delaunay, Op::EdgeFlip, A::Copy),
            interface_smoothing: Batch::new(
                "interface_smoothing",
                interface(),
                Q::InterfaceFlatness,
                Op::SmoothingInterface,
                A::Empty,
            ),
        }
    }

    /// Flips, bulk smoothing and interface smoothing, in that order.
    pub fn mesh_improvement(
        &self,
        mesh: &mut TriangleMesh,
        attrs: &mut Attributes,
        parameters: &Parameters,
        labels: &[u32],
    ) -> Result<usize, RemeshError> {
        let mut done = self.optimization.run(mesh, attrs, parameters, labels)?;
        done += self.smoothing.run(mesh, attrs, parameters, labels)?;
        done += self.interface_smoothing.run(mesh, attrs, parameters, labels)?;
        Ok(done)
    }
}

impl Algorithm for DefaultAlgorithm {
    fn run(
        &self,
        mesh: &mut TriangleMesh,
        attrs: &mut Attributes,
        parameters: &Parameters,
        labels: &[u32],
    ) -> Result<usize, RemeshError> {
        if parameters.verbose && !parameters.silent_threads {
            info!("DefaultAlgorithm on labels {labels:?}");
        }

        let mut done = self.refinement.run(mesh, attrs, parameters, labels)?;
        done += self.interface_refinement.run(mesh, attrs, parameters, labels)?;
        done += self.vertex_split.run(mesh, attrs, parameters, labels)?;

        let mut monitor = MoveMonitor::new(mesh, attrs, parameters)?;
        monitor.init(parameters);
        loop {
            done += self.mesh_improvement(mesh, attrs, parameters, labels)?;
            monitor.update(mesh, attrs, parameters)?;
            done += self.motion.run(mesh, attrs, parameters, labels)?;
            done += self.mesh_improvement(mesh, attrs, parameters, labels)?;
            if !monitor.next() {
                break;
            }
        }

        done += self.merge.run(mesh, attrs, parameters, labels)?;
        done += self.smoothing.run(mesh, attrs, parameters, labels)?;
        done += self.merge_edge_collapse.run(mesh, attrs, parameters, labels)?;
        done += self.coarsening.run(mesh, attrs, parameters, labels)?;
        done += self.interface_coarsening.run(mesh, attrs, parameters, labels)?;
        if parameters.no_ears {
            done += self.ear_removal.run(mesh, attrs, parameters, labels)?;
        }

        done += self.mesh_improvement(mesh, attrs, parameters, labels)?;
        Ok(done)
    }
}
