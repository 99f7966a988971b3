//! `Engine2D`: the single entry point owning the mesh, its attributes and
//! the scheduler that remeshes them.

use log::error;

use crate::algs::default_algorithm::{Algorithm, DefaultAlgorithm};
use crate::algs::scheduler::Scheduler;
use crate::data::attributes::Attributes;
use crate::data::parameters::Parameters;
use crate::geometry::checks::{
    has_ear, has_multiple_vertices, has_simple_boundary, is_any_inverted, is_manifold, make_unit,
};
use crate::geometry::primitives::Vec2;
use crate::mesh_error::RemeshError;
use crate::topology::mesh::{InterfaceMesh, TriangleMesh, orient_ccw};
use crate::topology::phase::relabel_phase;
use crate::topology::predicates::{Predicate, filter};
use crate::topology::simplex::{Index, Simplex2};

#[derive(Clone, Debug)]
pub struct Engine2D<A: Algorithm = DefaultAlgorithm> {
    mesh: TriangleMesh,
    attributes: Attributes,
    scheduler: Scheduler<A>,
}

impl Default for Engine2D<DefaultAlgorithm> {
    fn default() -> Self {
        Engine2D {
            mesh: TriangleMesh::new(),
            attributes: Attributes::new(),
            scheduler: Scheduler::default(),
        }
    }
}

/// Gives every vertex the non-ambient labels of the triangles around it,
/// dropping whatever labels and values it carried before.
pub fn initialize_vertex_labels(mesh: &TriangleMesh, parameters: &Parameters, attrs: &mut Attributes) {
    for v in mesh.vertices() {
        let star = mesh.star_vertex(v);
        attrs.clear_simplex0_labels(v);
        for &label in &parameters.labels {
            if parameters.use_ambient && label == parameters.ambient_label {
                continue;
            }
            let phase = filter(&star, mesh, &(Predicate::IsDimension(2) & Predicate::InPhase(label)));
            if phase.size(2) > 0 {
                attrs.add_simplex0_label(v, label);
            }
        }
    }
}

fn reject(err: RemeshError) -> Result<(), RemeshError> {
    error!("init_with_mesh: {err}");
    Err(err)
}

impl Engine2D<DefaultAlgorithm> {
    /// Builds an engine from raw points, triangles and per-triangle input
    /// labels.
    ///
    /// Triangles are reoriented counter-clockwise, input labels are mapped
    /// onto `parameters.labels`, vertex labels are derived from the
    /// surrounding phases and the mesh is validated. Any validation failure
    /// is fatal.
    pub fn init_with_mesh(
        points: &[Vec2],
        triangles: &[[Index; 3]],
        labels: &[u32],
        parameters: &Parameters,
    ) -> Result<Self, RemeshError> {
        Self::init_with_algorithm(DefaultAlgorithm::new(), points, triangles, labels, parameters)
    }
}

impl<A: Algorithm> Engine2D<A> {
    /// Same as [`Engine2D::init_with_mesh`] with a custom per-subdomain algorithm.
    pub fn init_with_algorithm(
        algorithm: A,
        points: &[Vec2],
        triangles: &[[Index; 3]],
        labels: &[u32],
        parameters: &Parameters,
    ) -> Result<Self, RemeshError> {
        parameters.validate()?;
        if triangles.len() != labels.len() {
            return Err(RemeshError::SizeMismatch {
                what: "triangle labels",
                expected: triangles.len(),
                found: labels.len(),
            });
        }

        let mut attributes = Attributes::with_positions(points.to_vec());
        let mut mesh = TriangleMesh::new();
        for _ in points {
            mesh.insert_vertex();
        }
        for (&[a, b, c], &label) in triangles.iter().zip(labels) {
            let t = orient_ccw(Simplex2::new(a, b, c), |v| attributes.get_current_value(v));
            mesh.insert_triangle(t, label)?;
        }

        relabel_phase(&mut mesh, &parameters.input_labels, &parameters.labels)?;
        initialize_vertex_labels(&mesh, parameters, &mut attributes);
        if parameters.make_unit {
            make_unit(&mesh, &mut attributes);
        }

        let all = mesh.get_all_simplices();
        if parameters.use_manifold && !is_manifold(&mesh) {
            reject(RemeshError::NonManifoldInput)?;
        }
        if parameters.no_ears && has_ear(&mesh) {
            reject(RemeshError::InputHasEars)?;
        }
        if is_any_inverted(&all, &attributes, 0.0) {
            reject(RemeshError::InvertedInput)?;
        }
        if parameters.use_simple_boundary && !has_simple_boundary(&mesh) {
            reject(RemeshError::InputHasHoles)?;
        }
        if parameters.no_multiple_vertices
            && has_multiple_vertices(&all, &attributes, parameters.multiple_vertices_threshold)
        {
            reject(RemeshError::CoincidentVertices)?;
        }

        Ok(Engine2D {
            mesh,
            attributes,
            scheduler: Scheduler::new(algorithm),
        })
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Mesh and attributes together, for callers that edit both.
    pub fn parts_mut(&mut self) -> (&mut TriangleMesh, &mut Attributes) {
        (&mut self.mesh, &mut self.attributes)
    }

    pub fn scheduler(&self) -> &Scheduler<A> {
        &self.scheduler
    }

    /// One remeshing pass; returns the number of operations applied.
    pub fn update(&mut self, parameters: &Parameters) -> Result<usize, RemeshError> {
        self.scheduler
            .run(&mut self.mesh, &mut self.attributes, parameters)
    }
}
