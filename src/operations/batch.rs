//! `Batch`: one bounded-iteration pass of a single operation over the
//! qualifying simplices of each label.

use std::time::Instant;

use log::{debug, info};

use crate::data::attributes::Attributes;
use crate::data::parameters::Parameters;
use crate::mesh_error::RemeshError;
use crate::operations::AnySimplex;
use crate::operations::assignment::AttributeAssignment;
use crate::operations::mesh_ops::{MeshOperation, OperationKind, Plan};
use crate::operations::quality::{MeasureKind, QualityMeasure};
use crate::topology::mesh::{InterfaceMesh, TriangleMesh};
use crate::topology::phase::compute_phase;
use crate::topology::predicates::Predicate;

/// An operation name bound to its eligibility condition, quality measure,
/// mesh operation and attribute assignment.
///
/// Settings are read from [`Parameters`] under `name` for every label the
/// batch runs on.
#[derive(Clone, Debug)]
pub struct Batch {
    pub name: &'static str,
    pub condition: Predicate,
    pub measure: MeasureKind,
    pub operation: OperationKind,
    pub assignment: AttributeAssignment,
}

impl Batch {
    pub fn new(
        name: &'static str,
        condition: Predicate,
        measure: MeasureKind,
        operation: OperationKind,
        assignment: AttributeAssignment,
    ) -> Self {
        Batch {
            name,
            condition,
            measure,
            operation,
            assignment,
        }
    }

    /// Runs `max_iterations(name, label)` rounds for each label and returns
    /// the number of operations applied. Zero means a fixed point.
    pub fn run(
        &self,
        mesh: &mut TriangleMesh,
        attrs: &mut Attributes,
        parameters: &Parameters,
        labels: &[u32],
    ) -> Result<usize, RemeshError> {
        let chatty = parameters.verbose && !parameters.silent_threads;
        let started = parameters.profiling.then(Instant::now);
        if chatty {
            info!("BATCH: {}", self.name);
        }

        let mut operations_done = 0usize;
        for &label in labels {
            for _ in 0..parameters.get_max_iterations(self.name, label) {
                let measure = QualityMeasure::new(self.measure, self.name, label, parameters);
                let mut operation = MeshOperation::new(self.operation, self.name, label, parameters);
                operations_done += do_operations(
                    mesh,
                    attrs,
                    parameters,
                    label,
                    &measure,
                    &mut operation,
                    &self.condition,
                    self.assignment,
                )?;
            }
        }

        if chatty {
            info!("leaving BATCH: {} ({operations_done} operations)", self.name);
        }
        if let Some(started) = started {
            debug!("{} took {:?}", self.name, started.elapsed());
        }
        Ok(operations_done)
    }
}

/// One round over the phase of `label`: every simplex of the operation's
/// dimension that is still valid, bad and satisfies `condition` is handed to
/// the operation. In-place updates are tried first; otherwise a planned
/// change is assigned attributes and committed to the mesh.
#[allow(clippy::too_many_arguments)]
pub fn do_operations(
    mesh: &mut TriangleMesh,
    attrs: &mut Attributes,
    parameters: &Parameters,
    label: u32,
    measure: &QualityMeasure,
    operation: &mut MeshOperation,
    condition: &Predicate,
    assignment: AttributeAssignment,
) -> Result<usize, RemeshError> {
    let phase = compute_phase(&*mesh, label);
    operation.init(mesh, attrs);

    let mut operations_done = 0usize;
    for s in AnySimplex::collect(&phase, operation.dimension()) {
        if !s.is_valid(&*mesh) || !measure.is_bad(s, &*mesh, attrs) || !s.satisfies(&*mesh, condition)
        {
            continue;
        }
        if operation.update(s, mesh, attrs)? {
            operations_done += 1;
            continue;
        }
        let Some(Plan {
            new,
            old,
            simplex1_lut,
            simplex2_lut,
        }) = operation.plan(s, mesh, attrs)
        else {
            continue;
        };
        attrs.insert(&new);
        assignment.assign(&new, &old, mesh, parameters, attrs, &simplex1_lut, &simplex2_lut)?;
        let positions = &*attrs;
        mesh.replace(&old, &new, &simplex2_lut, parameters, |v| {
            positions.get_current_value(v)
        })?;
        attrs.remove(&old);
        operations_done += 1;
    }
    Ok(operations_done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::Vec2;
    use crate::topology::simplex::Simplex1;

    #[test]
    fn refinement_splits_the_long_edge() {
        let mut mesh = TriangleMesh::from_triangles(3, &[[0, 1, 2]], &[1]).unwrap();
        let mut attrs = Attributes::with_positions(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.5),
        ]);
        for v in 0..3 {
            attrs.add_simplex0_label(crate::topology::simplex::Simplex0::new(v), 1);
        }
        let mut p = Parameters::default();
        p.set_max_iterations("refinement", 1, 1)
            .set_lower_threshold("refinement", 1, 1.5)
            .set_upper_threshold("refinement", 1, 1e9);
        let batch = Batch::new(
            "refinement",
            Predicate::Bool(true),
            MeasureKind::EdgeLength,
            OperationKind::EdgeSplit,
            AttributeAssignment::EdgeSplit,
        );
        let done = batch.run(&mut mesh, &mut attrs, &p, &[1]).unwrap();
        assert_eq!(done, 1);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.is_valid_edge(&Simplex1::new(0, 1)));
        assert!(mesh.triangles().all(|(_, label)| label == 1));
    }

    #[test]
    fn zero_iterations_do_nothing() {
        let mut mesh = TriangleMesh::from_triangles(3, &[[0, 1, 2]], &[1]).unwrap();
        let mut attrs = Attributes::with_positions(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.5),
        ]);
        let batch = Batch::new(
            "refinement",
            Predicate::Bool(true),
            MeasureKind::AlwaysBad,
            OperationKind::EdgeSplit,
            AttributeAssignment::EdgeSplit,
        );
        let done = batch
            .run(&mut mesh, &mut attrs, &Parameters::default(), &[1])
            .unwrap();
        assert_eq!(done, 0);
        assert_eq!(mesh.triangle_count(), 1);
    }
}
