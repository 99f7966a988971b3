//! Phase-level views of a labelled mesh.
//!
//! `compute_*` return `SimplexSet`s in global vertex numbering. [`Phase`]
//! repacks such a set into dense local numbering (vertex `i` of the phase is
//! `phase.vertices[i]` in the mesh) so that simulators can work on plain
//! index arrays and hand results back through `data::sub_range`.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::mesh_error::RemeshError;
use crate::topology::mesh::InterfaceMesh;
use crate::topology::predicates::{Predicate, filter};
use crate::topology::simplex::Simplex0;
use crate::topology::simplex_set::SimplexSet;

/// Closure of every triangle labelled `label`.
pub fn compute_phase<M: InterfaceMesh + ?Sized>(mesh: &M, label: u32) -> SimplexSet {
    let all = mesh.get_all_simplices();
    let triangles = filter(
        &all,
        mesh,
        &(Predicate::IsDimension(2) & Predicate::InPhase(label)),
    );
    mesh.closure(&triangles)
}

/// Interface vertices and edges of `set`.
pub fn compute_interface<M: InterfaceMesh + ?Sized>(mesh: &M, set: &SimplexSet) -> SimplexSet {
    filter(
        set,
        mesh,
        &(Predicate::vertices_or_edges() & Predicate::IsInterface),
    )
}

/// Boundary vertices and edges of `set`.
pub fn compute_boundary<M: InterfaceMesh + ?Sized>(mesh: &M, set: &SimplexSet) -> SimplexSet {
    filter(
        set,
        mesh,
        &(Predicate::vertices_or_edges() & Predicate::IsBoundary),
    )
}

/// Distinct triangle labels of the mesh in ascending order.
pub fn compute_phase_labels<M: InterfaceMesh + ?Sized>(mesh: &M) -> Vec<u32> {
    mesh.get_all_simplices()
        .triangles()
        .filter_map(|t| mesh.label(t))
        .sorted_unstable()
        .dedup()
        .collect()
}

/// Renames triangle labels `old_labels[i]` to `new_labels[i]`.
pub fn relabel_phase<M: InterfaceMesh>(
    mesh: &mut M,
    old_labels: &[u32],
    new_labels: &[u32],
) -> Result<(), RemeshError> {
    if old_labels.len() != new_labels.len() {
        return Err(RemeshError::SizeMismatch {
            what: "relabel table",
            expected: old_labels.len(),
            found: new_labels.len(),
        });
    }
    let all = mesh.get_all_simplices();
    for t in all.triangles() {
        let Some(current) = mesh.label(t) else {
            continue;
        };
        if let Some(i) = old_labels.iter().position(|&l| l == current) {
            mesh.set_label(t, new_labels[i])?;
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Phase
// -----------------------------------------------------------------------------

/// A set of simplices re-indexed into dense local vertex numbering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Phase {
    /// Distinct labels of the phase's triangles, ascending.
    pub labels: Vec<u32>,
    /// Local to global vertex map.
    pub vertices: Vec<Simplex0>,
    /// Global to local vertex map.
    pub indices: BTreeMap<Simplex0, usize>,
    /// Edges in local numbering.
    pub edges: Vec<[usize; 2]>,
    /// Triangles in local numbering, stored orientation.
    pub triangles: Vec<[usize; 3]>,
}

impl Phase {
    pub fn local_index(&self, global: Simplex0) -> Option<usize> {
        self.indices.get(&global).copied()
    }

    /// The single label a vertex-valued transfer uses.
    pub fn single_label(&self) -> Result<u32, RemeshError> {
        match self.labels.as_slice() {
            [label] => Ok(*label),
            other => Err(RemeshError::AmbiguousPhase(other.len())),
        }
    }
}

/// Packs the valid simplices of `domain` into a [`Phase`].
///
/// Edges and triangles whose vertices are not in `domain` are skipped.
pub fn make_phase<M: InterfaceMesh + ?Sized>(mesh: &M, domain: &SimplexSet) -> Phase {
    let mut phase = Phase::default();
    for v in domain.vertices().filter(|v| mesh.is_valid_vertex(**v)) {
        phase.indices.insert(*v, phase.vertices.len());
        phase.vertices.push(*v);
    }
    for e in domain.edges().filter(|e| mesh.is_valid_edge(e)) {
        if let (Some(i), Some(j)) = (phase.local_index(e.v0()), phase.local_index(e.v1())) {
            phase.edges.push([i, j]);
        }
    }
    for t in domain.triangles() {
        let Some(stored) = mesh.oriented(t) else {
            continue;
        };
        let [a, b, c] = stored.vertices();
        if let (Some(i), Some(j), Some(k)) = (
            phase.local_index(a),
            phase.local_index(b),
            phase.local_index(c),
        ) {
            phase.triangles.push([i, j, k]);
            if let Some(label) = mesh.label(&stored) {
                phase.labels.push(label);
            }
        }
    }
    phase.labels.sort_unstable();
    phase.labels.dedup();
    phase
}

/// Phase of all triangles labelled `label` (empty if the label is absent).
pub fn make_phase_of_label<M: InterfaceMesh + ?Sized>(mesh: &M, label: u32) -> Phase {
    make_phase(mesh, &compute_phase(mesh, label))
}

/// The whole mesh as one phase.
pub fn make_whole_phase<M: InterfaceMesh + ?Sized>(mesh: &M) -> Phase {
    make_phase(mesh, &mesh.get_all_simplices())
}

/// Interface vertices and edges of phase `label`, tagged with that label.
pub fn make_boundary_of_phase<M: InterfaceMesh + ?Sized>(mesh: &M, label: u32) -> Phase {
    let interface = compute_interface(mesh, &compute_phase(mesh, label));
    let mut phase = make_phase(mesh, &interface);
    phase.labels = vec![label];
    phase
}
