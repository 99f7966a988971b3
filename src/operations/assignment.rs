//! Attribute assignment: how a planned change hands attribute values from
//! the simplices it removes to the simplices it creates.
//!
//! Assignment runs after planning and before the mesh commits the change,
//! so stars and labels are still those of the old mesh.

use std::collections::BTreeSet;

use crate::data::attributes::Attributes;
use crate::data::parameters::Parameters;
use crate::geometry::checks::{compute_midpoint, compute_offset_position};
use crate::geometry::primitives::barycentric_edge;
use crate::mesh_error::RemeshError;
use crate::topology::mesh::{InterfaceMesh, ParentLut, TriangleMesh};
use crate::topology::simplex::{Simplex0, Simplex1, Simplex2};
use crate::topology::simplex_set::{SimplexSet, difference, intersection};

/// Attribute assignment selector used to configure a batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttributeAssignment {
    /// Nothing to hand over (in-place operations).
    Empty,
    /// Copy edge and face values from parents.
    Copy,
    EdgeSplit,
    EdgeCollapse,
    Merge,
    VertexSplit,
}

/// How the label set of a surviving vertex changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSets {
    /// Labels the vertex gains.
    pub new: BTreeSet<u32>,
    /// Labels the vertex loses.
    pub removed: BTreeSet<u32>,
    /// Labels present on both sides; their values are averaged.
    pub interpolated: BTreeSet<u32>,
}

impl LabelSets {
    /// `included` labels arrive with the change, `excluded` labels leave
    /// with it, `kept` labels stay around the vertex regardless.
    pub fn compute(
        included: &BTreeSet<u32>,
        excluded: &BTreeSet<u32>,
        kept: &BTreeSet<u32>,
    ) -> Self {
        LabelSets {
            new: included.difference(kept).copied().collect(),
            removed: excluded.difference(kept).copied().collect(),
            interpolated: included.intersection(kept).copied().collect(),
        }
    }
}

/// Labels of the triangles of `set`, without the ambient label when it is in use.
pub fn compute_all_nonambient_labels<M: InterfaceMesh + ?Sized>(
    set: &SimplexSet,
    mesh: &M,
    parameters: &Parameters,
) -> BTreeSet<u32> {
    set.triangles()
        .filter_map(|t| mesh.label(t))
        .filter(|&l| !(parameters.use_ambient && l == parameters.ambient_label))
        .collect()
}

impl AttributeAssignment {
    #[allow(clippy::too_many_arguments)]
    pub fn assign(
        &self,
        new: &SimplexSet,
        old: &SimplexSet,
        mesh: &TriangleMesh,
        parameters: &Parameters,
        attrs: &mut Attributes,
        simplex1_lut: &ParentLut<Simplex1>,
        simplex2_lut: &ParentLut<Simplex2>,
    ) -> Result<(), RemeshError> {
        match self {
            AttributeAssignment::Empty => return Ok(()),
            AttributeAssignment::Copy => {}
            AttributeAssignment::EdgeSplit => assign_edge_split(new, old, mesh, parameters, attrs)?,
            AttributeAssignment::EdgeCollapse => {
                assign_edge_collapse(new, old, mesh, parameters, attrs)?
            }
            AttributeAssignment::Merge => {
                assign_merge(new, old, mesh, parameters, attrs, simplex2_lut)?
            }
            AttributeAssignment::VertexSplit => assign_vertex_split(new, old, mesh, parameters, attrs)?,
        }
        copy_edge_values(new, attrs, simplex1_lut)?;
        copy_face_values(new, attrs, simplex2_lut)
    }
}

fn copy_edge_values(
    new: &SimplexSet,
    attrs: &mut Attributes,
    lut: &ParentLut<Simplex1>,
) -> Result<(), RemeshError> {
    let names = attrs.attribute_names(1).to_vec();
    for e in new.edges() {
        let Some(parent) = lut.get(e) else {
            continue;
        };
        for name in &names {
            if attrs.exist_edge_value(name, parent) {
                let value = attrs.get_edge_attribute(name, parent)?;
                attrs.set_edge_attribute(name, e, value)?;
            }
        }
    }
    Ok(())
}

fn copy_face_values(
    new: &SimplexSet,
    attrs: &mut Attributes,
    lut: &ParentLut<Simplex2>,
) -> Result<(), RemeshError> {
    let names = attrs.attribute_names(2).to_vec();
    for t in new.triangles() {
        let Some(parent) = lut.get(t) else {
            continue;
        };
        for name in &names {
            if attrs.exist_face_value(name, parent) {
                let value = attrs.get_face_attribute(name, parent)?;
                attrs.set_face_attribute(name, t, value)?;
            }
        }
    }
    Ok(())
}

fn plan_shape(what: &'static str, expected: usize, found: usize) -> RemeshError {
    RemeshError::SizeMismatch {
        what,
        expected,
        found,
    }
}

fn assign_edge_split(
    new: &SimplexSet,
    old: &SimplexSet,
    mesh: &TriangleMesh,
    parameters: &Parameters,
    attrs: &mut Attributes,
) -> Result<(), RemeshError> {
    let (Some(edge), Some(vertex)) = (old.first_edge(), new.first_vertex()) else {
        return Err(plan_shape("edge split vertices", 1, new.size(0)));
    };
    let labels = compute_all_nonambient_labels(&mesh.star_edge(&edge), mesh, parameters);
    let [v1, v2] = edge.vertices();
    attrs.set_current_value(vertex, compute_midpoint(v1, v2, attrs));

    // ambient vertices still need an (empty) label list
    attrs.clear_simplex0_labels(vertex);
    let names = attrs.attribute_names(0).to_vec();
    for label in labels {
        attrs.add_simplex0_label(vertex, label);
        for name in &names {
            let value = 0.5
                * (attrs.get_vertex_attribute(name, v1, label)?
                    + attrs.get_vertex_attribute(name, v2, label)?);
            attrs.set_vertex_attribute(name, vertex, label, value)?;
        }
    }
    Ok(())
}

fn assign_edge_collapse(
    new: &SimplexSet,
    old: &SimplexSet,
    mesh: &TriangleMesh,
    parameters: &Parameters,
    attrs: &mut Attributes,
) -> Result<(), RemeshError> {
    // `to` survives, `from` is removed with its whole star
    let (Some(to), Some(from)) = (new.first_vertex(), old.first_vertex()) else {
        return Err(plan_shape("edge collapse vertices", 1, new.size(0)));
    };
    let star_to = mesh.star_vertex(to);
    let shared = intersection(&star_to, old);
    let only_to = difference(&star_to, &shared);
    let only_from = difference(old, &shared);
    let kept = compute_all_nonambient_labels(&only_to, mesh, parameters);
    let arriving = compute_all_nonambient_labels(&only_from, mesh, parameters);
    let leaving = compute_all_nonambient_labels(&shared, mesh, parameters);
    let sets = LabelSets::compute(&arriving, &leaving, &kept);
    transfer_labels(to, &sets, attrs, |attrs, name, label| {
        attrs.get_vertex_attribute(name, from, label)
    })
}

fn assign_merge(
    new: &SimplexSet,
    old: &SimplexSet,
    mesh: &TriangleMesh,
    parameters: &Parameters,
    attrs: &mut Attributes,
    simplex2_lut: &ParentLut<Simplex2>,
) -> Result<(), RemeshError> {
    let (Some(apex), Some(edge)) = (new.first_vertex(), old.first_edge()) else {
        return Err(plan_shape("merge apex", 1, new.size(0)));
    };
    let Some(parent) = new.first_triangle().and_then(|t| simplex2_lut.get(&t)).copied() else {
        return Err(plan_shape("merge parents", 2, simplex2_lut.len()));
    };
    let Some(removed) = old.triangles().find(|t| **t != parent).copied() else {
        return Err(plan_shape("merge triangles", 2, old.size(2)));
    };
    let [v1, v2] = edge.vertices();
    let (w1, w2) = barycentric_edge(
        attrs.get_current_value(v1),
        attrs.get_current_value(v2),
        attrs.get_current_value(apex),
    );

    let remaining = difference(&mesh.star_vertex(apex), old);
    let kept = compute_all_nonambient_labels(&remaining, mesh, parameters);
    let arriving = compute_all_nonambient_labels(&SimplexSet::from(parent), mesh, parameters);
    let leaving = compute_all_nonambient_labels(&SimplexSet::from(removed), mesh, parameters);
    let sets = LabelSets::compute(&arriving, &leaving, &kept);
    transfer_labels(apex, &sets, attrs, |attrs, name, label| {
        Ok(w1 * attrs.get_vertex_attribute(name, v1, label)?
            + w2 * attrs.get_vertex_attribute(name, v2, label)?)
    })
}

/// Applies `sets` to `vertex`: drops removed labels, adds new labels with
/// the incoming value and averages interpolated labels with it.
fn transfer_labels<F>(
    vertex: Simplex0,
    sets: &LabelSets,
    attrs: &mut Attributes,
    incoming: F,
) -> Result<(), RemeshError>
where
    F: Fn(&Attributes, &str, u32) -> Result<f64, RemeshError>,
{
    // removal first: a label can be both removed and re-added
    for &label in &sets.removed {
        attrs.erase_simplex0_label(vertex, label);
    }
    let names = attrs.attribute_names(0).to_vec();
    for &label in &sets.new {
        let values = names
            .iter()
            .map(|name| incoming(&*attrs, name, label))
            .collect::<Result<Vec<_>, _>>()?;
        attrs.add_simplex0_label(vertex, label);
        for (name, value) in names.iter().zip(values) {
            attrs.set_vertex_attribute(name, vertex, label, value)?;
        }
    }
    for &label in &sets.interpolated {
        for name in &names {
            let other = incoming(&*attrs, name, label)?;
            let own = attrs.get_vertex_attribute(name, vertex, label)?;
            attrs.set_vertex_attribute(name, vertex, label, 0.5 * (own + other))?;
        }
    }
    Ok(())
}

fn assign_vertex_split(
    new: &SimplexSet,
    old: &SimplexSet,
    mesh: &TriangleMesh,
    parameters: &Parameters,
    attrs: &mut Attributes,
) -> Result<(), RemeshError> {
    let Some(t) = old.first_triangle() else {
        return Err(plan_shape("vertex split triangles", 1, 0));
    };
    let Some((a, b)) = new.vertex_pair() else {
        return Err(plan_shape("vertex split vertices", 2, new.size(0)));
    };
    let Some(label) = mesh.label(&t) else {
        return Err(plan_shape("vertex split labels", 1, 0));
    };
    let (v_old, v_new) = if t.contains(a) { (a, b) } else { (b, a) };

    let distance = -parameters.get_strength("vertex_split", label);
    let position = compute_offset_position(v_old, mesh, attrs, label, distance)
        .unwrap_or_else(|| attrs.get_current_value(v_old));
    attrs.set_current_value(v_new, position);

    attrs.add_simplex0_label(v_new, label);
    let names = attrs.attribute_names(0).to_vec();
    for name in &names {
        let value = attrs.get_vertex_attribute(name, v_old, label)?;
        attrs.set_vertex_attribute(name, v_new, label, value)?;
    }
    attrs.erase_simplex0_label(v_old, label);
    Ok(())
}
