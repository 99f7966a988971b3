//! Bulk transfer of attribute values over a [`Phase`].
//!
//! Simulators work on dense arrays in a phase's local numbering. These
//! helpers copy named attributes, current positions and targets between such
//! arrays and an [`Attributes`] store. Vertex-valued transfers need a phase
//! with exactly one label, since a vertex holds one value per label.
//!
//! Value `i` of a vertex transfer belongs to `phase.vertices[i]`, value `i`
//! of an edge transfer to `phase.edges[i]` and so on.

use crate::data::attributes::Attributes;
use crate::geometry::primitives::Vec2;
use crate::mesh_error::RemeshError;
use crate::topology::mesh::InterfaceMesh;
use crate::topology::phase::{Phase, make_phase_of_label};
use crate::topology::simplex::{Simplex1, Simplex2};

/// Labels of all triangles of the mesh, in triangle order.
pub fn get_labels<M: InterfaceMesh + ?Sized>(mesh: &M) -> Vec<u32> {
    mesh.get_all_simplices()
        .triangles()
        .filter_map(|t| mesh.label(t))
        .collect()
}

fn edge_of(phase: &Phase, [i, j]: [usize; 2]) -> Simplex1 {
    Simplex1::from_vertices(phase.vertices[i], phase.vertices[j])
}

fn triangle_of(phase: &Phase, [i, j, k]: [usize; 3]) -> Simplex2 {
    Simplex2::from_vertices(phase.vertices[i], phase.vertices[j], phase.vertices[k])
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), RemeshError> {
    if expected != found {
        return Err(RemeshError::SizeMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_exists(attrs: &Attributes, name: &str, dim: u8) -> Result<(), RemeshError> {
    if dim > 2 {
        return Err(RemeshError::InvalidDimension(dim));
    }
    if !attrs.exist_attribute(name, dim) {
        return Err(RemeshError::MissingAttribute {
            name: name.to_string(),
            dimension: dim,
        });
    }
    Ok(())
}

/// Reads attribute `name` of dimension `dim` for every simplex of that
/// dimension in `phase`.
pub fn get_sub_range(
    attrs: &Attributes,
    phase: &Phase,
    name: &str,
    dim: u8,
) -> Result<Vec<f64>, RemeshError> {
    check_exists(attrs, name, dim)?;
    match dim {
        0 => {
            let label = phase.single_label()?;
            phase
                .vertices
                .iter()
                .map(|&v| attrs.get_vertex_attribute(name, v, label))
                .collect()
        }
        1 => phase
            .edges
            .iter()
            .map(|&e| attrs.get_edge_attribute(name, &edge_of(phase, e)))
            .collect(),
        _ => phase
            .triangles
            .iter()
            .map(|&t| attrs.get_face_attribute(name, &triangle_of(phase, t)))
            .collect(),
    }
}

/// Writes `values` into attribute `name` of dimension `dim`.
///
/// `values` must hold one entry per simplex of that dimension in `phase`.
pub fn set_sub_range(
    attrs: &mut Attributes,
    phase: &Phase,
    name: &str,
    dim: u8,
    values: &[f64],
) -> Result<(), RemeshError> {
    check_exists(attrs, name, dim)?;
    match dim {
        0 => {
            let label = phase.single_label()?;
            check_len("vertex values", phase.vertices.len(), values.len())?;
            for (&v, &value) in phase.vertices.iter().zip(values) {
                attrs.set_vertex_attribute(name, v, label, value)?;
            }
        }
        1 => {
            check_len("edge values", phase.edges.len(), values.len())?;
            for (&e, &value) in phase.edges.iter().zip(values) {
                attrs.set_edge_attribute(name, &edge_of(phase, e), value)?;
            }
        }
        _ => {
            check_len("face values", phase.triangles.len(), values.len())?;
            for (&t, &value) in phase.triangles.iter().zip(values) {
                attrs.set_face_attribute(name, &triangle_of(phase, t), value)?;
            }
        }
    }
    Ok(())
}

/// Current x and y coordinates of the phase's vertices.
pub fn get_sub_range_current(attrs: &Attributes, phase: &Phase) -> (Vec<f64>, Vec<f64>) {
    phase
        .vertices
        .iter()
        .map(|&v| {
            let p = attrs.get_current_value(v);
            (p.x, p.y)
        })
        .unzip()
}

/// Moves the phase's vertices to `(x[i], y[i])`.
pub fn set_sub_range_current(
    attrs: &mut Attributes,
    phase: &Phase,
    x: &[f64],
    y: &[f64],
) -> Result<(), RemeshError> {
    check_len("x values", phase.vertices.len(), x.len())?;
    check_len("y values", phase.vertices.len(), y.len())?;
    for (i, &v) in phase.vertices.iter().enumerate() {
        attrs.set_current_value(v, Vec2::new(x[i], y[i]));
    }
    Ok(())
}

/// Target x and y coordinates of the phase's vertices in the phase's label.
pub fn get_sub_range_target(
    attrs: &Attributes,
    phase: &Phase,
) -> Result<(Vec<f64>, Vec<f64>), RemeshError> {
    let label = phase.single_label()?;
    Ok(phase
        .vertices
        .iter()
        .map(|&v| {
            let p = attrs.get_target_value(v, label);
            (p.x, p.y)
        })
        .unzip())
}

/// Sets target coordinates of the phase's vertices.
///
/// With `partial` set, or when `phase` has edges but no triangles (an
/// interface or boundary view), the values only cover part of the label's
/// vertices. Every vertex of the whole label then gets its current position
/// as target, overridden by the given values where provided.
pub fn set_sub_range_target<M: InterfaceMesh + ?Sized>(
    mesh: &M,
    attrs: &mut Attributes,
    phase: &Phase,
    x: &[f64],
    y: &[f64],
    partial: bool,
) -> Result<(), RemeshError> {
    check_len("x values", phase.vertices.len(), x.len())?;
    check_len("y values", phase.vertices.len(), y.len())?;
    let label = phase.single_label()?;

    let looks_partial = phase.triangles.is_empty() && !phase.edges.is_empty();
    if looks_partial && !partial {
        log::debug!("set_sub_range_target: phase {label} has no triangles, treating data as partial");
    }

    if partial || looks_partial {
        let entire = make_phase_of_label(mesh, label);
        let (mut tx, mut ty) = get_sub_range_current(attrs, &entire);
        for (i, &v) in phase.vertices.iter().enumerate() {
            if let Some(local) = entire.local_index(v) {
                tx[local] = x[i];
                ty[local] = y[i];
            }
        }
        for (i, &v) in entire.vertices.iter().enumerate() {
            attrs.set_target_value(v, label, Vec2::new(tx[i], ty[i]))?;
        }
    } else {
        for (i, &v) in phase.vertices.iter().enumerate() {
            attrs.set_target_value(v, label, Vec2::new(x[i], y[i]))?;
        }
    }
    Ok(())
}
